//! Public read API over the sharded catalog.
//!
//! Ownership model:
//! - `CatalogReader` owns a `ShardLoader`, which owns the transport and a
//!   handle on the injected `ShardStore`.
//! - Readers built over clones of one `ShardStore` share cached shards;
//!   readers built over separate stores never interfere.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::constants::catalog::GUEST_LIMIT;
use crate::data::{Video, parse_global_index};
use crate::errors::CatalogError;
use crate::loader::ShardLoader;
use crate::metrics::LoaderStatsSnapshot;
use crate::store::{Shard, ShardStore};
use crate::transport::{FsTransport, HttpTransport, ShardTransport};
use crate::types::{GlobalIndex, ShardIndex};

/// Range, point, and batch reads over the catalog.
///
/// Every read returns `Ok` under `DegradationPolicy::Synthesize`; malformed
/// or out-of-range requests produce empty results rather than errors.
#[derive(Clone)]
pub struct CatalogReader {
    loader: ShardLoader,
}

impl CatalogReader {
    /// Reader over `transport` with a fresh private store.
    pub fn new(
        config: CatalogConfig,
        transport: Arc<dyn ShardTransport>,
    ) -> Result<Self, CatalogError> {
        Self::with_store(config, transport, ShardStore::new())
    }

    /// Reader over `transport` publishing into `store`.
    pub fn with_store(
        config: CatalogConfig,
        transport: Arc<dyn ShardTransport>,
        store: ShardStore,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            loader: ShardLoader::new(config, transport, store)?,
        })
    }

    /// Reader fetching shards over HTTP from `base_url`, using the
    /// configured fetch timeout.
    pub fn http(base_url: impl Into<String>, config: CatalogConfig) -> Result<Self, CatalogError> {
        let transport = HttpTransport::new(base_url, config.fetch_timeout);
        Self::new(config, Arc::new(transport))
    }

    /// Reader over shard files under a local `root` directory.
    pub fn local(root: impl Into<PathBuf>, config: CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(config, Arc::new(FsTransport::new(root)))
    }

    /// Underlying loader.
    pub fn loader(&self) -> &ShardLoader {
        &self.loader
    }

    /// Active configuration.
    pub fn config(&self) -> &CatalogConfig {
        self.loader.config()
    }

    /// Addressable record count.
    pub fn total_estimate(&self) -> usize {
        self.config().addressing.total_records()
    }

    /// Records an unauthenticated caller may traverse. Enforced by callers.
    pub fn guest_limit(&self) -> usize {
        GUEST_LIMIT.min(self.total_estimate())
    }

    /// Records in `[offset, offset + limit)`, in global order.
    ///
    /// The covering shards are concatenated and sliced positionally from the
    /// first shard's base. The result is shorter than `limit` only when the
    /// window reaches past the end of the catalog.
    pub fn get_range(&self, offset: usize, limit: usize) -> Result<Vec<Video>, CatalogError> {
        let layout = self.config().addressing;
        let Some(shards) = layout.covering_shards(offset, limit) else {
            return Ok(Vec::new());
        };
        let start = offset - layout.shard_base(*shards.start());
        let loaded = self.load_all(shards.collect())?;
        let records: Vec<Video> = loaded
            .iter()
            .flat_map(|shard| shard.records.iter())
            .skip(start)
            .take(limit)
            .cloned()
            .collect();
        debug!(
            offset,
            limit,
            shards = loaded.len(),
            returned = records.len(),
            "range read"
        );
        Ok(records)
    }

    /// The first `max` records of the catalog.
    pub fn load_prefix(&self, max: usize) -> Result<Vec<Video>, CatalogError> {
        self.get_range(0, max.min(self.total_estimate()))
    }

    /// Record with external id `id`.
    ///
    /// Returns `None` for ids that are not plain non-negative integers, that
    /// lie outside the catalog, or whose record was dropped as invalid.
    pub fn get_by_id(&self, id: &str) -> Result<Option<Video>, CatalogError> {
        let Some(global) = self.addressable(id) else {
            return Ok(None);
        };
        let shard = self.config().addressing.to_shard(global).shard;
        let loaded = self.loader.load(shard)?;
        Ok(loaded.find(global).cloned())
    }

    /// Records for every resolvable id in `ids`.
    ///
    /// Each owning shard is loaded once. Duplicates collapse and unresolvable
    /// ids are omitted. Output is in ascending global order, not input order.
    pub fn get_batch<I, S>(&self, ids: I) -> Result<Vec<Video>, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let layout = self.config().addressing;
        let mut wanted: BTreeMap<ShardIndex, BTreeSet<GlobalIndex>> = BTreeMap::new();
        for id in ids {
            if let Some(global) = self.addressable(id.as_ref()) {
                wanted
                    .entry(layout.to_shard(global).shard)
                    .or_default()
                    .insert(global);
            }
        }
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let loaded = self.load_all(wanted.keys().copied().collect())?;
        let records: Vec<Video> = loaded
            .iter()
            .zip(wanted.values())
            .flat_map(|(shard, globals)| {
                globals
                    .iter()
                    .filter_map(move |global| shard.find(*global))
            })
            .cloned()
            .collect();
        debug!(
            shards = loaded.len(),
            returned = records.len(),
            "batch read"
        );
        Ok(records)
    }

    /// Drop every cached shard (test hook).
    pub fn reset(&self) {
        self.loader.store().clear();
    }

    /// Materialized shard indices, ascending.
    pub fn cached_shards(&self) -> Vec<ShardIndex> {
        self.loader.store().cached_shards()
    }

    /// Snapshot of the loader counters.
    pub fn stats(&self) -> LoaderStatsSnapshot {
        self.loader.stats()
    }

    fn addressable(&self, id: &str) -> Option<GlobalIndex> {
        parse_global_index(id).filter(|global| *global < self.total_estimate())
    }

    /// Load `shards` concurrently and return them in the given order.
    fn load_all(&self, shards: Vec<ShardIndex>) -> Result<Vec<Arc<Shard>>, CatalogError> {
        shards
            .into_par_iter()
            .map(|shard| self.loader.load(shard))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::Addressing;
    use crate::transport::MemoryTransport;

    fn small_reader() -> (CatalogReader, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let config = CatalogConfig::default().with_addressing(Addressing::new(10, 3));
        let reader = CatalogReader::new(config, transport.clone()).unwrap();
        (reader, transport)
    }

    fn ids(records: &[Video]) -> Vec<String> {
        records.iter().map(|video| video.id.clone()).collect()
    }

    #[test]
    fn get_range_truncates_at_catalog_end() {
        let (reader, _) = small_reader();
        let records = reader.get_range(25, 100).unwrap();
        assert_eq!(ids(&records), (25..30).map(|g| g.to_string()).collect::<Vec<_>>());
        assert!(reader.get_range(30, 5).unwrap().is_empty());
        assert!(reader.get_range(0, 0).unwrap().is_empty());
    }

    #[test]
    fn load_prefix_caps_at_total_estimate() {
        let (reader, transport) = small_reader();
        assert_eq!(reader.load_prefix(1_000).unwrap().len(), 30);
        assert_eq!(reader.load_prefix(4).unwrap().len(), 4);
        assert_eq!(transport.total_fetches(), 3);
    }

    #[test]
    fn get_batch_skips_unresolvable_ids_and_collapses_duplicates() {
        let (reader, _) = small_reader();
        let records = reader
            .get_batch(["12", "x", "3", "12", "-4", "30", "0003"])
            .unwrap();
        assert_eq!(ids(&records), vec!["3", "12"]);
        assert!(reader.get_batch(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn reset_forces_refetch() {
        let (reader, transport) = small_reader();
        reader.get_by_id("4").unwrap().unwrap();
        assert_eq!(reader.cached_shards(), vec![1]);
        reader.reset();
        assert!(reader.cached_shards().is_empty());
        reader.get_by_id("4").unwrap().unwrap();
        assert_eq!(transport.total_fetches(), 2);
    }

    #[test]
    fn guest_limit_never_exceeds_catalog() {
        let (reader, _) = small_reader();
        assert_eq!(reader.total_estimate(), 30);
        assert_eq!(reader.guest_limit(), 30);
    }
}
