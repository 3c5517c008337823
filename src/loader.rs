//! Fetch, classify, and normalize one shard.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{CatalogConfig, DegradationPolicy};
use crate::constants::loader::{LFS_POINTER_SIGNATURE, TEST_FIXTURE_SHARD};
use crate::data::{RawVideo, Video};
use crate::errors::{CatalogError, Degradation};
use crate::metrics::{LoaderStats, LoaderStatsSnapshot};
use crate::store::{Shard, ShardOrigin, ShardStore};
use crate::synth::synthesize_with;
use crate::transport::ShardTransport;
use crate::types::ShardIndex;

/// Loads shards through a transport and publishes them into a `ShardStore`.
///
/// Cheap to clone; clones share the transport, store, and counters.
#[derive(Clone)]
pub struct ShardLoader {
    config: Arc<CatalogConfig>,
    transport: Arc<dyn ShardTransport>,
    store: ShardStore,
    stats: Arc<LoaderStats>,
}

impl ShardLoader {
    /// Loader over `transport` publishing into `store`. Fails on invalid config.
    pub fn new(
        config: CatalogConfig,
        transport: Arc<dyn ShardTransport>,
        store: ShardStore,
    ) -> Result<Self, CatalogError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport,
            store,
            stats: Arc::new(LoaderStats::default()),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Store this loader publishes into.
    pub fn store(&self) -> &ShardStore {
        &self.store
    }

    /// Snapshot of the loader counters.
    pub fn stats(&self) -> LoaderStatsSnapshot {
        self.stats.snapshot()
    }

    /// Return `shard`, fetching it at most once per session.
    ///
    /// Under `DegradationPolicy::Synthesize` this never fails. Under
    /// `Propagate` a degraded shard yields `CatalogError::ShardDegraded` and
    /// is retried on the next call.
    ///
    /// Indices outside the published range (other than the fixture index)
    /// are never fetched; they yield an empty, uncached shard.
    pub fn load(&self, shard: ShardIndex) -> Result<Arc<Shard>, CatalogError> {
        if shard != TEST_FIXTURE_SHARD && !self.config.addressing.is_addressable(shard) {
            debug!(shard, "shard outside published range; not fetched");
            return Ok(Arc::new(Shard::new(
                shard,
                Vec::new(),
                ShardOrigin::Fetched { dropped: 0 },
            )));
        }
        self.store.get_or_load(shard, || self.fetch_shard(shard))
    }

    /// Fetch and materialize `shard` without consulting the store.
    fn fetch_shard(&self, shard: ShardIndex) -> Result<Shard, CatalogError> {
        let path = self.config.resource_path(shard);
        let started = Instant::now();
        self.stats.record_fetch_attempt();
        let outcome = self
            .transport
            .fetch(&path)
            .map_err(Degradation::from)
            .and_then(|body| classify_payload(&body));
        debug!(
            shard,
            path = %path,
            fetch_ms = started.elapsed().as_millis(),
            ok = outcome.is_ok(),
            "shard fetch finished"
        );

        match outcome {
            Ok(entries) => {
                let (records, dropped) = self.normalize(shard, entries);
                self.stats.record_fetched(dropped);
                if dropped > 0 {
                    info!(
                        shard,
                        kept = records.len(),
                        dropped,
                        "shard loaded with invalid records dropped"
                    );
                }
                Ok(Shard::new(shard, records, ShardOrigin::Fetched { dropped }))
            }
            Err(reason) => match self.config.degradation_policy {
                DegradationPolicy::Synthesize => {
                    warn!(
                        shard,
                        path = %path,
                        source = %self.transport.describe(),
                        reason = %reason,
                        "shard degraded; serving synthesized records"
                    );
                    self.stats.record_synthesized();
                    let layout = &self.config.addressing;
                    let records = synthesize_with(layout, shard, layout.shard_size);
                    Ok(Shard::new(shard, records, ShardOrigin::Synthesized { reason }))
                }
                DegradationPolicy::Propagate => {
                    warn!(shard, path = %path, reason = %reason, "shard degraded");
                    self.stats.record_failed();
                    Err(CatalogError::ShardDegraded { shard, reason })
                }
            },
        }
    }

    /// Map raw entries to records at `shard_base + position`, dropping
    /// entries without a usable `embed`. Returns the records and the number
    /// of dropped entries.
    fn normalize(&self, shard: ShardIndex, entries: Vec<Value>) -> (Vec<Video>, usize) {
        let layout = &self.config.addressing;
        let base = layout.shard_base(shard);
        let total = entries.len();
        if total > layout.shard_size {
            warn!(
                shard,
                entries = total,
                shard_size = layout.shard_size,
                "shard payload exceeds shard size; extra entries ignored"
            );
        }

        let mut records = Vec::with_capacity(total.min(layout.shard_size));
        let mut dropped = 0;
        for (local, entry) in entries.into_iter().take(layout.shard_size).enumerate() {
            let global = base + local;
            let raw = match serde_json::from_value::<RawVideo>(entry) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(shard, global, error = %err, "skipping unreadable record");
                    dropped += 1;
                    continue;
                }
            };
            match Video::from_raw(global, raw) {
                Some(video) => records.push(video),
                None => {
                    warn!(shard, global, "skipping record without embed");
                    dropped += 1;
                }
            }
        }
        (records, dropped)
    }
}

/// Classify a response body, first match wins: git-lfs pointer, invalid
/// JSON, then anything other than an array of objects.
pub fn classify_payload(body: &str) -> Result<Vec<Value>, Degradation> {
    let body = body.trim_start_matches('\u{feff}');
    if body.starts_with(LFS_POINTER_SIGNATURE) {
        return Err(Degradation::LfsPointer);
    }
    let parsed: Value =
        serde_json::from_str(body).map_err(|err| Degradation::Unparsable(err.to_string()))?;
    match parsed {
        Value::Array(entries) if entries.iter().all(Value::is_object) => Ok(entries),
        _ => Err(Degradation::NotAList),
    }
}
