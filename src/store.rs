//! Session cache of materialized shards with in-flight de-duplication.
//!
//! Each shard index owns one slot. The first caller for a cold shard becomes
//! the leader of a flight and runs the load; concurrent callers for the same
//! shard block on that flight and share its outcome. Successful loads stay
//! cached until `clear`. Failed loads are not cached.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::data::Video;
use crate::errors::{CatalogError, Degradation};
use crate::types::{GlobalIndex, ShardIndex};

/// How a shard's records were produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShardOrigin {
    /// Authentic data; `dropped` invalid entries were skipped.
    Fetched {
        /// Entries skipped as unreadable or without an embed.
        dropped: usize,
    },
    /// Placeholder data generated because the shard was degraded.
    Synthesized {
        /// Why the authentic data was unusable.
        reason: Degradation,
    },
}

/// One materialized shard.
#[derive(Clone, Debug)]
pub struct Shard {
    /// 1-based shard index (`0` for the fixture).
    pub index: ShardIndex,
    /// Records in ascending global order.
    pub records: Vec<Video>,
    /// Whether the records are authentic or synthesized.
    pub origin: ShardOrigin,
    /// When the shard was materialized.
    pub loaded_at: DateTime<Utc>,
}

impl Shard {
    /// Shard stamped with the current time.
    pub fn new(index: ShardIndex, records: Vec<Video>, origin: ShardOrigin) -> Self {
        Self {
            index,
            records,
            origin,
            loaded_at: Utc::now(),
        }
    }

    /// True when the records are placeholders.
    pub fn is_synthesized(&self) -> bool {
        matches!(self.origin, ShardOrigin::Synthesized { .. })
    }

    /// Record whose `id` names `global`. Searches by id, not by position,
    /// because dropped entries shift array positions.
    pub fn find(&self, global: GlobalIndex) -> Option<&Video> {
        self.records
            .iter()
            .find(|video| video.global_index() == Some(global))
    }
}

enum FlightState {
    Pending,
    Ready(Arc<Shard>),
    Failed(CatalogError),
}

/// One in-progress load that later callers can join.
struct Flight {
    state: Mutex<FlightState>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Pending),
            done: Condvar::new(),
        }
    }

    fn complete(&self, outcome: Result<Arc<Shard>, CatalogError>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = match outcome {
            Ok(shard) => FlightState::Ready(shard),
            Err(err) => FlightState::Failed(err),
        };
        self.done.notify_all();
    }

    fn wait(&self) -> Result<Arc<Shard>, CatalogError> {
        let mut state = self.state.lock().expect("shard flight poisoned");
        loop {
            match &*state {
                FlightState::Pending => {
                    state = self.done.wait(state).expect("shard flight poisoned");
                }
                FlightState::Ready(shard) => return Ok(Arc::clone(shard)),
                FlightState::Failed(err) => return Err(err.clone()),
            }
        }
    }
}

enum Slot {
    Ready(Arc<Shard>),
    InFlight(Arc<Flight>),
}

/// Thread-safe shard cache. Clones share the same storage.
#[derive(Clone, Default)]
pub struct ShardStore {
    slots: Arc<Mutex<HashMap<ShardIndex, Slot>>>,
}

impl ShardStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ShardIndex, Slot>> {
        self.slots.lock().expect("shard store poisoned")
    }

    /// Cached shard, if already materialized.
    pub fn get(&self, shard: ShardIndex) -> Option<Arc<Shard>> {
        match self.lock().get(&shard) {
            Some(Slot::Ready(cached)) => Some(Arc::clone(cached)),
            _ => None,
        }
    }

    /// Return the cached shard, join its in-flight load, or run `load` as the
    /// leader of a new flight.
    ///
    /// `load` runs at most once per flight and never while the store lock is
    /// held. On error nothing is cached and every joined caller receives the
    /// same error.
    pub fn get_or_load<F>(&self, shard: ShardIndex, load: F) -> Result<Arc<Shard>, CatalogError>
    where
        F: FnOnce() -> Result<Shard, CatalogError>,
    {
        let flight = {
            let mut slots = self.lock();
            match slots.get(&shard) {
                Some(Slot::Ready(cached)) => return Ok(Arc::clone(cached)),
                Some(Slot::InFlight(flight)) => {
                    let flight = Arc::clone(flight);
                    drop(slots);
                    debug!(shard, "joining in-flight shard load");
                    return flight.wait();
                }
                None => {
                    let flight = Arc::new(Flight::new());
                    slots.insert(shard, Slot::InFlight(Arc::clone(&flight)));
                    flight
                }
            }
        };

        let mut lease = FlightLease {
            store: self,
            shard,
            flight,
            finished: false,
        };
        let outcome = load().map(Arc::new);
        lease.finish(outcome)
    }

    /// Publish `shard`. If an entry already exists the existing one is kept
    /// and returned; shard contents are idempotent per index.
    pub fn insert(&self, shard: Shard) -> Arc<Shard> {
        let index = shard.index;
        let mut slots = self.lock();
        if let Some(Slot::Ready(existing)) = slots.get(&index) {
            return Arc::clone(existing);
        }
        let shared = Arc::new(shard);
        slots.insert(index, Slot::Ready(Arc::clone(&shared)));
        shared
    }

    /// True when `shard` is materialized.
    pub fn contains(&self, shard: ShardIndex) -> bool {
        matches!(self.lock().get(&shard), Some(Slot::Ready(_)))
    }

    /// Number of materialized shards.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    /// True when no shard is materialized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of loads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| matches!(slot, Slot::InFlight(_)))
            .count()
    }

    /// Materialized shard indices, ascending.
    pub fn cached_shards(&self) -> Vec<ShardIndex> {
        let mut shards: Vec<ShardIndex> = self
            .lock()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(index, _)| *index)
            .collect();
        shards.sort_unstable();
        shards
    }

    /// Drop every entry. Loads still in flight complete for their current
    /// callers and then republish their shard.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Leader's handle on a flight; completes the flight even if `load` panics.
struct FlightLease<'a> {
    store: &'a ShardStore,
    shard: ShardIndex,
    flight: Arc<Flight>,
    finished: bool,
}

impl FlightLease<'_> {
    fn finish(
        &mut self,
        outcome: Result<Arc<Shard>, CatalogError>,
    ) -> Result<Arc<Shard>, CatalogError> {
        self.finished = true;
        let outcome = {
            let mut slots = self
                .store
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match outcome {
                Ok(loaded) => {
                    let published = match slots.get(&self.shard) {
                        Some(Slot::Ready(existing)) => Arc::clone(existing),
                        _ => {
                            slots.insert(self.shard, Slot::Ready(Arc::clone(&loaded)));
                            loaded
                        }
                    };
                    Ok(published)
                }
                Err(err) => {
                    let ours = matches!(
                        slots.get(&self.shard),
                        Some(Slot::InFlight(flight)) if Arc::ptr_eq(flight, &self.flight)
                    );
                    if ours {
                        slots.remove(&self.shard);
                    }
                    Err(err)
                }
            }
        };
        self.flight.complete(outcome.clone());
        outcome
    }
}

impl Drop for FlightLease<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.finish(Err(CatalogError::LoadAbandoned { shard: self.shard }));
        }
    }
}
