#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Shard geometry and global-index math.
pub mod addressing;
/// Catalog configuration and degradation policy.
pub mod config;
/// Centralized constants for layout, loading, and synthesis.
pub mod constants;
/// Video record and wire-format types.
pub mod data;
/// Reusable demo runners shared by the demo binaries.
pub mod example_apps;
mod hash;
/// Shard fetch, classification, and normalization.
pub mod loader;
/// Loader counters.
pub mod metrics;
/// Public range, point, and batch reads.
pub mod reader;
/// Session shard cache with in-flight de-duplication.
pub mod store;
/// Deterministic placeholder records.
pub mod synth;
/// Transports that fetch raw shard bodies (HTTP, filesystem, in-memory).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use addressing::{Addressing, ShardPosition, covering_shards, shard_base, to_shard};
pub use config::{CatalogConfig, DegradationPolicy};
pub use constants::catalog::{GUEST_LIMIT, SHARD_SIZE, TOTAL_ESTIMATE, TOTAL_SHARDS};
pub use data::{RawVideo, Video};
pub use errors::{CatalogError, Degradation, TransportError};
pub use loader::ShardLoader;
pub use metrics::LoaderStatsSnapshot;
pub use reader::CatalogReader;
pub use store::{Shard, ShardOrigin, ShardStore};
pub use synth::synthesize;
pub use transport::{FsTransport, HttpTransport, MemoryResponse, MemoryTransport, ShardTransport};
pub use types::{GlobalIndex, ResourcePath, ShardIndex, VideoId};
