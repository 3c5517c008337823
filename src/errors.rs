use std::io;

use thiserror::Error;

use crate::types::{ResourcePath, ShardIndex};

/// Reason a shard's authentic data could not be used.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Degradation {
    /// Connection or protocol failure before a status arrived.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Non-2xx response; missing local files count as 404.
    #[error("HTTP status {0}")]
    Status(u16),
    /// Fetch deadline exceeded.
    #[error("fetch timed out")]
    Timeout,
    /// Body is a git-lfs pointer stub instead of the real file.
    #[error("payload is a git-lfs pointer")]
    LfsPointer,
    /// Body is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Unparsable(String),
    /// JSON that is not an array of objects.
    #[error("payload is not a list of records")]
    NotAList,
}

impl Degradation {
    /// True for failures that happened before a body was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status(_) | Self::Timeout)
    }
}

/// Error returned by a `ShardTransport` fetch.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Resource does not exist (HTTP 404 or missing file).
    #[error("resource '{0}' not found")]
    NotFound(ResourcePath),
    /// Non-2xx status other than 404.
    #[error("resource '{path}' returned HTTP {status}")]
    Status {
        /// Requested resource.
        path: ResourcePath,
        /// HTTP status code.
        status: u16,
    },
    /// Fetch deadline exceeded.
    #[error("resource '{0}' timed out")]
    Timeout(ResourcePath),
    /// Any other transport failure.
    #[error("resource '{path}' unavailable: {reason}")]
    Transport {
        /// Requested resource.
        path: ResourcePath,
        /// Underlying error message.
        reason: String,
    },
    /// Local I/O failure other than a missing file.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<TransportError> for Degradation {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotFound(_) => Degradation::Status(404),
            TransportError::Status { status, .. } => Degradation::Status(status),
            TransportError::Timeout(_) => Degradation::Timeout,
            other => Degradation::Transport(other.to_string()),
        }
    }
}

/// Error type for catalog configuration and strict-policy shard failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Shard could not be used and the policy is `Propagate`.
    #[error("shard {shard} is degraded: {reason}")]
    ShardDegraded {
        /// Degraded shard index.
        shard: ShardIndex,
        /// Why the shard was degraded.
        reason: Degradation,
    },
    /// Invalid `CatalogConfig`.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The caller running a shared load panicked before finishing it.
    #[error("shard {shard} load was abandoned by its leader")]
    LoadAbandoned {
        /// Shard whose load was abandoned.
        shard: ShardIndex,
    },
}
