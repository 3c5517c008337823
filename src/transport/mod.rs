//! Transports that return the raw text of one shard resource.
//!
//! Transports only move bytes; classification of the body (git-lfs pointer,
//! malformed JSON, wrong shape) belongs to `ShardLoader`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::TransportError;
use crate::types::ResourcePath;

/// Local filesystem transport.
pub mod fs;
/// Blocking HTTP transport.
pub mod http;

pub use fs::FsTransport;
pub use http::HttpTransport;

/// Source of shard resource bodies.
pub trait ShardTransport: Send + Sync {
    /// Human-readable location used in logs (base URL or root directory).
    fn describe(&self) -> String;
    /// Fetch the full body text of `path`.
    fn fetch(&self, path: &str) -> Result<String, TransportError>;
}

/// Scripted response served by `MemoryTransport`.
#[derive(Clone, Debug)]
pub enum MemoryResponse {
    /// 2xx with this body.
    Body(String),
    /// Non-2xx status.
    Status(u16),
    /// Fetch deadline exceeded.
    Timeout,
}

/// In-memory transport serving scripted bodies, with per-path fetch counts.
///
/// Paths without a scripted response answer 404.
#[derive(Default)]
pub struct MemoryTransport {
    responses: HashMap<ResourcePath, MemoryResponse>,
    fetches: Mutex<HashMap<ResourcePath, usize>>,
    total_fetches: AtomicUsize,
    latency: Duration,
}

impl MemoryTransport {
    /// Transport with no scripted paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `path`.
    pub fn with_response(mut self, path: impl Into<ResourcePath>, response: MemoryResponse) -> Self {
        self.responses.insert(path.into(), response);
        self
    }

    /// Serve `body` with a 2xx status for `path`.
    pub fn with_body(self, path: impl Into<ResourcePath>, body: impl Into<String>) -> Self {
        self.with_response(path, MemoryResponse::Body(body.into()))
    }

    /// Sleep for `latency` inside every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of fetches issued for `path`.
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches
            .lock()
            .expect("memory transport counters poisoned")
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Number of fetches issued across all paths.
    pub fn total_fetches(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }
}

impl ShardTransport for MemoryTransport {
    fn describe(&self) -> String {
        format!("memory ({} scripted paths)", self.responses.len())
    }

    fn fetch(&self, path: &str) -> Result<String, TransportError> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        {
            let mut fetches = self
                .fetches
                .lock()
                .expect("memory transport counters poisoned");
            *fetches.entry(path.to_string()).or_insert(0) += 1;
        }
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        match self.responses.get(path) {
            Some(MemoryResponse::Body(body)) => Ok(body.clone()),
            Some(MemoryResponse::Status(status)) => Err(TransportError::Status {
                path: path.to_string(),
                status: *status,
            }),
            Some(MemoryResponse::Timeout) => Err(TransportError::Timeout(path.to_string())),
            None => Err(TransportError::NotFound(path.to_string())),
        }
    }
}
