use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::CatalogConfig;
use crate::errors::TransportError;
use crate::transport::ShardTransport;
use crate::types::ShardIndex;

/// Filesystem transport that reads shard resources under a root directory,
/// e.g. a checked-out copy of the static site.
pub struct FsTransport {
    root: PathBuf,
    follow_links: bool,
}

impl FsTransport {
    /// Create a transport rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal for `discover_shards`.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Root directory resources are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shard indices whose resource files exist under the configured data
    /// directory, sorted ascending. The fixture file is not reported.
    pub fn discover_shards(&self, config: &CatalogConfig) -> Vec<ShardIndex> {
        let dir = self.root.join(config.data_dir.trim_end_matches('/'));
        let mut walker = WalkDir::new(&dir).max_depth(1);
        if self.follow_links {
            walker = walker.follow_links(true);
        }
        let mut shards: Vec<ShardIndex> = walker
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| config.shard_for_file_name(name))
            })
            .collect();
        shards.sort_unstable();
        shards.dedup();
        shards
    }
}

impl ShardTransport for FsTransport {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn fetch(&self, path: &str) -> Result<String, TransportError> {
        let full = self.root.join(path);
        match fs::read(&full) {
            // Non-UTF-8 bytes are kept lossily so the loader reports a
            // format degradation instead of a transport failure.
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(TransportError::NotFound(path.to_string()))
            }
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}
