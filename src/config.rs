use std::time::Duration;

use crate::addressing::Addressing;
use crate::constants::loader::{
    DEFAULT_DATA_DIR, DEFAULT_FETCH_TIMEOUT, DEFAULT_FILE_EXTENSION, DEFAULT_FILE_PREFIX,
    TEST_FIXTURE_FILE, TEST_FIXTURE_SHARD,
};
use crate::errors::CatalogError;
use crate::types::{ResourcePath, ShardIndex};

/// What a shard load does when the authentic data is unusable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegradationPolicy {
    /// Replace the shard with synthesized placeholder records.
    #[default]
    Synthesize,
    /// Surface `CatalogError::ShardDegraded` to the caller and cache nothing.
    Propagate,
}

/// Top-level catalog configuration.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Directory of the shard resources, relative to the transport root.
    pub data_dir: String,
    /// Filename prefix shared by shard resources.
    pub file_prefix: String,
    /// Filename extension (without the dot).
    pub file_extension: String,
    /// Timeout applied to each shard fetch.
    pub fetch_timeout: Duration,
    /// Failure policy for degraded shards.
    pub degradation_policy: DegradationPolicy,
    /// Shard geometry.
    pub addressing: Addressing,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            degradation_policy: DegradationPolicy::default(),
            addressing: Addressing::default(),
        }
    }
}

impl CatalogConfig {
    /// Override the data directory.
    pub fn with_data_dir(mut self, data_dir: impl Into<String>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Override the per-shard fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Override the degradation policy.
    pub fn with_policy(mut self, policy: DegradationPolicy) -> Self {
        self.degradation_policy = policy;
        self
    }

    /// Override the shard geometry.
    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    /// Reject configurations that would make addressing or path resolution
    /// meaningless.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.addressing.shard_size == 0 {
            return Err(CatalogError::Configuration(
                "shard_size must be greater than zero".into(),
            ));
        }
        if self.addressing.total_shards == 0 {
            return Err(CatalogError::Configuration(
                "total_shards must be greater than zero".into(),
            ));
        }
        if self.file_extension.trim_start_matches('.').is_empty() {
            return Err(CatalogError::Configuration(
                "file_extension must not be empty".into(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(CatalogError::Configuration(
                "fetch_timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Resource path for `shard`. The fixture index resolves to the fixed
    /// fixture file.
    pub fn resource_path(&self, shard: ShardIndex) -> ResourcePath {
        let file = if shard == TEST_FIXTURE_SHARD {
            TEST_FIXTURE_FILE.to_string()
        } else {
            format!(
                "{}{}.{}",
                self.file_prefix,
                shard,
                self.file_extension.trim_start_matches('.')
            )
        };
        let dir = self.data_dir.trim_end_matches('/');
        if dir.is_empty() {
            file
        } else {
            format!("{dir}/{file}")
        }
    }

    /// Inverse of `resource_path` for a bare filename; `None` for files that
    /// are not numbered shards.
    pub fn shard_for_file_name(&self, file_name: &str) -> Option<ShardIndex> {
        let suffix = format!(".{}", self.file_extension.trim_start_matches('.'));
        let digits = file_name
            .strip_prefix(self.file_prefix.as_str())?
            .strip_suffix(suffix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<ShardIndex>().ok().filter(|shard| *shard > 0)
    }
}
