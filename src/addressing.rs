//! Integer math between global record positions and shard coordinates.

use std::ops::RangeInclusive;

use crate::constants::catalog::{SHARD_SIZE, TOTAL_SHARDS};
use crate::types::{GlobalIndex, ShardIndex};

/// Location of one global index inside the sharded layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShardPosition {
    /// 1-based shard index.
    pub shard: ShardIndex,
    /// Offset of the record inside its shard (`0..shard_size`).
    pub local: usize,
}

/// Shard geometry: records per shard and number of published shards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Addressing {
    /// Records per shard.
    pub shard_size: usize,
    /// Number of published shards, numbered `1..=total_shards`.
    pub total_shards: usize,
}

impl Default for Addressing {
    fn default() -> Self {
        Self {
            shard_size: SHARD_SIZE,
            total_shards: TOTAL_SHARDS,
        }
    }
}

impl Addressing {
    /// Geometry with `shard_size` records in each of `total_shards` shards.
    pub fn new(shard_size: usize, total_shards: usize) -> Self {
        Self {
            shard_size,
            total_shards,
        }
    }

    /// Number of addressable records.
    pub fn total_records(&self) -> usize {
        self.shard_size.saturating_mul(self.total_shards)
    }

    /// Shard and in-shard offset holding `global`.
    pub fn to_shard(&self, global: GlobalIndex) -> ShardPosition {
        ShardPosition {
            shard: global / self.shard_size + 1,
            local: global % self.shard_size,
        }
    }

    /// First global index stored in `shard`. Shard `0` (the fixture index)
    /// maps to base `0`.
    pub fn shard_base(&self, shard: ShardIndex) -> GlobalIndex {
        shard.saturating_sub(1).saturating_mul(self.shard_size)
    }

    /// True when `shard` is a published, fetchable shard.
    pub fn is_addressable(&self, shard: ShardIndex) -> bool {
        (1..=self.total_shards).contains(&shard)
    }

    /// Shards covering `[offset, offset + limit)`, clamped to the published
    /// shard range. Returns `None` when nothing in the window is addressable.
    pub fn covering_shards(&self, offset: usize, limit: usize) -> Option<RangeInclusive<ShardIndex>> {
        if limit == 0 || offset >= self.total_records() {
            return None;
        }
        let last_global = offset.saturating_add(limit - 1);
        let first = self.to_shard(offset).shard;
        let last = self.to_shard(last_global).shard.min(self.total_shards);
        Some(first..=last)
    }
}

/// `Addressing::to_shard` over the production layout.
pub fn to_shard(global: GlobalIndex) -> ShardPosition {
    Addressing::default().to_shard(global)
}

/// `Addressing::shard_base` over the production layout.
pub fn shard_base(shard: ShardIndex) -> GlobalIndex {
    Addressing::default().shard_base(shard)
}

/// `Addressing::covering_shards` over the production layout.
pub fn covering_shards(offset: usize, limit: usize) -> Option<RangeInclusive<ShardIndex>> {
    Addressing::default().covering_shards(offset, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::catalog::TOTAL_ESTIMATE;

    #[test]
    fn to_shard_round_trips_through_shard_base_for_every_index() {
        for global in 0..TOTAL_ESTIMATE {
            let position = to_shard(global);
            assert!(position.local < SHARD_SIZE);
            assert!((1..=TOTAL_SHARDS).contains(&position.shard));
            assert_eq!(shard_base(position.shard), global - position.local);
        }
    }

    #[test]
    fn shard_boundaries_map_to_expected_indices() {
        assert_eq!(to_shard(0), ShardPosition { shard: 1, local: 0 });
        assert_eq!(to_shard(99), ShardPosition { shard: 1, local: 99 });
        assert_eq!(to_shard(100), ShardPosition { shard: 2, local: 0 });
        assert_eq!(to_shard(TOTAL_ESTIMATE - 1).shard, TOTAL_SHARDS);
        assert_eq!(shard_base(1), 0);
        assert_eq!(shard_base(5), 400);
        assert_eq!(shard_base(0), 0);
        assert_eq!(shard_base(usize::MAX), usize::MAX);
    }

    #[test]
    fn covering_shards_spans_partial_windows() {
        assert_eq!(covering_shards(0, 250), Some(1..=3));
        assert_eq!(covering_shards(450, 50), Some(5..=5));
        assert_eq!(covering_shards(99, 2), Some(1..=2));
        assert_eq!(covering_shards(100, 100), Some(2..=2));
    }

    #[test]
    fn covering_shards_clamps_and_rejects_out_of_bounds_windows() {
        assert_eq!(covering_shards(0, 0), None);
        assert_eq!(covering_shards(TOTAL_ESTIMATE, 10), None);
        assert_eq!(
            covering_shards(TOTAL_ESTIMATE - 10, 500),
            Some(TOTAL_SHARDS..=TOTAL_SHARDS)
        );
        assert_eq!(covering_shards(usize::MAX - 1, usize::MAX), None);
    }

    #[test]
    fn custom_geometry_is_respected() {
        let layout = Addressing::new(10, 3);
        assert_eq!(layout.total_records(), 30);
        assert_eq!(layout.to_shard(25), ShardPosition { shard: 3, local: 5 });
        assert_eq!(layout.covering_shards(5, 100), Some(1..=3));
        assert!(!layout.is_addressable(0));
        assert!(!layout.is_addressable(4));
    }
}
