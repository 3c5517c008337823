/// Constants describing the physical layout of the catalog.
pub mod catalog {
    /// Maximum number of records stored in one shard resource.
    pub const SHARD_SIZE: usize = 100;
    /// Number of shard resources published for the catalog.
    pub const TOTAL_SHARDS: usize = 1260;
    /// Addressable record count (`SHARD_SIZE * TOTAL_SHARDS`).
    pub const TOTAL_ESTIMATE: usize = SHARD_SIZE * TOTAL_SHARDS;
    /// Records an unauthenticated caller may page through.
    ///
    /// Enforced by the pagination layer; exposed here so callers can plan
    /// page counts (ten 24-item pages).
    pub const GUEST_LIMIT: usize = 240;
}

/// Constants used when resolving and classifying shard resources.
pub mod loader {
    use std::time::Duration;

    /// Directory holding the shard resources, relative to the transport root.
    pub const DEFAULT_DATA_DIR: &str = "data";
    /// Filename prefix shared by every shard resource.
    pub const DEFAULT_FILE_PREFIX: &str = "videos_page_";
    /// Filename extension shared by every shard resource.
    pub const DEFAULT_FILE_EXTENSION: &str = "json";
    /// Reserved shard index that resolves to the fixture resource.
    ///
    /// Addressing never produces this index; it is reachable only through an
    /// explicit `ShardLoader::load(TEST_FIXTURE_SHARD)`.
    pub const TEST_FIXTURE_SHARD: usize = 0;
    /// Filename (under the data dir) served for `TEST_FIXTURE_SHARD`.
    pub const TEST_FIXTURE_FILE: &str = "videos_page_test.json";
    /// Per-shard fetch timeout.
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
    /// Leading text of a git-lfs pointer file served in place of real content.
    pub const LFS_POINTER_SIGNATURE: &str = "version https://git-lfs.github.com/spec/";
    /// Delimiter joining list-valued wire fields (`tags`, `categories`).
    pub const LIST_DELIMITER: char = ';';
    /// Title used when a valid record carries no title.
    pub const UNTITLED: &str = "Untitled";
}

/// Constants used by placeholder record synthesis.
pub mod synth {
    /// Seed mixed into every per-record PRNG stream.
    pub const SYNTH_SEED: u64 = 0x5EED_CA7A_1060_0001;
    /// Title prefix for synthesized records.
    pub const MOCK_TITLE_PREFIX: &str = "Mock Video";
    /// Embed reference carried by every synthesized record.
    pub const PLACEHOLDER_EMBED: &str = "about:blank";
    /// Tag vocabulary sampled by synthesized records.
    pub const TAG_VOCABULARY: [&str; 12] = [
        "amateur", "classic", "couple", "featured", "hd", "indie", "outdoor", "popular",
        "retro", "solo", "studio", "trending",
    ];
    /// Category vocabulary sampled by synthesized records.
    pub const CATEGORY_VOCABULARY: [&str; 8] = [
        "Comedy", "Documentary", "Drama", "Music", "News", "Sports", "Travel", "Vlog",
    ];
    /// Performer names sampled by synthesized records; the empty entry leaves
    /// the performer unset.
    pub const PERFORMER_NAMES: [&str; 9] = [
        "", "Alex Rivers", "Casey Morgan", "Dana Brooks", "Jamie Lane", "Jordan Vale",
        "Morgan Reed", "Riley Stone", "Taylor Quinn",
    ];
    /// Inclusive view-count range for synthesized records.
    pub const VIEWS_RANGE: (u64, u64) = (1_000, 1_000_000);
    /// Longest synthesized duration in seconds.
    pub const MAX_DURATION_SECS: u64 = 45 * 60;
    /// Shortest synthesized duration in seconds.
    pub const MIN_DURATION_SECS: u64 = 30;
    /// Thumbnail width and height in pixels.
    pub const THUMBNAIL_SIZE: (u32, u32) = (320, 180);
}
