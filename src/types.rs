/// External record identifier: the decimal form of the global index.
/// Examples: `0`, `449`, `125999`
pub type VideoId = String;
/// 1-based shard index. `0` is reserved for the fixture resource.
/// Examples: `1`, `5`, `1260`
pub type ShardIndex = usize;
/// 0-based position of a record in the unsharded catalog ordering.
/// Examples: `0`, `450`, `125999`
pub type GlobalIndex = usize;
/// Transport-relative resource path of one shard.
/// Examples: `data/videos_page_1.json`, `data/videos_page_test.json`
pub type ResourcePath = String;
