use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::loader::{LIST_DELIMITER, UNTITLED};
use crate::types::{GlobalIndex, VideoId};

/// Canonical catalog record served by `CatalogReader`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Decimal form of the record's global index.
    pub id: VideoId,
    /// Display title; `Untitled` when the wire title was blank.
    pub title: String,
    /// Thumbnail URL or inline `data:` image.
    pub thumbnail: String,
    /// Embed reference for the player; never empty.
    pub embed: String,
    /// Tags parsed from the `;`-joined wire field.
    pub tags: Vec<String>,
    /// Categories parsed from the `;`-joined wire field.
    pub categories: Vec<String>,
    /// Performer credit; empty when unknown.
    pub performer: String,
    /// `MM:SS` as published; not validated.
    pub duration: String,
    /// Raw view count. Use `views_count` for a number.
    pub views: String,
    /// Raw like count. Use `likes_count` for a number.
    pub likes: String,
    /// Raw dislike count. Use `dislikes_count` for a number.
    pub dislikes: String,
}

impl Video {
    /// Global index encoded in `id`, or `None` if the id is not a plain
    /// non-negative decimal.
    pub fn global_index(&self) -> Option<GlobalIndex> {
        parse_global_index(&self.id)
    }

    /// Parsed view count.
    pub fn views_count(&self) -> u64 {
        parse_count(&self.views)
    }

    /// Parsed like count.
    pub fn likes_count(&self) -> u64 {
        parse_count(&self.likes)
    }

    /// Parsed dislike count.
    pub fn dislikes_count(&self) -> u64 {
        parse_count(&self.dislikes)
    }

    /// Normalize one wire entry stored at `global`.
    ///
    /// Returns `None` when the entry has no usable `embed`.
    pub fn from_raw(global: GlobalIndex, raw: RawVideo) -> Option<Self> {
        if raw.embed.trim().is_empty() {
            return None;
        }
        let title = if raw.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            raw.title
        };
        Some(Self {
            id: global.to_string(),
            title,
            thumbnail: raw.thumbnail,
            embed: raw.embed,
            tags: split_list(&raw.tags),
            categories: split_list(&raw.categories),
            performer: raw.actors,
            duration: raw.duration,
            views: raw.views,
            likes: raw.likes,
            dislikes: raw.dislikes,
        })
    }
}

/// One entry of a shard payload as published on the wire.
///
/// Every field is optional on the wire and defaults to the empty string.
/// Numeric fields may arrive as JSON numbers or strings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawVideo {
    /// Player embed reference.
    #[serde(deserialize_with = "loose_string")]
    pub embed: String,
    /// Thumbnail URL.
    #[serde(deserialize_with = "loose_string")]
    pub thumbnail: String,
    /// Title.
    #[serde(deserialize_with = "loose_string")]
    pub title: String,
    /// `;`-joined tags.
    #[serde(deserialize_with = "loose_string")]
    pub tags: String,
    /// `;`-joined categories.
    #[serde(deserialize_with = "loose_string")]
    pub categories: String,
    /// Performer credit.
    #[serde(deserialize_with = "loose_string")]
    pub actors: String,
    /// `MM:SS` duration.
    #[serde(deserialize_with = "loose_string")]
    pub duration: String,
    /// View count.
    #[serde(deserialize_with = "loose_string")]
    pub views: String,
    /// Like count.
    #[serde(deserialize_with = "loose_string")]
    pub likes: String,
    /// Dislike count.
    #[serde(deserialize_with = "loose_string")]
    pub dislikes: String,
}

/// Accept a string, number, bool, or null and store it as a string.
/// Arrays and objects are rejected.
fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// Split a `;`-joined wire list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a loosely formatted count, falling back to `0`.
///
/// Accepts thousands separators (`1,234`), surrounding whitespace, and a
/// fractional part, which is truncated.
pub fn parse_count(raw: &str) -> u64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && *ch != '_')
        .collect();
    if cleaned.is_empty() {
        return 0;
    }
    let integral = cleaned.split('.').next().unwrap_or_default();
    if !integral.is_empty() && integral.bytes().all(|b| b.is_ascii_digit()) {
        return integral.parse::<u64>().unwrap_or(u64::MAX);
    }
    0
}

/// Parse an external id as a global index. Only plain ASCII digits are
/// accepted (no sign, whitespace, or exponent).
pub fn parse_global_index(id: &str) -> Option<GlobalIndex> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse::<GlobalIndex>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_normalizes_lists_and_defaults_title() {
        let raw: RawVideo = serde_json::from_value(serde_json::json!({
            "embed": "<iframe src=\"x\"></iframe>",
            "tags": "hd; retro;;classic",
            "categories": "Music",
            "actors": "Jamie Lane",
            "views": 1200,
            "likes": "40",
            "screenshots": "ignored"
        }))
        .unwrap();
        let video = Video::from_raw(42, raw).unwrap();
        assert_eq!(video.id, "42");
        assert_eq!(video.title, UNTITLED);
        assert_eq!(video.tags, vec!["hd", "retro", "classic"]);
        assert_eq!(video.categories, vec!["Music"]);
        assert_eq!(video.performer, "Jamie Lane");
        assert_eq!(video.views, "1200");
        assert_eq!(video.views_count(), 1200);
        assert_eq!(video.likes_count(), 40);
        assert_eq!(video.dislikes_count(), 0);
        assert_eq!(video.global_index(), Some(42));
    }

    #[test]
    fn from_raw_rejects_missing_or_blank_embed() {
        assert!(Video::from_raw(0, RawVideo::default()).is_none());
        let blank = RawVideo {
            embed: "   ".into(),
            ..RawVideo::default()
        };
        assert!(Video::from_raw(0, blank).is_none());
    }

    #[test]
    fn null_wire_fields_become_empty_strings() {
        let raw: RawVideo = serde_json::from_value(serde_json::json!({
            "embed": "e",
            "title": null,
            "views": null
        }))
        .unwrap();
        assert_eq!(raw.title, "");
        assert_eq!(raw.views, "");
    }

    #[test]
    fn nested_wire_values_are_rejected() {
        let result = serde_json::from_value::<RawVideo>(serde_json::json!({
            "embed": {"src": "x"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn parse_count_handles_separators_fractions_and_garbage() {
        assert_eq!(parse_count("1,234,567"), 1_234_567);
        assert_eq!(parse_count(" 88 "), 88);
        assert_eq!(parse_count("12.9"), 12);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
        assert_eq!(parse_count("-5"), 0);
        assert_eq!(parse_count("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn parse_global_index_accepts_only_plain_digits() {
        assert_eq!(parse_global_index("0"), Some(0));
        assert_eq!(parse_global_index("00150"), Some(150));
        assert_eq!(parse_global_index("-1"), None);
        assert_eq!(parse_global_index("+1"), None);
        assert_eq!(parse_global_index(" 1"), None);
        assert_eq!(parse_global_index("abc"), None);
        assert_eq!(parse_global_index(""), None);
        assert_eq!(parse_global_index("1e3"), None);
    }
}
