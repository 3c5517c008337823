//! Deterministic placeholder records for degraded shards.
//!
//! Every field is drawn through `rand` from a splitmix64 stream keyed by the
//! record's global index, so a given `(shard, count)` always produces the
//! same records and consumers never need to special-case placeholder data.

use rand::Rng;
use rand::seq::{IndexedRandom, index};

use crate::addressing::Addressing;
use crate::constants::synth::{
    CATEGORY_VOCABULARY, MAX_DURATION_SECS, MIN_DURATION_SECS, MOCK_TITLE_PREFIX,
    PERFORMER_NAMES, PLACEHOLDER_EMBED, SYNTH_SEED, TAG_VOCABULARY, THUMBNAIL_SIZE, VIEWS_RANGE,
};
use crate::data::Video;
use crate::hash::SplitMix64;
use crate::types::{GlobalIndex, ShardIndex};

/// Synthesize `count` records for `shard` under the production layout.
pub fn synthesize(shard: ShardIndex, count: usize) -> Vec<Video> {
    synthesize_with(&Addressing::default(), shard, count)
}

/// Synthesize `count` records for `shard` under `layout`.
pub fn synthesize_with(layout: &Addressing, shard: ShardIndex, count: usize) -> Vec<Video> {
    let base = layout.shard_base(shard);
    (0..count)
        .map_while(|local| base.checked_add(local))
        .map(synthesize_one)
        .collect()
}

/// Synthesize the placeholder record for one global index.
pub fn synthesize_one(global: GlobalIndex) -> Video {
    let mut rng = SplitMix64::keyed(SYNTH_SEED, global as u64);

    let views = rng.random_range(VIEWS_RANGE.0..=VIEWS_RANGE.1);
    let likes = rng.random_range(views / 100..=views / 10);
    let dislikes = rng.random_range(0..=likes / 5);
    let duration_secs = rng.random_range(MIN_DURATION_SECS..=MAX_DURATION_SECS);
    let hue: u16 = rng.random_range(0..360);

    let tags = pick_distinct(&mut rng, &TAG_VOCABULARY, 2, 4);
    let categories = pick_distinct(&mut rng, &CATEGORY_VOCABULARY, 1, 2);
    let performer = PERFORMER_NAMES
        .choose(&mut rng)
        .map(|name| name.to_string())
        .unwrap_or_default();

    Video {
        id: global.to_string(),
        title: format!("{MOCK_TITLE_PREFIX} {global}"),
        thumbnail: placeholder_thumbnail(global, hue),
        embed: PLACEHOLDER_EMBED.to_string(),
        tags,
        categories,
        performer,
        duration: format_duration(duration_secs),
        views: views.to_string(),
        likes: likes.to_string(),
        dislikes: dislikes.to_string(),
    }
}

/// Pick between `min` and `max` distinct entries, preserving vocabulary order.
fn pick_distinct<R: Rng>(rng: &mut R, vocabulary: &[&str], min: usize, max: usize) -> Vec<String> {
    let amount = rng.random_range(min..=max).min(vocabulary.len());
    let mut picked = index::sample(rng, vocabulary.len(), amount).into_vec();
    picked.sort_unstable();
    picked
        .into_iter()
        .map(|idx| vocabulary[idx].to_string())
        .collect()
}

fn format_duration(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Inline SVG thumbnail with a solid background of the given hue.
fn placeholder_thumbnail(global: GlobalIndex, hue: u16) -> String {
    let (width, height) = THUMBNAIL_SIZE;
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{width}' height='{height}' viewBox='0 0 {width} {height}'>\
<rect width='100%' height='100%' fill='hsl({hue},55%,42%)'/>\
<text x='50%' y='50%' fill='white' font-family='sans-serif' font-size='20' text-anchor='middle' dominant-baseline='middle'>#{global}</text>\
</svg>"
    );
    format!("data:image/svg+xml;utf8,{}", percent_encode_svg(&svg))
}

/// Escape the characters that break a `data:` URI inside `src` attributes.
fn percent_encode_svg(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len() + svg.len() / 8);
    for ch in svg.chars() {
        match ch {
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '#' => out.push_str("%23"),
            '%' => out.push_str("%25"),
            '"' => out.push_str("%22"),
            ' ' => out.push_str("%20"),
            other => out.push(other),
        }
    }
    out
}
