use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, error::ErrorKind};

use crate::config::{CatalogConfig, DegradationPolicy};
use crate::data::Video;
use crate::metrics::LoaderStatsSnapshot;
use crate::reader::CatalogReader;
use crate::store::ShardOrigin;
use crate::transport::FsTransport;

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    #[arg(
        long = "data-root",
        value_name = "PATH",
        help = "Directory containing the data/ folder of shard files"
    )]
    data_root: Option<PathBuf>,
    #[arg(
        long = "base-url",
        value_name = "URL",
        help = "Base URL serving the data/ folder of shard files"
    )]
    base_url: Option<String>,
}

#[derive(Debug, Parser)]
#[command(
    name = "catalog_demo",
    disable_help_subcommand = true,
    about = "Read records from a sharded video catalog",
    long_about = "Read a range, a single id, or a batch of ids from a sharded catalog and report how each shard was materialized.",
    after_help = "Exactly one of --data-root or --base-url is required. Without --id or --ids a range is read."
)]
/// CLI for `catalog_demo`.
///
/// Common usage:
/// - First page from a local checkout: `--data-root ./site --limit 24`
/// - One record over HTTP: `--base-url https://example.org/site --id 4512`
/// - Fail instead of synthesizing: add `--strict`
struct CatalogDemoCli {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, default_value_t = 0, help = "Global offset of the range read")]
    offset: usize,
    #[arg(
        long,
        default_value_t = 24,
        value_parser = parse_positive_usize,
        help = "Number of records in the range read"
    )]
    limit: usize,
    #[arg(long, conflicts_with = "ids", help = "Read a single record by id")]
    id: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Read a comma-separated batch of record ids"
    )]
    ids: Vec<String>,
    #[arg(
        long,
        help = "Surface degraded shards as errors instead of synthesizing records"
    )]
    strict: bool,
    #[arg(
        long = "timeout-ms",
        default_value_t = 5_000,
        value_parser = parse_positive_u64,
        help = "Per-shard fetch timeout in milliseconds"
    )]
    timeout_ms: u64,
}

#[derive(Debug, Parser)]
#[command(
    name = "shard_inventory_demo",
    disable_help_subcommand = true,
    about = "List shard files present under a local catalog checkout"
)]
struct ShardInventoryCli {
    #[arg(long = "data-root", value_name = "PATH", help = "Directory containing the data/ folder")]
    data_root: PathBuf,
    #[arg(long, help = "Follow symlinks while scanning")]
    follow_symlinks: bool,
}

/// Run the catalog reader demo with CLI-style arguments (program name excluded).
pub fn run_catalog_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<CatalogDemoCli, _>(
        std::iter::once("catalog_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let policy = if cli.strict {
        DegradationPolicy::Propagate
    } else {
        DegradationPolicy::Synthesize
    };
    let config = CatalogConfig::default()
        .with_policy(policy)
        .with_fetch_timeout(Duration::from_millis(cli.timeout_ms));

    let reader = match (cli.source.data_root, cli.source.base_url) {
        (Some(root), _) => {
            println!("Reading shards from {}", root.display());
            CatalogReader::local(root, config)?
        }
        (None, Some(url)) => {
            println!("Reading shards from {url}");
            CatalogReader::http(url, config)?
        }
        (None, None) => return Err("one of --data-root or --base-url is required".into()),
    };

    if let Some(id) = cli.id {
        match reader.get_by_id(&id)? {
            Some(video) => print_video(&video),
            None => println!("No record with id '{id}'."),
        }
    } else if !cli.ids.is_empty() {
        let records = reader.get_batch(&cli.ids)?;
        println!(
            "Resolved {} of {} requested ids.",
            records.len(),
            cli.ids.len()
        );
        for video in &records {
            print_video(video);
        }
    } else {
        let records = reader.get_range(cli.offset, cli.limit)?;
        println!(
            "Range [{}, {}) returned {} records.",
            cli.offset,
            cli.offset.saturating_add(cli.limit),
            records.len()
        );
        for video in &records {
            print_video_line(video);
        }
    }

    print_shard_summary(&reader);
    print_stats(&reader.stats());
    Ok(())
}

/// List shard files under `--data-root` and report gaps in the published range.
pub fn run_shard_inventory<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) = parse_cli::<ShardInventoryCli, _>(
        std::iter::once("shard_inventory_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let config = CatalogConfig::default();
    let transport = FsTransport::new(&cli.data_root).with_follow_symlinks(cli.follow_symlinks);
    let present = transport.discover_shards(&config);
    let expected = config.addressing.total_shards;
    let missing = (1..=expected).filter(|shard| present.binary_search(shard).is_err());
    let (missing_count, first_missing) =
        missing.fold((0usize, Vec::new()), |(count, mut first), shard| {
            if first.len() < 10 {
                first.push(shard);
            }
            (count + 1, first)
        });

    println!("Scanned {}", transport.root().display());
    println!("present shards : {}", present.len());
    println!("expected shards: {expected}");
    println!("missing shards : {missing_count}");
    if !first_missing.is_empty() {
        println!("first missing  : {first_missing:?}");
    }
    let beyond: Vec<_> = present.iter().filter(|shard| **shard > expected).collect();
    if !beyond.is_empty() {
        println!("beyond layout  : {beyond:?}");
    }
    Ok(())
}

fn print_video(video: &Video) {
    println!("--- video {} ---", video.id);
    println!("title      : {}", video.title);
    println!("performer  : {}", video.performer);
    println!("duration   : {}", video.duration);
    println!("tags       : {}", video.tags.join(", "));
    println!("categories : {}", video.categories.join(", "));
    println!(
        "views={} likes={} dislikes={}",
        video.views_count(),
        video.likes_count(),
        video.dislikes_count()
    );
    println!("embed      : {}", video.embed);
}

fn print_video_line(video: &Video) {
    println!(
        "{:>6}  {:<48}  {:>5}  views={}",
        video.id,
        truncate(&video.title, 48),
        video.duration,
        video.views_count()
    );
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn print_shard_summary(reader: &CatalogReader) {
    let store = reader.loader().store();
    for index in reader.cached_shards() {
        let Some(shard) = store.get(index) else {
            continue;
        };
        let origin = match &shard.origin {
            ShardOrigin::Fetched { dropped } => format!("fetched (dropped {dropped})"),
            ShardOrigin::Synthesized { reason } => format!("synthesized ({reason})"),
        };
        println!(
            "shard {:>4}: {:>3} records, {}",
            index,
            shard.records.len(),
            origin
        );
    }
}

fn print_stats(stats: &LoaderStatsSnapshot) {
    println!(
        "loader: fetches={} fetched={} synthesized={} failed={} dropped_records={} degraded_share={:.2}",
        stats.fetch_attempts,
        stats.fetched_shards,
        stats.synthesized_shards,
        stats.failed_shards,
        stats.dropped_records,
        stats.degraded_share()
    );
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(raw: &str) -> Result<u64, String> {
    let parsed = raw
        .parse::<u64>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
