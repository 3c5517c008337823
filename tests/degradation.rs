use std::sync::Arc;

use shardcat::constants::synth::MOCK_TITLE_PREFIX;
use shardcat::{
    CatalogConfig, CatalogError, CatalogReader, Degradation, DegradationPolicy, MemoryResponse,
    MemoryTransport, ShardOrigin, synthesize,
};

fn shard_path(shard: usize) -> String {
    format!("data/videos_page_{shard}.json")
}

fn minimal_payload(count: usize) -> String {
    let entries: Vec<String> = (0..count)
        .map(|local| format!(r#"{{"embed": "e{local}", "title": "Real {local}"}}"#))
        .collect();
    format!("[{}]", entries.join(","))
}

fn origin_of(reader: &CatalogReader, shard: usize) -> ShardOrigin {
    reader.loader().store().get(shard).unwrap().origin.clone()
}

#[test]
fn failing_shard_is_synthesized_while_neighbours_stay_real() {
    let mut transport = MemoryTransport::new();
    for shard in 1..=10 {
        transport = if shard == 5 {
            transport.with_response(shard_path(shard), MemoryResponse::Status(500))
        } else {
            transport.with_body(shard_path(shard), minimal_payload(100))
        };
    }
    let transport = Arc::new(transport);
    let reader = CatalogReader::new(CatalogConfig::default(), transport.clone()).unwrap();

    let window = reader.get_range(450, 50).unwrap();
    assert_eq!(window.len(), 50);
    assert_eq!(window[0].id, "450");
    assert!(window.iter().all(|video| video.title.starts_with(MOCK_TITLE_PREFIX)));

    let spanning = reader.get_range(390, 120).unwrap();
    assert_eq!(spanning.len(), 120);
    assert_eq!(spanning[0].title, "Real 90");
    assert!(spanning[10].title.starts_with(MOCK_TITLE_PREFIX));
    assert_eq!(spanning[110].title, "Real 0");

    assert_eq!(
        origin_of(&reader, 5),
        ShardOrigin::Synthesized {
            reason: Degradation::Status(500)
        }
    );
    let stats = reader.stats();
    assert_eq!(stats.synthesized_shards, 1);
    assert_eq!(stats.fetched_shards, 2);
    assert_eq!(stats.failed_shards, 0);
}

#[test]
fn every_degradation_kind_falls_back_to_synthesis() {
    let cases = [
        (
            MemoryResponse::Body(
                "version https://git-lfs.github.com/spec/v1\noid sha256:abc\nsize 12\n".into(),
            ),
            Degradation::LfsPointer,
        ),
        (
            MemoryResponse::Body(r#"{"videos": []}"#.into()),
            Degradation::NotAList,
        ),
        (
            MemoryResponse::Body(r#"[{"embed": "x"}, 3]"#.into()),
            Degradation::NotAList,
        ),
        (MemoryResponse::Timeout, Degradation::Timeout),
        (MemoryResponse::Status(404), Degradation::Status(404)),
    ];

    for (response, expected) in cases {
        let transport = Arc::new(MemoryTransport::new().with_response(shard_path(1), response));
        let reader = CatalogReader::new(CatalogConfig::default(), transport).unwrap();

        let records = reader.get_range(0, 100).unwrap();
        assert_eq!(records.len(), 100);
        assert_eq!(
            origin_of(&reader, 1),
            ShardOrigin::Synthesized { reason: expected }
        );
    }

    let transport =
        Arc::new(MemoryTransport::new().with_response(shard_path(1), MemoryResponse::Body("[{".into())));
    let reader = CatalogReader::new(CatalogConfig::default(), transport).unwrap();
    reader.get_by_id("0").unwrap().unwrap();
    assert!(matches!(
        origin_of(&reader, 1),
        ShardOrigin::Synthesized {
            reason: Degradation::Unparsable(_)
        }
    ));
}

#[test]
fn empty_shard_is_authentic_not_degraded() {
    let transport = Arc::new(MemoryTransport::new().with_body(shard_path(1), "[]"));
    let reader = CatalogReader::new(CatalogConfig::default(), transport).unwrap();

    assert!(reader.get_range(0, 100).unwrap().is_empty());
    assert_eq!(reader.get_by_id("0").unwrap(), None);
    assert_eq!(origin_of(&reader, 1), ShardOrigin::Fetched { dropped: 0 });
}

#[test]
fn synthesized_records_match_across_sessions() {
    let first = CatalogReader::new(CatalogConfig::default(), Arc::new(MemoryTransport::new()))
        .unwrap();
    let second = CatalogReader::new(CatalogConfig::default(), Arc::new(MemoryTransport::new()))
        .unwrap();

    let a = first.get_range(700, 100).unwrap();
    let b = second.get_range(700, 100).unwrap();

    assert_eq!(a, b);
    assert_eq!(a, synthesize(8, 100));
}

#[test]
fn propagate_policy_surfaces_errors_and_retries() {
    let transport = Arc::new(
        MemoryTransport::new()
            .with_response(shard_path(1), MemoryResponse::Status(503))
            .with_body(shard_path(2), minimal_payload(100)),
    );
    let config = CatalogConfig::default().with_policy(DegradationPolicy::Propagate);
    let reader = CatalogReader::new(config, transport.clone()).unwrap();

    let expected = CatalogError::ShardDegraded {
        shard: 1,
        reason: Degradation::Status(503),
    };
    assert_eq!(reader.get_by_id("3").unwrap_err(), expected);
    assert_eq!(reader.get_range(50, 100).unwrap_err(), expected);
    assert_eq!(reader.get_batch(["4", "150"]).unwrap_err(), expected);

    assert_eq!(transport.fetch_count(&shard_path(1)), 3);
    assert!(!reader.loader().store().contains(1));
    assert_eq!(reader.get_by_id("150").unwrap().unwrap().title, "Real 50");

    let stats = reader.stats();
    assert_eq!(stats.failed_shards, 3);
    assert_eq!(stats.synthesized_shards, 0);
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = CatalogConfig::default().with_fetch_timeout(std::time::Duration::ZERO);
    let result = CatalogReader::new(config, Arc::new(MemoryTransport::new()));
    assert!(matches!(result, Err(CatalogError::Configuration(_))));
}
