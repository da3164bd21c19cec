use async_json_logger::destination::Destination;
use async_json_logger::init::{init_tracing_with_config, LoggerConfig};
use serde_json::Value;

// Installs the global subscriber, so it lives in its own test binary.
#[test]
fn builds_a_logger_and_installs_it_globally() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("svc.log");

    let logger = init_tracing_with_config(
        LoggerConfig::default()
            .with_app_name("svc")
            .with_destination(Destination::file(&path)),
    )
    .unwrap();
    assert!(!logger.is_colorized());

    tracing::warn!(attempt = 3u64, "upstream slow");
    async_json_logger::info!(logger, "direct call");
    logger.shutdown();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["msg"], "init_with_config: upstream slow");
    assert_eq!(lines[0]["attempt"], 3);
    assert_eq!(lines[0]["app"], "svc");
    assert_eq!(
        lines[1]["msg"],
        "builds_a_logger_and_installs_it_globally: direct call"
    );

    assert!(init_tracing_with_config(LoggerConfig::default()).is_err());
}
