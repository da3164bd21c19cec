use async_json_logger::init::{init_tracing, LoggerConfig};
use async_json_logger::noop_sink::CaptureSink;
use async_json_logger::Logger;
use serde_json::Value;
use std::sync::Arc;

// The global subscriber can be installed once per process.
#[test]
fn tracing_macros_reach_the_installed_logger() {
    let capture = CaptureSink::new();
    let logger = Logger::with_sink(
        LoggerConfig::default().with_app_name("svc").with_host_name("h1"),
        Arc::new(capture.clone()),
    )
    .unwrap();

    init_tracing(logger.clone()).unwrap();
    assert!(init_tracing(logger.clone()).is_err());

    let span = tracing::info_span!("job", job_id = 17u64);
    span.in_scope(|| {
        tracing::info!(attempt = 2u64, "job started");
        tracing::debug!("not enabled");
        tracing::error!(severity = "fatal", "job lost");
    });
    logger.shutdown();

    let lines: Vec<Value> = capture
        .lines()
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);

    let keys: Vec<_> = lines[0].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["time", "level", "msg", "file", "app", "host", "job_id", "attempt"]);
    assert_eq!(lines[0]["msg"], "global_subscriber: job started");
    assert_eq!(lines[1]["level"], "FATAL");
    assert_eq!(lines[1]["job_id"], 17);
}
