use async_json_logger::init::LoggerConfig;
use async_json_logger::noop_sink::CaptureSink;
use async_json_logger::Logger;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

const THREADS: u64 = 8;
const PER_THREAD: u64 = 500;

#[test]
fn concurrent_producers_never_lose_or_interleave_lines() {
    let capture = CaptureSink::new();
    let logger = Logger::with_sink(
        LoggerConfig::default().with_app_name("load").with_queue_capacity(16),
        Arc::new(capture.clone()),
    )
    .unwrap();

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let logger = logger.clone();
            thread::spawn(move || {
                for seq in 0..PER_THREAD {
                    async_json_logger::info!(logger, "tick \"{}\"", seq; worker = worker, seq = seq);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    logger.shutdown();

    let lines = capture.lines();
    assert_eq!(lines.len() as u64, THREADS * PER_THREAD);

    // every line is one complete object and each producer's lines keep their order
    let mut next: HashMap<u64, u64> = HashMap::new();
    for line in &lines {
        assert_eq!(line.matches('\n').count(), 1);
        let value: Value = serde_json::from_str(line).expect("valid json");
        let worker = value["worker"].as_u64().unwrap();
        let seq = value["seq"].as_u64().unwrap();
        let expected = next.entry(worker).or_insert(0);
        assert_eq!(seq, *expected);
        *expected += 1;
    }
    assert_eq!(next.len() as u64, THREADS);

    let stats = logger.stats();
    assert_eq!(stats.enqueued, THREADS * PER_THREAD);
    assert_eq!(stats.written, THREADS * PER_THREAD);
}

#[test]
fn concurrent_file_writes_are_line_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.log");
    let logger = Logger::new(
        LoggerConfig::default()
            .with_destination(async_json_logger::destination::Destination::file(&path))
            .with_queue_capacity(4),
    )
    .unwrap();

    thread::scope(|scope| {
        for worker in 0..4u64 {
            let logger = &logger;
            scope.spawn(move || {
                for seq in 0..250u64 {
                    async_json_logger::warn!(logger, "payload"; worker = worker, seq = seq, blob = "x".repeat(512));
                }
            });
        }
    });
    logger.shutdown();

    let contents = std::fs::read_to_string(&path).unwrap();
    let count = contents
        .lines()
        .map(|l| serde_json::from_str::<Value>(l).expect("valid json"))
        .count();
    assert_eq!(count, 1000);
}
