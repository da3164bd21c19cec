use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::error;

use async_json_logger::init::{init_tracing, LoggerConfig};
use async_json_logger::noop_sink::NoopSink;
use async_json_logger::Logger;

const EVENTS: u64 = 100_000;
const THREADS: u64 = 4;

fn report(label: &str, n: u64, start: Instant) {
    let elapsed = start.elapsed();
    println!(
        "{}: sent {} events in {:?} (~{:.0} ev/s)",
        label,
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}

fn main() {
    let config = LoggerConfig::default()
        .with_app_name("throughput")
        .with_host_name("bench")
        .with_queue_capacity(50_000);
    let logger = Logger::with_sink(config, Arc::new(NoopSink)).expect("logger");

    let start = Instant::now();
    for i in 0..EVENTS {
        async_json_logger::error!(logger, "macro load test error"; iteration = i);
    }
    report("macros", EVENTS, start);

    let start = Instant::now();
    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..EVENTS / THREADS {
                    async_json_logger::info!(logger, "worker {} step", t; iteration = i);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }
    report("threads", EVENTS, start);

    init_tracing(logger.clone()).expect("install subscriber");
    let start = Instant::now();
    for i in 0..EVENTS {
        error!(iteration = i, "tracing load test error");
    }
    report("tracing", EVENTS, start);

    logger.shutdown();
    println!("{:?}", logger.stats());
}
