use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_json_logger::init::{init_tracing, LoggerConfig};
use async_json_logger::sink::LineSink;
use async_json_logger::value::Attributes;
use async_json_logger::Logger;
use async_trait::async_trait;
use tracing::{error, info};

/// Example of plugging in a completely custom output by implementing
/// `LineSink` directly. Imagine this ships lines to some collector the
/// crate has no built-in destination for.
#[derive(Default)]
struct NumberedSink {
    seq: AtomicUsize,
}

#[async_trait]
impl LineSink for NumberedSink {
    async fn write_line(&self, line: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        print!("[collector #{}] {}", n, line);
        Ok(())
    }

    // Pretend to be a file so lines arrive without color codes.
    fn is_file(&self) -> bool {
        true
    }
}

fn main() {
    let logger = Logger::builder(LoggerConfig::default().with_app_name("custom-sink"))
        .sink(Arc::new(NumberedSink::default()))
        .context(|| Attributes::new().with("pid", std::process::id()))
        .build()
        .expect("logger");

    async_json_logger::info!(logger, "custom sink example started");
    async_json_logger::critical!(logger, "replica lag too high"; lag_ms = 4_500, replica = "db-2");

    init_tracing(logger.clone()).expect("install subscriber");
    info!("events from tracing go to the same sink");
    error!(db = "collector", "simulated error sent via custom sink");

    logger.shutdown();
}
