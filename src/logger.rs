use crate::assembler::LineAssembler;
use crate::async_sink::{AsyncSink, SinkStats};
use crate::callsite::CallSite;
use crate::destination::make_sink;
use crate::error::SinkError;
use crate::init::LoggerConfig;
use crate::level::Level;
use crate::record::LogEvent;
use crate::sink::LineSink;
use crate::value::Attributes;
use std::fmt;
use std::sync::Arc;

/// Supplies attributes from the caller's ambient context (task-locals,
/// thread-locals, request state). Called once per emitted event; may return
/// an empty set.
pub type ContextHook = Arc<dyn Fn() -> Attributes + Send + Sync>;

/// Handle to one logging pipeline: formatter, queue and writer.
///
/// Cheap to clone; clones share the same queue and writer. Formatting runs
/// on the calling thread, only the write happens on the background writer.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    assembler: LineAssembler,
    sink: AsyncSink,
    min_level: Level,
    context: Option<ContextHook>,
}

/// Builder for a [`Logger`] with a custom sink or a context hook.
pub struct LoggerBuilder {
    config: LoggerConfig,
    sink: Option<Arc<dyn LineSink>>,
    context: Option<ContextHook>,
}

impl LoggerBuilder {
    /// Write to `sink` instead of the configured destination. Colors follow
    /// [`LineSink::is_file`].
    pub fn sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn context<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Attributes + Send + Sync + 'static,
    {
        self.context = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<Logger, SinkError> {
        let LoggerConfig {
            app_name,
            host_name,
            destination,
            debug_enabled,
            queue_capacity,
            flush_interval,
            styles,
        } = self.config;

        let sink = match self.sink {
            Some(sink) => sink,
            None => make_sink(&destination)?,
        };
        let sink = AsyncSink::new(sink, queue_capacity, flush_interval)?;
        let assembler = LineAssembler::new(app_name, host_name, sink.is_file(), styles);

        Ok(Logger {
            inner: Arc::new(Inner {
                assembler,
                sink,
                min_level: if debug_enabled { Level::Debug } else { Level::Info },
                context: self.context,
            }),
        })
    }
}

impl Logger {
    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder {
            config,
            sink: None,
            context: None,
        }
    }

    /// Logger writing to the configured destination.
    pub fn new(config: LoggerConfig) -> Result<Self, SinkError> {
        Self::builder(config).build()
    }

    /// Logger writing to `sink`.
    pub fn with_sink(config: LoggerConfig, sink: Arc<dyn LineSink>) -> Result<Self, SinkError> {
        Self::builder(config).sink(sink).build()
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.inner.min_level
    }

    pub fn min_level(&self) -> Level {
        self.inner.min_level
    }

    /// Whether lines carry terminal color codes.
    pub fn is_colorized(&self) -> bool {
        self.inner.assembler.is_colorized()
    }

    /// Attributes from the context hook, or an empty set without one.
    pub fn context_attributes(&self) -> Attributes {
        match &self.inner.context {
            Some(hook) => hook(),
            None => Attributes::new(),
        }
    }

    /// Format one event and queue it for writing.
    ///
    /// Context attributes come first; `attributes` overwrite any context
    /// attribute with the same key. Blocks while the queue is full. Never
    /// fails: a line rejected by a shut-down sink is reported on stderr.
    pub fn emit(&self, callsite: CallSite, level: Level, message: &str, attributes: Attributes) {
        if !self.enabled(level) {
            return;
        }
        let event = self.event(callsite, level, message, attributes);
        self.emit_event(&event);
    }

    /// [`emit`](Self::emit) for async callers: awaits queue space instead of
    /// blocking the thread.
    pub async fn emit_async(
        &self,
        callsite: CallSite,
        level: Level,
        message: &str,
        attributes: Attributes,
    ) {
        if !self.enabled(level) {
            return;
        }
        let line = {
            let event = self.event(callsite, level, message, attributes);
            self.inner.assembler.assemble(&event)
        };
        if let Err(e) = self.inner.sink.enqueue_async(line).await {
            eprintln!("log line not written: {}", e);
        }
    }

    /// Queue an already merged event. Level filtering is the caller's job.
    pub fn emit_event(&self, event: &LogEvent<'_>) {
        let line = self.inner.assembler.assemble(event);
        if let Err(e) = self.inner.sink.enqueue(line) {
            eprintln!("log line not written: {}", e);
        }
    }

    /// Emit a FATAL event, wait for every queued line to be written, then
    /// terminate the process with status 1.
    pub fn fatal(&self, callsite: CallSite, message: &str, attributes: Attributes) -> ! {
        self.emit(callsite, Level::Fatal, message, attributes);
        self.shutdown();
        std::process::exit(1)
    }

    /// The line `emit` would queue, without queueing it.
    pub fn format_line(
        &self,
        callsite: CallSite,
        level: Level,
        message: &str,
        attributes: Attributes,
    ) -> String {
        let event = self.event(callsite, level, message, attributes);
        self.inner.assembler.assemble(&event)
    }

    /// Stop the writer after everything queued so far is written. Later
    /// events are reported on stderr and discarded.
    pub fn shutdown(&self) {
        self.inner.sink.shutdown();
    }

    pub fn stats(&self) -> SinkStats {
        self.inner.sink.stats()
    }

    fn event<'a>(
        &self,
        callsite: CallSite,
        level: Level,
        message: &'a str,
        attributes: Attributes,
    ) -> LogEvent<'a> {
        let merged = match &self.inner.context {
            Some(hook) => {
                let mut merged = hook();
                merged.extend(attributes);
                merged
            }
            None => attributes,
        };
        LogEvent::new(level, message, callsite).with_attributes(merged)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.inner.min_level)
            .field("colorized", &self.inner.assembler.is_colorized())
            .field("stats", &self.inner.sink.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop_sink::CaptureSink;
    use serde_json::Value;

    fn capture_logger(config: LoggerConfig) -> (Logger, CaptureSink) {
        let capture = CaptureSink::new();
        let logger = Logger::with_sink(config, Arc::new(capture.clone())).unwrap();
        (logger, capture)
    }

    #[test]
    fn debug_is_filtered_unless_enabled() {
        let (logger, capture) = capture_logger(LoggerConfig::default());
        logger.emit(CallSite::unknown(), Level::Debug, "hidden", Attributes::new());
        logger.emit(CallSite::unknown(), Level::Info, "shown", Attributes::new());
        logger.shutdown();
        assert_eq!(capture.len(), 1);

        let (logger, capture) = capture_logger(LoggerConfig::default().with_debug(true));
        logger.emit(CallSite::unknown(), Level::Debug, "shown", Attributes::new());
        logger.shutdown();
        assert_eq!(capture.len(), 1);
    }

    #[test]
    fn call_attributes_override_context_attributes() {
        let capture = CaptureSink::new();
        let logger = Logger::builder(LoggerConfig::default())
            .sink(Arc::new(capture.clone()))
            .context(|| Attributes::new().with("request_id", "r-1").with("user", "ctx"))
            .build()
            .unwrap();

        logger.emit(
            CallSite::unknown(),
            Level::Info,
            "hi",
            Attributes::new().with("user", "call").with("n", 1),
        );
        logger.shutdown();

        let line = &capture.lines()[0];
        let value: Value = serde_json::from_str(line).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["time", "level", "msg", "file", "request_id", "user", "n"]);
        assert_eq!(value["user"], "call");
    }

    #[test]
    fn sink_decides_colors() {
        let (logger, _) = capture_logger(LoggerConfig::default());
        assert!(!logger.is_colorized());

        let console = Logger::with_sink(LoggerConfig::default(), Arc::new(CaptureSink::console())).unwrap();
        assert!(console.is_colorized());
    }

    #[test]
    fn format_line_matches_emitted_line_without_queueing() {
        let (logger, capture) = capture_logger(LoggerConfig::default().with_app_name("svc"));
        let site = CallSite::new("svc::checkout", "src/checkout.rs", 12);

        let line = logger.format_line(site, Level::Warn, "retry", Attributes::new().with("n", 2));
        assert!(line.ends_with(
            r#","level":"WARN","msg":"checkout: retry","file":"checkout.rs:12","app":"svc","n":2}
"#
        ));

        logger.shutdown();
        assert!(capture.is_empty());
        assert_eq!(logger.stats().enqueued, 0);
    }

    #[test]
    fn emit_after_shutdown_is_not_fatal() {
        let (logger, capture) = capture_logger(LoggerConfig::default());
        logger.shutdown();
        logger.emit(CallSite::unknown(), Level::Error, "late", Attributes::new());
        assert!(capture.is_empty());
    }
}
