use crate::error::SinkError;
use crate::sink::LineSink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

/// Lower bound for the periodic flush interval.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

const MAX_POLL_BACKOFF: Duration = Duration::from_millis(5);

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of an [`AsyncSink`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Lines accepted by the queue.
    pub enqueued: u64,
    /// Lines the underlying stream accepted.
    pub written: u64,
    /// Lines the underlying stream rejected.
    pub failed: u64,
}

/// Bounded queue drained by one dedicated writer thread.
///
/// Any number of threads may enqueue. The writer owns the only handle to the
/// underlying [`LineSink`] and writes lines strictly in the order they were
/// queued, so lines never interleave and the output order equals the enqueue
/// order.
///
/// A full queue blocks the producer until the writer frees a slot; lines are
/// never dropped. A slow stream therefore eventually slows every producer.
///
/// [`shutdown`](Self::shutdown) stops accepting lines, writes everything
/// already queued, flushes the stream and joins the writer. Dropping the sink
/// does the same.
pub struct AsyncSink {
    sender: mpsc::Sender<String>,
    stop: Mutex<Option<oneshot::Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
    is_file: bool,
}

impl AsyncSink {
    /// Start the writer thread for `sink`.
    ///
    /// `capacity` is clamped to at least one line and `flush_interval` to
    /// at least [`MIN_FLUSH_INTERVAL`].
    pub fn new(
        sink: Arc<dyn LineSink>,
        capacity: usize,
        flush_interval: Duration,
    ) -> Result<Self, SinkError> {
        let capacity = capacity.max(1);
        let flush_interval = flush_interval.max(MIN_FLUSH_INTERVAL);

        let (tx, rx) = mpsc::channel::<String>(capacity);
        let (stop_tx, stop_rx) = oneshot::channel();
        let counters = Arc::new(Counters::default());
        let is_file = sink.is_file();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SinkError::Runtime)?;

        let counters_bg = Arc::clone(&counters);
        let worker = std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                runtime.block_on(run_writer(sink, rx, stop_rx, flush_interval, counters_bg));
            })
            .map_err(SinkError::Spawn)?;

        Ok(Self {
            sender: tx,
            stop: Mutex::new(Some(stop_tx)),
            worker: Mutex::new(Some(worker)),
            counters,
            is_file,
        })
    }

    /// Queue a line, blocking while the queue is full.
    ///
    /// A missing line terminator is appended. Returns
    /// [`SinkError::Closed`] once the sink has been shut down.
    ///
    /// Outside an async runtime the thread parks until a slot frees up.
    /// Inside one it polls with a short sleep instead, since parking on the
    /// channel is not allowed there; async callers should prefer
    /// [`enqueue_async`](Self::enqueue_async).
    pub fn enqueue(&self, line: impl Into<String>) -> Result<(), SinkError> {
        match self.sender.try_send(terminated(line.into())) {
            Ok(()) => {}
            Err(TrySendError::Closed(_)) => return Err(SinkError::Closed),
            Err(TrySendError::Full(line)) => self.wait_for_slot(line)?,
        }
        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Queue a line only if there is room right now.
    pub fn try_enqueue(&self, line: impl Into<String>) -> Result<(), SinkError> {
        self.sender
            .try_send(terminated(line.into()))
            .map_err(|e| match e {
                TrySendError::Full(_) => SinkError::Full,
                TrySendError::Closed(_) => SinkError::Closed,
            })?;
        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Queue a line, awaiting a free slot instead of blocking the thread.
    pub async fn enqueue_async(&self, line: impl Into<String>) -> Result<(), SinkError> {
        self.sender
            .send(terminated(line.into()))
            .await
            .map_err(|_| SinkError::Closed)?;
        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn wait_for_slot(&self, mut line: String) -> Result<(), SinkError> {
        if Handle::try_current().is_err() {
            return self.sender.blocking_send(line).map_err(|_| SinkError::Closed);
        }

        let mut backoff = Duration::from_micros(50);
        loop {
            std::thread::sleep(backoff);
            match self.sender.try_send(line) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Closed(_)) => return Err(SinkError::Closed),
                Err(TrySendError::Full(rejected)) => {
                    line = rejected;
                    backoff = (backoff * 2).min(MAX_POLL_BACKOFF);
                }
            }
        }
    }

    /// Stop accepting lines, write out everything queued and join the writer.
    ///
    /// Idempotent. Lines whose enqueue returned `Ok` before this call are
    /// all written when it returns.
    pub fn shutdown(&self) {
        if let Some(stop) = self.stop.lock().take() {
            let _ = stop.send(());
        }

        if let Some(worker) = self.worker.lock().take() {
            if worker.thread().id() == std::thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                eprintln!("log writer thread panicked");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Whether the underlying stream is file-backed.
    pub fn is_file(&self) -> bool {
        self.is_file
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Lines currently waiting in the queue.
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn stats(&self) -> SinkStats {
        SinkStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            written: self.counters.written.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn terminated(mut line: String) -> String {
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

async fn run_writer(
    sink: Arc<dyn LineSink>,
    mut rx: mpsc::Receiver<String>,
    mut stop: oneshot::Receiver<()>,
    flush_interval: Duration,
    counters: Arc<Counters>,
) {
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            // a dropped stop handle counts as a stop request
            _ = &mut stop => break,
            line = rx.recv() => match line {
                Some(line) => write_line(&*sink, &line, &counters).await,
                None => break,
            },
            _ = ticker.tick() => flush(&*sink).await,
        }
    }

    rx.close();
    while let Some(line) = rx.recv().await {
        write_line(&*sink, &line, &counters).await;
    }
    flush(&*sink).await;
}

async fn write_line(sink: &dyn LineSink, line: &str, counters: &Counters) {
    match sink.write_line(line).await {
        Ok(()) => {
            counters.written.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            eprintln!("error writing log line: {}", e);
        }
    }
}

async fn flush(sink: &dyn LineSink) {
    if let Err(e) = sink.flush().await {
        eprintln!("error flushing log sink: {}", e);
    }
}
