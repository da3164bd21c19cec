use async_trait::async_trait;
use std::error::Error;

/// Output stream at the end of the pipeline.
///
/// Implementations receive fully formatted lines from the single
/// background writer of an [`AsyncSink`](crate::async_sink::AsyncSink), one
/// at a time and in enqueue order, so they never see concurrent calls from
/// the same logger.
#[async_trait]
pub trait LineSink: Send + Sync {
    /// Write a single newline-terminated line.
    ///
    /// **Parameters**
    /// - `line`: the complete line, terminator included. It must be written
    ///   with a single write so lines never interleave.
    ///
    /// **Returns**
    /// - `Ok(())` once the stream accepted the line.
    /// - `Err(..)` if the stream failed. The writer reports the error on
    ///   stderr and moves on to the next line; it does not retry.
    async fn write_line(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered output.
    ///
    /// Called periodically and once more during shutdown. Default
    /// implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    /// Whether this stream is backed by a file rather than a terminal.
    /// File-backed streams never receive color escape codes.
    fn is_file(&self) -> bool {
        false
    }
}
