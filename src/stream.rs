use crate::error::SinkError;
use crate::sink::LineSink;
use async_trait::async_trait;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Sink writing to the process's standard output or standard error.
///
/// Every line is flushed immediately so interactive output is not held back.
pub struct ConsoleSink {
    out: Mutex<BoxedWriter>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self {
            out: Mutex::new(Box::pin(tokio::io::stdout())),
        }
    }

    pub fn stderr() -> Self {
        Self {
            out: Mutex::new(Box::pin(tokio::io::stderr())),
        }
    }
}

#[async_trait]
impl LineSink for ConsoleSink {
    async fn write_line(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.out.lock().await.flush().await?;
        Ok(())
    }
}

/// Sink appending to a file through a buffered writer.
///
/// Buffered output reaches the file on the writer's periodic flush and on
/// shutdown.
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Open `path` for appending, creating it when missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(File::from_std(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LineSink for FileSink {
    async fn write_line(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.writer.lock().await.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }

    fn is_file(&self) -> bool {
        true
    }
}
