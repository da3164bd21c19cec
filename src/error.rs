use std::io;
use std::path::PathBuf;

/// Error returned by the background writer when a line cannot be queued
/// or the writer cannot be started.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("log sink is shut down")]
    Closed,

    #[error("log queue is full")]
    Full,

    #[error("failed to spawn log writer thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to build log writer runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error type returned when parsing a destination string.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DestinationError {
    #[error("unknown or unsupported destination scheme: {0}")]
    UnknownScheme(String),

    #[error("file destination has an empty path")]
    EmptyPath,

    #[error("file destination path is not valid percent-encoded UTF-8")]
    InvalidEncoding,
}

/// Error type returned when reading a [`LoggerConfig`](crate::init::LoggerConfig)
/// from the environment.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    Destination(#[from] DestinationError),
}

/// Error type returned when building a logger or installing it globally.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("failed to install global subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Error returned when a level name is not recognised.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);
