use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{DestinationError, SinkError};
use crate::noop_sink::NoopSink;
use crate::sink::LineSink;
use crate::stream::{ConsoleSink, FileSink};

/// Where a logger writes its lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Destination {
    /// Interactive console on standard output; levels are colored.
    #[default]
    Stdout,
    /// Interactive console on standard error; levels are colored.
    Stderr,
    /// Append to a file; output is plain JSON.
    File(PathBuf),
    /// Discard everything.
    Discard,
}

impl Destination {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Destination::File(path.into())
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Destination::File(_))
    }
}

/// Parse a destination string.
///
/// Accepted forms:
/// - "stdout", "console" or "-"
/// - "stderr"
/// - "discard" or "null"
/// - "file:///var/log/app.log" (percent-encoded path)
/// - a bare path such as "/var/log/app.log" or "logs/app.log"
pub fn parse_destination(dsn: &str) -> Result<Destination, DestinationError> {
    let trimmed = dsn.trim();
    let lower = trimmed.to_ascii_lowercase();

    match lower.as_str() {
        "stdout" | "console" | "-" => return Ok(Destination::Stdout),
        "stderr" => return Ok(Destination::Stderr),
        "discard" | "null" => return Ok(Destination::Discard),
        "" => return Err(DestinationError::EmptyPath),
        _ => {}
    }

    if lower.starts_with("file://") {
        let encoded = &trimmed["file://".len()..];
        if encoded.is_empty() {
            return Err(DestinationError::EmptyPath);
        }
        let decoded =
            urlencoding::decode(encoded).map_err(|_| DestinationError::InvalidEncoding)?;
        return Ok(Destination::File(PathBuf::from(decoded.into_owned())));
    }

    // Anything else that looks like `scheme://` is not ours. A single
    // letter before `:` is a Windows drive, not a scheme.
    if let Some((scheme, _)) = trimmed.split_once("://") {
        if scheme.len() > 1 {
            return Err(DestinationError::UnknownScheme(scheme.to_string()));
        }
    }

    Ok(Destination::File(PathBuf::from(trimmed)))
}

/// Create the [`LineSink`] for a destination.
pub fn make_sink(destination: &Destination) -> Result<Arc<dyn LineSink>, SinkError> {
    match destination {
        Destination::Stdout => Ok(Arc::new(ConsoleSink::stdout())),
        Destination::Stderr => Ok(Arc::new(ConsoleSink::stderr())),
        Destination::File(path) => Ok(Arc::new(FileSink::open(path)?)),
        Destination::Discard => Ok(Arc::new(NoopSink)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_console_names() {
        assert_eq!(parse_destination("stdout"), Ok(Destination::Stdout));
        assert_eq!(parse_destination(" Console "), Ok(Destination::Stdout));
        assert_eq!(parse_destination("-"), Ok(Destination::Stdout));
        assert_eq!(parse_destination("STDERR"), Ok(Destination::Stderr));
        assert_eq!(parse_destination("null"), Ok(Destination::Discard));
    }

    #[test]
    fn parses_file_urls_and_paths() {
        assert_eq!(
            parse_destination("file:///var/log/my%20app.log"),
            Ok(Destination::file("/var/log/my app.log"))
        );
        assert_eq!(
            parse_destination("logs/app.log"),
            Ok(Destination::file("logs/app.log"))
        );
        assert!(parse_destination("logs/app.log").unwrap().is_file());
    }

    #[test]
    fn rejects_foreign_schemes_and_empty_paths() {
        assert_eq!(
            parse_destination("kafka://broker/topic"),
            Err(DestinationError::UnknownScheme("kafka".to_string()))
        );
        assert_eq!(parse_destination("file://"), Err(DestinationError::EmptyPath));
        assert_eq!(parse_destination("  "), Err(DestinationError::EmptyPath));
    }

    #[test]
    fn file_sink_is_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let sink = make_sink(&Destination::file(dir.path().join("out.log"))).unwrap();
        assert!(sink.is_file());
        assert!(!make_sink(&Destination::Stdout).unwrap().is_file());
    }
}
