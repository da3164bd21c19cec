use crate::error::ParseLevelError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordinal of `FATAL`, well above the highest standard level.
pub const FATAL_ORDINAL: i32 = 60;
/// Ordinal of `CRITICAL`, one step above `FATAL`.
pub const CRITICAL_ORDINAL: i32 = 61;

/// Severity of a log event.
///
/// The four standard levels use the usual spaced ordinals
/// (`DEBUG=-4`, `INFO=0`, `WARN=4`, `ERROR=8`) and take their display
/// names from `tracing`. `FATAL` and `CRITICAL` are extended levels whose
/// ordinals sit far above the standard range, so numeric comparison keeps
/// severity order and can never collide with a standard level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Critical,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Critical,
    ];

    pub const fn ordinal(self) -> i32 {
        match self {
            Level::Debug => -4,
            Level::Info => 0,
            Level::Warn => 4,
            Level::Error => 8,
            Level::Fatal => FATAL_ORDINAL,
            Level::Critical => CRITICAL_ORDINAL,
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.ordinal() == ordinal)
    }

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => tracing::Level::DEBUG.as_str(),
            Level::Info => tracing::Level::INFO.as_str(),
            Level::Warn => tracing::Level::WARN.as_str(),
            Level::Error => tracing::Level::ERROR.as_str(),
            // tracing has no notion of these two
            Level::Fatal => "FATAL",
            Level::Critical => "CRITICAL",
        }
    }

    pub fn is_extended(self) -> bool {
        matches!(self, Level::Fatal | Level::Critical)
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            // TRACE folds into DEBUG
            _ => Level::Debug,
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" | "TRACE" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            "CRITICAL" => Ok(Level::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Display name for an arbitrary numeric level.
///
/// Known ordinals map to their canonical name. Anything else is named
/// relative to the closest level at or below it (`INFO+2`, `ERROR+3`,
/// `CRITICAL+1`); ordinals below `DEBUG` are named `DEBUG-n`.
pub fn level_name(ordinal: i32) -> Cow<'static, str> {
    if let Some(level) = Level::from_ordinal(ordinal) {
        return Cow::Borrowed(level.as_str());
    }

    match Level::ALL
        .into_iter()
        .rev()
        .find(|level| level.ordinal() <= ordinal)
    {
        Some(base) => Cow::Owned(format!("{}+{}", base, ordinal - base.ordinal())),
        None => Cow::Owned(format!(
            "{}-{}",
            Level::Debug,
            Level::Debug.ordinal() - ordinal
        )),
    }
}
