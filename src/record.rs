use crate::callsite::CallSite;
use crate::level::Level;
use crate::value::Attributes;
use chrono::{DateTime, Utc};
use std::borrow::Cow;

/// One log call, alive only while it is being formatted.
#[derive(Debug, Clone)]
pub struct LogEvent<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: Cow<'a, str>,
    pub callsite: CallSite,
    /// Context-derived and per-call attributes, already merged.
    pub attributes: Attributes,
}

impl<'a> LogEvent<'a> {
    /// Event stamped with the current time and no attributes.
    pub fn new(level: Level, message: impl Into<Cow<'a, str>>, callsite: CallSite) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            callsite,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
