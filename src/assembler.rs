use crate::pool::BufferPool;
use crate::record::LogEvent;
use crate::styles::LevelStyles;
use crate::value::{encode_value, escape_json_str, push_json_str, FieldValue};
use std::fmt::Write;

/// Format of the `time` field: UTC, millisecond precision, sortable.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub const APP_KEY: &str = "app";
pub const HOST_KEY: &str = "host";

/// Keys written by the assembler itself, ahead of any attribute.
pub const FIXED_KEYS: [&str; 4] = ["time", "level", "msg", "file"];

/// Prefix given to attributes whose key collides with a fixed key, so the
/// line never holds the same key twice.
pub const RENAMED_KEY_PREFIX: &str = "fields.";

/// Builds the JSON text of one event.
///
/// Field order is fixed: `time`, `level`, `msg`, `file`, then the static
/// fields (`app`, `host`) that are configured, then the event's attributes
/// in insertion order. A static field overridden by an attribute keeps its
/// slot and takes the attribute's value. An attribute named like a fixed
/// field (`time`, `level`, `msg`, `file`) is written as `fields.<key>`.
///
/// For console destinations the level value is written already wrapped in
/// its terminal style, so the escape codes appear exactly once and nowhere
/// else in the line. File destinations always get the plain level name.
#[derive(Debug)]
pub struct LineAssembler {
    static_fields: Vec<(&'static str, FieldValue)>,
    styles: Option<LevelStyles>,
    pool: BufferPool,
}

impl LineAssembler {
    pub fn new(
        app_name: Option<String>,
        host_name: Option<String>,
        destination_is_file: bool,
        styles: LevelStyles,
    ) -> Self {
        let mut static_fields = Vec::with_capacity(2);
        for (key, value) in [(APP_KEY, app_name), (HOST_KEY, host_name)] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                static_fields.push((key, FieldValue::from(value)));
            }
        }

        Self {
            static_fields,
            styles: (!destination_is_file).then_some(styles),
            pool: BufferPool::new(),
        }
    }

    /// Whether the level field is styled for a terminal.
    pub fn is_colorized(&self) -> bool {
        self.styles.is_some()
    }

    /// Newline-terminated JSON line for `event`.
    pub fn assemble(&self, event: &LogEvent<'_>) -> String {
        let site = event.callsite.resolve();
        let mut buf = self.pool.checkout();
        let mut fields = FieldWriter::new(&mut buf);

        fields.key("time");
        let _ = write!(fields.buf, "\"{}\"", event.timestamp.format(TIME_FORMAT));

        fields.key("level");
        fields.buf.push('"');
        match &self.styles {
            Some(styles) => fields.buf.push_str(&styles.render(event.level)),
            None => fields.buf.push_str(event.level.as_str()),
        }
        fields.buf.push('"');

        if !event.message.is_empty() {
            fields.key("msg");
            fields.buf.push('"');
            escape_json_str(fields.buf, &site.function);
            fields.buf.push_str(": ");
            escape_json_str(fields.buf, &event.message);
            fields.buf.push('"');
        }

        if !site.file.is_empty() {
            fields.key("file");
            fields.buf.push('"');
            escape_json_str(fields.buf, site.file);
            if site.line > 0 {
                let _ = write!(fields.buf, ":{}", site.line);
            }
            fields.buf.push('"');
        }

        for (key, value) in &self.static_fields {
            fields.key(key);
            encode_value(fields.buf, event.attributes.get(key).unwrap_or(value));
        }

        for (key, value) in event.attributes.iter() {
            if self.is_static_key(key) {
                continue;
            }
            if FIXED_KEYS.contains(&key) {
                fields.prefixed_key(RENAMED_KEY_PREFIX, key);
            } else {
                fields.key(key);
            }
            encode_value(fields.buf, value);
        }

        buf.push_str("}\n");
        buf.as_str().to_owned()
    }

    fn is_static_key(&self, key: &str) -> bool {
        self.static_fields.iter().any(|(k, _)| *k == key)
    }
}

struct FieldWriter<'b> {
    buf: &'b mut String,
    first: bool,
}

impl<'b> FieldWriter<'b> {
    fn new(buf: &'b mut String) -> Self {
        buf.push('{');
        Self { buf, first: true }
    }

    fn key(&mut self, key: &str) {
        self.separator();
        push_json_str(self.buf, key);
        self.buf.push(':');
    }

    fn prefixed_key(&mut self, prefix: &str, key: &str) {
        self.separator();
        self.buf.push('"');
        escape_json_str(self.buf, prefix);
        escape_json_str(self.buf, key);
        self.buf.push_str("\":");
    }

    fn separator(&mut self) {
        if !self.first {
            self.buf.push(',');
        }
        self.first = false;
    }
}
