use chrono::{DateTime, SecondsFormat, TimeZone};
use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::time::Duration;

/// Value of a single log attribute.
///
/// Scalars keep their native representation and are written without going
/// through a serializer. Everything else is captured as a `serde_json`
/// value, or as its `Debug` text when serialization fails.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(Cow<'static, str>),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Null,
    Json(serde_json::Value),
}

impl FieldValue {
    /// Capture any serializable value.
    ///
    /// If serialization fails the field is kept as a string holding the
    /// value's `Debug` form, so the attribute is never dropped.
    pub fn any<T>(value: &T) -> Self
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        match serde_json::to_value(value) {
            Ok(json) => FieldValue::Json(json),
            Err(_) => FieldValue::Str(Cow::Owned(format!("{value:?}"))),
        }
    }

    /// Display text of an error.
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        FieldValue::Str(Cow::Owned(err.to_string()))
    }

    /// Timestamp as RFC 3339 with millisecond precision.
    pub fn time<Tz>(value: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        FieldValue::Str(Cow::Owned(value.to_rfc3339_opts(SecondsFormat::Millis, true)))
    }

    /// Duration as fractional seconds.
    pub fn duration(value: Duration) -> Self {
        FieldValue::F64(value.as_secs_f64())
    }
}

impl From<&'static str> for FieldValue {
    fn from(value: &'static str) -> Self {
        FieldValue::Str(Cow::Borrowed(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(Cow::Owned(value))
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Str(Cow::Owned(value.clone()))
    }
}

impl From<Cow<'static, str>> for FieldValue {
    fn from(value: Cow<'static, str>) -> Self {
        FieldValue::Str(value)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value as $wide)
                }
            }
        )+
    };
}

impl_from_int!(I64, i64: i8, i16, i32, i64, isize);
impl_from_int!(U64, u64: u8, u16, u32, u64, usize);

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::F32(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::F64(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Duration> for FieldValue {
    fn from(value: Duration) -> Self {
        FieldValue::duration(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Json(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Append `value` to `buf` as JSON.
///
/// Strings, integers, floats and booleans are formatted directly into
/// `buf`. Floats use their shortest round-trip form; non-finite floats,
/// which JSON cannot represent, are written as quoted text.
pub fn encode_value(buf: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Str(s) => push_json_str(buf, s),
        FieldValue::I64(n) => {
            let _ = write!(buf, "{n}");
        }
        FieldValue::U64(n) => {
            let _ = write!(buf, "{n}");
        }
        FieldValue::F32(n) if n.is_finite() => {
            let _ = write!(buf, "{n}");
        }
        FieldValue::F64(n) if n.is_finite() => {
            let _ = write!(buf, "{n}");
        }
        FieldValue::F32(n) => push_quoted_display(buf, n),
        FieldValue::F64(n) => push_quoted_display(buf, n),
        FieldValue::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        FieldValue::Null => buf.push_str("null"),
        FieldValue::Json(json) => match serde_json::to_string(json) {
            Ok(text) => buf.push_str(&text),
            Err(_) => push_quoted_display(buf, json),
        },
    }
}

fn push_quoted_display(buf: &mut String, value: &dyn fmt::Display) {
    push_json_str(buf, &value.to_string());
}

/// Append `s` to `buf` as a quoted, escaped JSON string.
pub fn push_json_str(buf: &mut String, s: &str) {
    buf.push('"');
    escape_json_str(buf, s);
    buf.push('"');
}

/// Append the JSON-escaped contents of `s` (without quotes) to `buf`.
pub fn escape_json_str(buf: &mut String, s: &str) {
    let mut start = 0;
    for (i, c) in s.char_indices() {
        let escaped = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{08}' => "\\b",
            '\u{0c}' => "\\f",
            c if (c as u32) < 0x20 => "",
            _ => continue,
        };
        buf.push_str(&s[start..i]);
        if escaped.is_empty() {
            let _ = write!(buf, "\\u{:04x}", c as u32);
        } else {
            buf.push_str(escaped);
        }
        start = i + c.len_utf8();
    }
    buf.push_str(&s[start..]);
}

/// Ordered, key-unique attribute set.
///
/// Insertion order is preserved. Inserting an existing key replaces its
/// value but keeps its original position. Empty keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    fields: IndexMap<Cow<'static, str>, FieldValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }
        self.fields.insert(key, value.into());
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn extend(&mut self, other: Attributes) {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<Cow<'static, str>>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoded(value: impl Into<FieldValue>) -> String {
        let mut buf = String::new();
        encode_value(&mut buf, &value.into());
        buf
    }

    #[test]
    fn scalars_use_native_form() {
        assert_eq!(encoded(8080), "8080");
        assert_eq!(encoded(-7i8), "-7");
        assert_eq!(encoded(u64::MAX), "18446744073709551615");
        assert_eq!(encoded(0.1f32), "0.1");
        assert_eq!(encoded(2.5f64), "2.5");
        assert_eq!(encoded(true), "true");
        assert_eq!(encoded(None::<i32>), "null");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(encoded("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(encoded("a\\b\nc\u{1}"), r#""a\\b\nc\u0001""#);
        assert_eq!(encoded("żółw"), "\"żółw\"");
    }

    #[test]
    fn non_finite_floats_stay_valid_json() {
        assert_eq!(encoded(f64::NAN), "\"NaN\"");
        assert_eq!(encoded(f32::INFINITY), "\"inf\"");
    }

    #[test]
    fn structured_values_go_through_serde() {
        #[derive(Debug, Serialize)]
        struct Peer {
            addr: &'static str,
            ports: Vec<u16>,
        }

        let value = FieldValue::any(&Peer {
            addr: "10.0.0.1",
            ports: vec![80, 443],
        });
        let text = encoded(value);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({"addr": "10.0.0.1", "ports": [80, 443]}));
    }

    #[test]
    fn structured_values_keep_declaration_order() {
        #[derive(Debug, Serialize)]
        struct Order {
            zone: &'static str,
            amount: u32,
            buyer: &'static str,
        }

        let value = FieldValue::any(&Order {
            zone: "eu",
            amount: 3,
            buyer: "ann",
        });
        assert_eq!(encoded(value), r#"{"zone":"eu","amount":3,"buyer":"ann"}"#);
    }

    #[test]
    fn timestamps_use_rfc3339_millis() {
        use chrono::{FixedOffset, Utc};

        let utc = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(encoded(FieldValue::time(&utc)), "\"2024-03-09T14:05:07.000Z\"");

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = utc.with_timezone(&plus_two);
        assert_eq!(encoded(FieldValue::time(&local)), "\"2024-03-09T16:05:07.000+02:00\"");
    }

    #[test]
    fn failed_serialization_falls_back_to_debug_text() {
        use std::collections::HashMap;

        // non-string map keys cannot become JSON object keys
        let mut map = HashMap::new();
        map.insert(vec![1u8], 2u8);
        let value = FieldValue::any(&map);
        assert_eq!(value, FieldValue::Str(Cow::Owned("{[1]: 2}".to_string())));
    }

    #[test]
    fn durations_are_seconds() {
        assert_eq!(encoded(Duration::from_millis(1500)), "1.5");
    }

    #[test]
    fn later_insert_wins_and_keeps_position() {
        let mut attrs = Attributes::new().with("a", 1).with("b", 2);
        attrs.insert("a", 3);
        attrs.insert("", 4);

        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(attrs.get("a"), Some(&FieldValue::I64(3)));
    }

    #[test]
    fn extend_merges_in_order() {
        let mut attrs = Attributes::new().with("request_id", "r-1").with("user", "ann");
        attrs.extend(Attributes::new().with("user", "bob").with("port", 8080));

        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["request_id", "user", "port"]);
        assert_eq!(attrs.get("user"), Some(&FieldValue::from("bob")));
    }
}
