use crate::callsite::CallSite;
use crate::level::Level;
use crate::logger::Logger;
use crate::record::LogEvent;
use crate::value::{Attributes, FieldValue};
use std::error::Error;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Event field that raises an event to one of the extended levels, e.g.
/// `tracing::error!(severity = "critical", "disk full")`.
pub const SEVERITY_FIELD: &str = "severity";

/// `tracing_subscriber` layer that formats events with a [`Logger`].
///
/// The event's module, file and line become its call site; tracing does not
/// know the enclosing function, so events are attributed to their module
/// (`app::server` shows as `server`). Fields of the enclosing spans,
/// outermost first, are added as context attributes after the logger's own
/// context hook, and the event's fields come last.
pub struct JsonLineLayer {
    logger: Logger,
}

impl JsonLineLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

/// Fields recorded on a span, stored in its extensions.
struct SpanFields(Attributes);

impl<S> Layer<S> for JsonLineLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    // Events carrying a severity field are decided in `on_event`, once the
    // field value is known.
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        metadata.is_span()
            || metadata.fields().field(SEVERITY_FIELD).is_some()
            || self.logger.enabled(Level::from(*metadata.level()))
    }

    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = Attributes::new();
        attrs.record(&mut FieldVisitor::fields_only(&mut fields));
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            values.record(&mut FieldVisitor::fields_only(fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();

        let mut event_fields = Attributes::new();
        let mut message: Option<String> = None;
        let mut severity: Option<Level> = None;
        event.record(&mut FieldVisitor {
            fields: &mut event_fields,
            message: Some(&mut message),
            severity: Some(&mut severity),
        });

        let level = severity.unwrap_or_else(|| Level::from(*meta.level()));
        if !self.logger.enabled(level) {
            return;
        }

        let mut attributes = self.logger.context_attributes();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    attributes.extend(fields.clone());
                }
            }
        }
        attributes.extend(event_fields);

        let callsite = CallSite::new(
            meta.module_path().unwrap_or(meta.target()),
            meta.file().unwrap_or(""),
            meta.line().unwrap_or(0),
        );
        let record = LogEvent::new(level, message.unwrap_or_default(), callsite)
            .with_attributes(attributes);
        self.logger.emit_event(&record);
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut Attributes,
    message: Option<&'a mut Option<String>>,
    severity: Option<&'a mut Option<Level>>,
}

impl<'a> FieldVisitor<'a> {
    fn fields_only(fields: &'a mut Attributes) -> Self {
        Self {
            fields,
            message: None,
            severity: None,
        }
    }

    fn insert(&mut self, field: &Field, value: FieldValue) {
        self.fields.insert(field.name(), value);
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            if let Some(message) = self.message.as_deref_mut() {
                *message = Some(value.to_string());
                return;
            }
        }
        if field.name() == SEVERITY_FIELD {
            if let (Some(severity), Ok(level)) = (self.severity.as_deref_mut(), value.parse::<Level>()) {
                *severity = Some(level);
                return;
            }
        }
        self.insert(field, FieldValue::from(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, FieldValue::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, FieldValue::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, FieldValue::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, FieldValue::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.insert(field, FieldValue::error(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            if let Some(message) = self.message.as_deref_mut() {
                *message = Some(format!("{:?}", value));
                return;
            }
        }
        self.insert(field, FieldValue::from(format!("{:?}", value)));
    }
}
