//! Console interception via the `tracing` facade
//!
//! Global dispatchers cannot be swapped once set, so interception is not a
//! function replacement: the host installs a [`CaptureLayer`] in its
//! subscriber stack once, and the console's intercept flag decides whether
//! observed events reach the buffer. Intercept/restore round-trips are flag
//! flips; the original logging path is untouched throughout.

use serde_json::{Map, Number, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use devpanel_types::{LogKind, LogValue};

use crate::console::{DevConsole, guard};

/// Layer that feeds host logging into one console instance
pub struct CaptureLayer {
    console: DevConsole,
}

impl CaptureLayer {
    pub(crate) fn new(console: DevConsole) -> Self {
        Self { console }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.console.is_intercepting() {
            return;
        }

        // The console's own mirror and store diagnostics must not loop back
        if event.metadata().target().starts_with("devpanel") {
            return;
        }

        // Nested event raised while a fan-out is in progress: drop it
        if guard::is_active() {
            return;
        }

        let kind = match *event.metadata().level() {
            Level::ERROR => LogKind::Error,
            Level::WARN => LogKind::Warn,
            Level::INFO => LogKind::Info,
            _ => LogKind::Log,
        };

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let mut content = Vec::new();
        if let Some(message) = collector.message {
            content.push(LogValue::Text(message));
        }
        if !collector.fields.is_empty() {
            content.push(LogValue::Record(Value::Object(collector.fields)));
        }
        if content.is_empty() {
            content.push(LogValue::Text(event.metadata().name().to_string()));
        }

        self.console.append(kind, content, Vec::new());
    }
}

/// Collects the `message` field and remaining structured fields of an event
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.insert(field, Value::String(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match Number::from_f64(value) {
            Some(n) => self.insert(field, Value::Number(n)),
            None => self.insert(field, Value::String(value.to_string())),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
}
