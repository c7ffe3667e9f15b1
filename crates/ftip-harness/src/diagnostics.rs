#![forbid(unsafe_code)]

//! Tracing capture for tests.
//!
//! [`capture_diagnostics`] installs a registry with a capture layer as the
//! thread's default subscriber for the duration of a closure and returns
//! every span and event recorded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// One captured event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    /// Recorded fields, including `message`.
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    #[must_use]
    pub fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// One captured span.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: String,
    pub fields: HashMap<String, String>,
}

/// Everything recorded by one [`capture_diagnostics`] call.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    pub events: Vec<CapturedEvent>,
    pub spans: Vec<CapturedSpan>,
}

impl Capture {
    /// Events emitted under `target`.
    #[must_use]
    pub fn events_for(&self, target: &str) -> Vec<&CapturedEvent> {
        self.events.iter().filter(|e| e.target == target).collect()
    }

    /// Development diagnostics (`ftip.diagnostic`).
    #[must_use]
    pub fn diagnostics(&self) -> Vec<&CapturedEvent> {
        self.events_for("ftip.diagnostic")
    }

    /// Diagnostics whose `error_type` field equals `error_type`.
    #[must_use]
    pub fn count_error_type(&self, error_type: &str) -> usize {
        self.diagnostics()
            .iter()
            .filter(|e| e.field("error_type") == Some(error_type))
            .count()
    }

    #[must_use]
    pub fn spans_named(&self, name: &str) -> Vec<&CapturedSpan> {
        self.spans.iter().filter(|s| s.name == name).collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

struct CaptureLayer {
    capture: Arc<Mutex<Capture>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        for field in attrs.metadata().fields() {
            fields.entry(field.name().to_string()).or_default();
        }
        self.capture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .spans
            .push(CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields,
            });
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.capture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .push(CapturedEvent {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                fields: visitor.0.into_iter().collect(),
            });
    }
}

/// Run `f` with a capturing subscriber as the thread default.
pub fn capture_diagnostics<R>(f: impl FnOnce() -> R) -> (R, Capture) {
    let capture = Arc::new(Mutex::new(Capture::default()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        capture: Arc::clone(&capture),
    });
    let result = {
        let _guard = tracing::subscriber::set_default(subscriber);
        tracing::callsite::rebuild_interest_cache();
        f()
    };
    let captured = capture
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    (result, captured)
}
