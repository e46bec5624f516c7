#![forbid(unsafe_code)]

//! Tracing integration tests for viewport layout.
//!
//! Spans enabled:
//!   cargo test -p vlist-layout --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p vlist-layout --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use vlist_layout::viewport::VirtualViewport;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    message: String,
}

/// A tracing Layer that records span metadata and event messages.
#[derive(Default)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

#[derive(Clone)]
struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans_named(&self, name: &str) -> Vec<CapturedSpan> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }

    fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }
}

/// Visitor that extracts fields as strings.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .into_iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value)
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent { message });
    }
}

fn with_capture<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let layer = Capture::default();
    let handle = CaptureHandle {
        spans: layer.spans.clone(),
        events: layer.events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

fn exercise_viewport() {
    let mut viewport = VirtualViewport::new(100, 20.0).with_viewport_size(120.0);
    viewport.measure(3, 48.0);
    viewport.scroll_to(200.0);
    let _ = viewport.visible_range();
    viewport.set_item_count(50);
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn visible_range_opens_layout_span() {
    let handle = with_capture(exercise_viewport);

    let spans = handle.spans_named("viewport_layout");
    assert_eq!(spans.len(), 1, "expected one viewport_layout span");
    let fields = &spans[0].fields;
    assert_eq!(fields.get("items").map(String::as_str), Some("100"));
    assert_eq!(fields.get("scroll").map(String::as_str), Some("200"));
    assert_eq!(fields.get("viewport").map(String::as_str), Some("120"));
}

#[test]
#[cfg(feature = "tracing")]
fn measurement_and_rebuild_emit_events() {
    let handle = with_capture(exercise_viewport);
    let messages = handle.messages();

    for expected in ["item measured", "visible range", "offset tree rebuilt"] {
        assert!(
            messages.iter().any(|m| m == expected),
            "missing {expected:?} event, got {messages:?}"
        );
    }
}

#[test]
#[cfg(feature = "tracing")]
fn ignored_measurement_is_logged() {
    let handle = with_capture(|| {
        let mut viewport = VirtualViewport::new(2, 20.0);
        viewport.measure(7, 30.0);
    });
    assert!(
        handle.messages().iter().any(|m| m == "measurement ignored"),
        "expected a measurement ignored event"
    );
}

/// When compiled WITHOUT `--features tracing` the logging macros expand to
/// nothing, so no spans or events reach the subscriber.
#[test]
fn zero_overhead_when_disabled() {
    let handle = with_capture(exercise_viewport);
    let layout_spans = handle.spans_named("viewport_layout");

    #[cfg(feature = "tracing")]
    assert!(
        !layout_spans.is_empty(),
        "With tracing feature, viewport_layout spans should be present"
    );

    #[cfg(not(feature = "tracing"))]
    {
        assert!(
            layout_spans.is_empty(),
            "Without tracing feature, no viewport_layout spans should exist (got {})",
            layout_spans.len()
        );
        assert!(handle.messages().is_empty());
    }
}
