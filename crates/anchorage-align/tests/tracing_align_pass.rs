#![forbid(unsafe_code)]

//! Tracing output of alignment passes.
//!
//! Verify the `align.pass` span, its fields, and that flip and abort events
//! are emitted inside it under the `anchorage.align` target.
//!
//! Run:
//!   cargo test -p anchorage-align --test tracing_align_pass

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anchorage_align::{AlignRequest, Aligner, ElementMetrics, LayoutSnapshot, PlacementRegistry, ViewportMetrics};
use anchorage_core::Rect;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    target: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    message: String,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn events_named(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.message == message)
            .collect()
    }
}

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

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
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
            target: attrs.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());

        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            message,
            fields: visitor.0.into_iter().collect(),
            parent_span_name,
        });
    }
}

fn with_captured<F: FnOnce()>(f: F) -> CaptureHandle {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

fn corner_host() -> (LayoutSnapshot, anchorage_align::NodeId, anchorage_align::NodeId) {
    let mut host = LayoutSnapshot::new(ViewportMetrics::new(200.0, 200.0));
    let body = host.add(None, ElementMetrics::new(Rect::new(0.0, 0.0, 200.0, 200.0)).root());
    let target = host.add(Some(body), ElementMetrics::new(Rect::new(160.0, 0.0, 30.0, 30.0)));
    let popup = host.add(Some(body), ElementMetrics::new(Rect::new(0.0, 0.0, 80.0, 30.0)));
    (host, target, popup)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn pass_span_carries_placement_name() {
    let (host, target, popup) = corner_host();
    let registry = PlacementRegistry::builtin();
    let handle = with_captured(|| {
        let mut aligner = Aligner::new();
        aligner.align(&host, true, &AlignRequest::new(target, popup, "right", &registry));
    });

    let spans = handle.spans();
    let pass = spans
        .iter()
        .find(|span| span.name == "align.pass")
        .expect("align.pass span");
    assert_eq!(pass.target, "anchorage.align");
    assert_eq!(pass.fields.get("placement").map(String::as_str), Some("right"));
    assert_eq!(pass.fields.get("point_mode").map(String::as_str), Some("false"));
}

#[test]
fn flip_events_nest_under_pass_span() {
    let (host, target, popup) = corner_host();
    let registry = PlacementRegistry::builtin();
    let handle = with_captured(|| {
        let mut aligner = Aligner::new();
        aligner.align(&host, true, &AlignRequest::new(target, popup, "right", &registry));
    });

    let flips = handle.events_named("flip evaluated");
    assert_eq!(flips.len(), 1);
    let flip = &flips[0];
    assert_eq!(flip.target, "anchorage.align");
    assert_eq!(flip.parent_span_name.as_deref(), Some("align.pass"));
    assert_eq!(flip.fields.get("taken").map(String::as_str), Some("true"));
    assert_eq!(flip.fields.get("overflowing").map(String::as_str), Some("true"));
}

#[test]
fn aborted_pass_is_logged() {
    let (mut host, target, popup) = corner_host();
    host.set_metrics(target, ElementMetrics::new(Rect::new(160.0, 0.0, 30.0, 30.0)).hidden());
    let registry = PlacementRegistry::builtin();
    let handle = with_captured(|| {
        let mut aligner = Aligner::new();
        aligner.align(&host, true, &AlignRequest::new(target, popup, "right", &registry));
    });

    let aborted = handle.events_named("align pass aborted: target not displayed");
    assert_eq!(aborted.len(), 1);
    assert_eq!(aborted[0].parent_span_name.as_deref(), Some("align.pass"));
    assert!(handle.events_named("flip evaluated").is_empty());
}

#[test]
fn session_lifecycle_logs_subscriptions() {
    let (host, target, popup) = corner_host();
    let registry = PlacementRegistry::builtin();
    let handle = with_captured(|| {
        let request = AlignRequest::new(target, popup, "right", &registry);
        let mut aligner = Aligner::new();
        aligner.align(&host, true, &request);
        aligner.align(&host, false, &request);
    });

    let replaced = handle.events_named("align subscriptions replaced");
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].fields.get("count").map(String::as_str), Some("1"));
    assert_eq!(handle.events_named("popup closed, alignment reset").len(), 1);
    assert_eq!(handle.events_named("align subscriptions cleared").len(), 1);
}
