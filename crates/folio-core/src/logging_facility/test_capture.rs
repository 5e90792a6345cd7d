//! Log capture for tests
//!
//! `init_test_capture()` installs a layer that keeps every event in memory.
//! The capture is process-global and shared by tests running in parallel,
//! so assertions filter on values they own: an op name, a document id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use folio_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPONENT, FIELD_DOCUMENT_ID, FIELD_ERR_CODE,
    FIELD_EVENT, FIELD_OP, FIELD_REQUEST_ID, FIELD_TRACE_ID,
};
use folio_core_types::DocumentId;
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event; every field is kept in its rendered form
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn from_fields(level: Level, fields: HashMap<String, String>) -> Self {
        Self {
            level,
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.field(FIELD_DOCUMENT_ID)?.parse().ok()
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    /// Request id of the service call; `None` when absent or empty
    pub fn request_id(&self) -> Option<&str> {
        self.field(FIELD_REQUEST_ID).filter(|id| !id.is_empty())
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.field(FIELD_TRACE_ID).filter(|id| !id.is_empty())
    }

    fn is_boundary(&self) -> bool {
        matches!(
            self.event.as_deref(),
            Some(EVENT_START) | Some(EVENT_END) | Some(EVENT_END_ERROR)
        )
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

/// Start and exit counts of one operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub start: usize,
    pub end: usize,
    pub end_error: usize,
}

impl Boundaries {
    pub fn count(events: &[CapturedEvent]) -> Self {
        let mut counts = Self::default();
        for e in events {
            match e.event.as_deref() {
                Some(EVENT_START) => counts.start += 1,
                Some(EVENT_END) => counts.end += 1,
                Some(EVENT_END_ERROR) => counts.end_error += 1,
                _ => {}
            }
        }
        counts
    }
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    events: Buffer,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let captured = CapturedEvent::from_fields(*event.metadata().level(), visitor.0);
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Read handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Buffer,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// Boundary events of `op` logged for `document_id`
    pub fn boundaries(&self, op: &str, document_id: DocumentId) -> Boundaries {
        let events: Vec<_> = self
            .events_for_op(op)
            .into_iter()
            .filter(|e| e.document_id() == Some(document_id))
            .collect();
        Boundaries::count(&events)
    }

    /// Start and exit events of `op` logged under `trace_id`, in order
    pub fn traced(&self, op: &str, trace_id: &str) -> Vec<CapturedEvent> {
        self.events_for_op(op)
            .into_iter()
            .filter(|e| e.trace_id() == Some(trace_id) && e.is_boundary())
            .collect()
    }

    /// # Panics
    ///
    /// When no event of `op` has the event name `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {}/{} event among {} captured",
            op,
            event,
            events.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture as the global subscriber on first use
///
/// ```
/// use folio_core::logging_facility::test_capture::init_test_capture;
/// use folio_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_example");
/// capture.assert_event_exists("doc_capture_example", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let events = Buffer::default();
            tracing_subscriber::registry()
                .with(CaptureLayer {
                    events: events.clone(),
                })
                .init();
            TestCapture { events }
        })
        .clone()
}
