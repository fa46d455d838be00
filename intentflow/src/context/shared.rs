//! The mutable per-request context threaded through a workflow run.

use super::{EntryBag, StageRecord};
use crate::events::{EventSink, NoOpEventSink};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// The shared state for one request's workflow run.
///
/// Created by the orchestrator, owned by the dispatcher for the run's
/// lifetime, and handed to the summarizer afterwards. The category is
/// fixed at construction; entries and history grow as stages execute.
pub struct SharedContext {
    /// The request identifier.
    request_id: Uuid,
    /// The selected workflow category.
    category: String,
    /// Key/value state visible to all stages.
    pub entries: EntryBag,
    /// Ordered stage-execution records.
    history: RwLock<Vec<StageRecord>>,
    /// Event sink for stage lifecycle events.
    event_sink: Arc<dyn EventSink>,
    /// Cancellation flag, first reason wins.
    cancelled: AtomicBool,
    cancel_reason: RwLock<Option<String>>,
}

impl SharedContext {
    /// Creates a context for a category, seeded with initial inputs.
    #[must_use]
    pub fn new(category: impl Into<String>, initial: HashMap<String, serde_json::Value>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            category: category.into(),
            entries: EntryBag::from_initial(initial),
            history: RwLock::new(Vec::new()),
            event_sink: Arc::new(NoOpEventSink),
            cancelled: AtomicBool::new(false),
            cancel_reason: RwLock::new(None),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the workflow category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Appends a stage record to the history.
    pub fn record(&self, record: StageRecord) {
        self.history.write().push(record);
    }

    /// Returns a copy of the execution history.
    #[must_use]
    pub fn history(&self) -> Vec<StageRecord> {
        self.history.read().clone()
    }

    /// Requests cancellation. Idempotent; the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.cancel_reason.write() = Some(reason.into());
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<String> {
        self.cancel_reason.read().clone()
    }

    /// Emits a stage lifecycle event enriched with request metadata.
    pub fn emit_event(&self, event_type: &str, data: serde_json::Value) {
        let mut enriched = data;
        if let serde_json::Value::Object(ref mut map) = enriched {
            map.insert(
                "request_id".to_string(),
                serde_json::json!(self.request_id.to_string()),
            );
            map.insert("category".to_string(), serde_json::json!(&self.category));
        }
        self.event_sink.try_emit(event_type, Some(enriched));
    }
}

impl std::fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedContext")
            .field("request_id", &self.request_id)
            .field("category", &self.category)
            .field("entries", &self.entries.len())
            .field("history", &self.history.read().len())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
