use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::session::SessionId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditCategory {
    Turn,
    Phase,
    Tool,
    Persona,
    Persistence,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Success,
    Rejected,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub session_id: SessionId,
    pub event_type: String,
    pub category: AuditCategory,
    pub outcome: AuditOutcome,
    pub metadata: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        session_id: SessionId,
        event_type: impl Into<String>,
        category: AuditCategory,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            session_id,
            event_type: event_type.into(),
            category,
            outcome,
            metadata: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Forwards audit events to the tracing subscriber as structured records.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        tracing::info!(
            event_name = %event.event_type,
            session_id = %event.session_id,
            category = ?event.category,
            outcome = ?event.outcome,
            metadata = ?event.metadata,
            "audit event"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::session::SessionId;

    use super::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};

    #[test]
    fn in_memory_sink_collects_events_in_order() {
        let sink = InMemoryAuditSink::default();
        for event_type in ["turn.received", "tool.invoked"] {
            sink.emit(AuditEvent::new(
                SessionId("s-1".to_owned()),
                event_type,
                AuditCategory::System,
                AuditOutcome::Success,
            ));
        }

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "turn.received");
        assert_ne!(events[0].event_id, events[1].event_id);
    }

    #[test]
    fn sink_keeps_accepting_events_after_a_poisoned_lock() {
        let sink = InMemoryAuditSink::default();
        let poisoner = sink.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.events.lock().unwrap();
            panic!("poison the sink lock");
        })
        .join();

        sink.emit(AuditEvent::new(
            SessionId("s-3".to_owned()),
            "tool.invoked",
            AuditCategory::Tool,
            AuditOutcome::Success,
        ));
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn metadata_builder_accumulates() {
        let event = AuditEvent::new(
            SessionId("s-2".to_owned()),
            "phase.transition_applied",
            AuditCategory::Phase,
            AuditOutcome::Success,
        )
        .with_metadata("from", "Intro")
        .with_metadata("to", "AwaitingInput");

        assert_eq!(event.metadata.len(), 2);
        assert_eq!(event.metadata.get("to").map(String::as_str), Some("AwaitingInput"));
    }
}
