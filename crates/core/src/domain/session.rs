use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persona::PersonaMode;
use crate::phases::states::Phase;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One live conversation. Owned exclusively by its turn event router; there
/// is no shared mutable session state anywhere else.
///
/// `clock` is the conversation's notion of "now", threaded explicitly so
/// time-dependent behavior stays testable and reentrant across concurrent
/// sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub phase: Phase,
    pub round: u32,
    pub fields: BTreeMap<String, String>,
    pub verification_attempts: u32,
    pub persona_mode: PersonaMode,
    pub created_at: DateTime<Utc>,
    pub clock: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        phase: Phase,
        persona_mode: PersonaMode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId(id.into()),
            phase,
            round: 0,
            fields: BTreeMap::new(),
            verification_attempts: 0,
            persona_mode,
            created_at: now,
            clock: now,
        }
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}
