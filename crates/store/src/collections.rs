use std::path::{Path, PathBuf};

use parley_core::{Concept, FraudCase, Lead, Order, WellnessEntry};

use crate::document::{JsonDocument, StoreError};
use crate::ids::IdAllocator;

/// All record collections for one data directory, each a typed handle to its
/// JSON document. The design allows at most one writer per document at a
/// time; the per-path lock in `document` enforces it across sessions.
#[derive(Clone, Debug)]
pub struct RecordStore {
    dir: PathBuf,
    ids: IdAllocator,
}

impl RecordStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let ids = IdAllocator::new(&dir);
        Self { dir, ids }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn orders(&self) -> JsonDocument<Order> {
        JsonDocument::new(self.dir.join("orders.json"))
    }

    pub fn leads(&self) -> JsonDocument<Lead> {
        JsonDocument::new(self.dir.join("leads.json"))
    }

    pub fn wellness(&self) -> JsonDocument<WellnessEntry> {
        JsonDocument::new(self.dir.join("wellness_log.json"))
    }

    pub fn fraud_cases(&self) -> JsonDocument<FraudCase> {
        JsonDocument::new(self.dir.join("fraud_db.json"))
    }

    pub fn concepts(&self) -> JsonDocument<Concept> {
        JsonDocument::new(self.dir.join("tutor_content.json"))
    }

    /// Improv scenario prompts, a flat string pool.
    pub fn scenarios(&self) -> JsonDocument<String> {
        JsonDocument::new(self.dir.join("scenarios.json"))
    }

    /// Case lookup by user name, case-insensitively.
    pub async fn find_case(&self, user_name: &str) -> Option<FraudCase> {
        self.fraud_cases()
            .load()
            .await
            .into_iter()
            .find(|case| case.matches_user(user_name))
    }

    /// Record the final status and outcome of a fraud case. Returns whether
    /// a case matched the user name.
    pub async fn update_case(
        &self,
        user_name: &str,
        status: &str,
        outcome: &str,
    ) -> Result<bool, StoreError> {
        self.fraud_cases()
            .update(
                |case| case.matches_user(user_name),
                |case| {
                    case.status = status.to_owned();
                    case.outcome = outcome.to_owned();
                },
            )
            .await
    }

    pub async fn find_concept(&self, name: &str) -> Option<Concept> {
        self.concepts()
            .load()
            .await
            .into_iter()
            .find(|concept| concept.matches_name(name))
    }

    /// Resolve a concept by name, synthesizing and persisting it when the
    /// content list does not know it yet.
    pub async fn resolve_concept(&self, name: &str) -> Result<Concept, StoreError> {
        if let Some(existing) = self.find_concept(name).await {
            return Ok(existing);
        }
        let concept = Concept::synthesize(name);
        self.concepts().append(concept.clone()).await?;
        Ok(concept)
    }
}
