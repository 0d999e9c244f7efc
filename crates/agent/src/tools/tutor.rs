//! Tutor tools: mode switching and teach-back evaluation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use parley_core::{PersonaMode, ToolError};
use parley_store::RecordStore;

use crate::tools::{ArgKind, ArgSpec, Tool, ToolSpec};
use crate::voice::LlmClient;

/// Resolves a requested tutor mode and the concept to carry into it. The
/// actual persona swap happens in the router so it stays atomic with the
/// voice change.
pub struct SwitchMode {
    store: RecordStore,
}

impl SwitchMode {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SwitchMode {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "switch_mode",
            description: "Switch the tutor between learn, quiz and teach-back",
            args: vec![
                ArgSpec::required("mode", ArgKind::String),
                ArgSpec::optional("concept_name", ArgKind::String),
            ],
        }
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let raw_mode = args["mode"].as_str().unwrap_or_default();
        let mode = PersonaMode::parse(raw_mode).ok_or_else(|| ToolError::InvalidArguments {
            tool: "switch_mode".to_string(),
            message: format!("unknown mode `{raw_mode}`"),
        })?;

        let concept = match args.get("concept_name").and_then(Value::as_str) {
            Some(name) => Some(
                self.store
                    .resolve_concept(name)
                    .await
                    .map_err(|err| ToolError::Persistence(err.to_string()))?,
            ),
            None => None,
        };

        info!(mode = mode.as_str(), "tutor.mode_resolved");
        Ok(json!({ "mode": mode.as_str(), "concept": concept }))
    }
}

/// Grades a learner's own explanation of a concept through the narrator.
pub struct EvaluateTeachBack {
    store: RecordStore,
    llm: Arc<dyn LlmClient>,
}

impl EvaluateTeachBack {
    pub fn new(store: RecordStore, llm: Arc<dyn LlmClient>) -> Self {
        Self { store, llm }
    }
}

#[async_trait]
impl Tool for EvaluateTeachBack {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "evaluate_teach_back",
            description: "Give feedback on the learner's explanation of a concept",
            args: vec![
                ArgSpec::required("concept_name", ArgKind::String),
                ArgSpec::required("explanation", ArgKind::String),
            ],
        }
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let name = args["concept_name"].as_str().unwrap_or_default();
        let explanation = args["explanation"].as_str().unwrap_or_default();

        let concept = self
            .store
            .resolve_concept(name)
            .await
            .map_err(|err| ToolError::Persistence(err.to_string()))?;

        let prompt = format!(
            "The learner is teaching back the concept \"{}\". Reference summary: {}\n\
             Their explanation: {}\n\
             Give one short piece of spoken feedback: what they got right and \
             the single most important thing they missed.",
            concept.title, concept.summary, explanation
        );
        let feedback = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|err| ToolError::Execution(err.to_string()))?;

        Ok(json!({ "concept": concept.title, "feedback": feedback }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use parley_core::ToolError;
    use parley_store::RecordStore;

    use super::{EvaluateTeachBack, SwitchMode};
    use crate::tools::Tool;
    use crate::voice::ScriptedLlm;

    #[tokio::test]
    async fn switch_mode_resolves_known_modes_and_synthesizes_concepts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::new(dir.path());

        let tool = SwitchMode::new(store.clone());
        let result = tool
            .execute(json!({ "mode": "quiz", "concept_name": "Ohm's Law" }))
            .await
            .expect("execute");

        assert_eq!(result["mode"], "quiz");
        assert_eq!(result["concept"]["title"], "Ohm's Law");
        assert_eq!(store.concepts().load().await.len(), 1);
    }

    #[tokio::test]
    async fn switch_mode_rejects_unknown_modes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tool = SwitchMode::new(RecordStore::new(dir.path()));

        let err = tool.execute(json!({ "mode": "karaoke" })).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn teach_back_feedback_comes_from_the_narrator() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::new(dir.path());
        let llm = Arc::new(ScriptedLlm::new(["Nicely put, but mention resistance.".to_owned()]));

        let tool = EvaluateTeachBack::new(store, llm);
        let result = tool
            .execute(json!({
                "concept_name": "Ohm's Law",
                "explanation": "voltage equals current times something"
            }))
            .await
            .expect("execute");

        assert_eq!(result["feedback"], "Nicely put, but mention resistance.");
        assert_eq!(result["concept"], "Ohm's Law");
    }
}
