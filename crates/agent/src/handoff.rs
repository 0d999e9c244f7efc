use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::info;

use parley_core::{PersonaCatalog, PersonaDescriptor, PersonaMode};
use parley_store::RecordStore;

use crate::voice::VoicePipeline;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandoffOutcome {
    Switched(PersonaDescriptor),
    /// The requested mode does not exist; the active persona is untouched
    /// and `correction` is what the agent should say instead.
    Rejected { correction: String },
}

/// Owns the active persona for one session. A switch resolves the target
/// descriptor and loads whatever content it needs before anything visible
/// changes, so no half-switched persona is ever observable.
pub struct AgentHandoff {
    store: RecordStore,
    pipeline: Arc<dyn VoicePipeline>,
    active: Mutex<PersonaDescriptor>,
}

impl AgentHandoff {
    pub fn new(
        initial: PersonaMode,
        store: RecordStore,
        pipeline: Arc<dyn VoicePipeline>,
    ) -> Self {
        Self {
            store,
            pipeline,
            active: Mutex::new(PersonaCatalog::descriptor(initial)),
        }
    }

    pub async fn active(&self) -> PersonaDescriptor {
        self.active.lock().await.clone()
    }

    pub async fn switch(&self, mode_name: &str) -> Result<HandoffOutcome> {
        let Some(mode) = PersonaMode::parse(mode_name) else {
            return Ok(HandoffOutcome::Rejected {
                correction: format!(
                    "I don't have a {mode_name} mode. I can do learn, quiz, or teach-back."
                ),
            });
        };

        // Content first: a descriptor is only installed once everything it
        // depends on is in hand.
        let descriptor = PersonaCatalog::descriptor(mode);
        if matches!(mode, PersonaMode::Learn | PersonaMode::Quiz | PersonaMode::TeachBack) {
            let _concepts = self.store.concepts().load().await;
        }

        self.pipeline.set_voice_identity(&descriptor.voice_id).await?;
        let mut active = self.active.lock().await;
        let previous = active.mode;
        *active = descriptor.clone();
        info!(from = previous.as_str(), to = mode.as_str(), "persona.switched");

        Ok(HandoffOutcome::Switched(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parley_core::PersonaMode;
    use parley_store::RecordStore;

    use super::{AgentHandoff, HandoffOutcome};
    use crate::voice::doubles::RecordingPipeline;

    #[tokio::test]
    async fn switching_to_quiz_swaps_descriptor_and_voice_together() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = Arc::new(RecordingPipeline::default());
        let handoff =
            AgentHandoff::new(PersonaMode::Learn, RecordStore::new(dir.path()), pipeline.clone());

        let outcome = handoff.switch("quiz").await.expect("switch");
        let descriptor = match outcome {
            HandoffOutcome::Switched(descriptor) => descriptor,
            other => panic!("unexpected outcome: {other:?}"),
        };

        assert_eq!(descriptor.mode, PersonaMode::Quiz);
        assert_eq!(handoff.active().await.mode, PersonaMode::Quiz);
        assert_eq!(pipeline.voices.lock().await.as_slice(), ["en-US-alicia"]);
    }

    #[tokio::test]
    async fn unknown_mode_is_rejected_and_persona_is_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = Arc::new(RecordingPipeline::default());
        let handoff =
            AgentHandoff::new(PersonaMode::Learn, RecordStore::new(dir.path()), pipeline.clone());

        let outcome = handoff.switch("karaoke").await.expect("switch");
        match outcome {
            HandoffOutcome::Rejected { correction } => {
                assert!(correction.contains("karaoke"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert_eq!(handoff.active().await.mode, PersonaMode::Learn);
        assert!(pipeline.voices.lock().await.is_empty());
    }
}
