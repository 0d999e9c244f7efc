//! Trait seams for speech output and LLM narration.
//!
//! The session logic never talks to a concrete speech stack or model
//! provider; it drives these traits and the binary picks the impls.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::router::EventSender;

/// Downstream speech output. `speak` resolves when playback finishes, which
/// is what lets the router treat an utterance as one awaited step.
#[async_trait]
pub trait VoicePipeline: Send + Sync {
    async fn speak(&self, utterance: &str) -> Result<()>;
    async fn set_voice_identity(&self, voice_id: &str) -> Result<()>;
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Prints utterances to stdout. When wired with an [`EventSender`] it reports
/// each finished utterance back to the session, standing in for the playback
/// callback of a real speech stack.
pub struct ConsolePipeline {
    events: Mutex<Option<EventSender>>,
}

impl ConsolePipeline {
    pub fn new() -> Self {
        Self { events: Mutex::new(None) }
    }

    /// Attached after router construction; the pipeline exists first.
    pub async fn attach_events(&self, sender: EventSender) {
        *self.events.lock().await = Some(sender);
    }
}

impl Default for ConsolePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoicePipeline for ConsolePipeline {
    async fn speak(&self, utterance: &str) -> Result<()> {
        println!("agent> {utterance}");
        if let Some(sender) = self.events.lock().await.as_ref() {
            sender.utterance_finished().await?;
        }
        Ok(())
    }

    async fn set_voice_identity(&self, voice_id: &str) -> Result<()> {
        println!("[voice: {voice_id}]");
        Ok(())
    }
}

/// Deterministic stand-in for a model provider: answers from a fixed queue,
/// falling back to a canned line when the queue runs dry.
#[derive(Clone, Default)]
pub struct ScriptedLlm {
    replies: Arc<Mutex<VecDeque<String>>>,
}

impl ScriptedLlm {
    pub fn new(replies: impl IntoIterator<Item = String>) -> Self {
        Self { replies: Arc::new(Mutex::new(replies.into_iter().collect())) }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        let mut replies = self.replies.lock().await;
        Ok(replies
            .pop_front()
            .unwrap_or_else(|| "That's a great line. Tell me more.".to_owned()))
    }
}

#[cfg(test)]
pub(crate) mod doubles {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::VoicePipeline;

    /// Captures utterances and voice switches for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingPipeline {
        pub utterances: Arc<Mutex<Vec<String>>>,
        pub voices: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingPipeline {
        pub async fn spoken(&self) -> Vec<String> {
            self.utterances.lock().await.clone()
        }
    }

    #[async_trait]
    impl VoicePipeline for RecordingPipeline {
        async fn speak(&self, utterance: &str) -> Result<()> {
            self.utterances.lock().await.push(utterance.to_owned());
            Ok(())
        }

        async fn set_voice_identity(&self, voice_id: &str) -> Result<()> {
            self.voices.lock().await.push(voice_id.to_owned());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LlmClient, ScriptedLlm};

    #[tokio::test]
    async fn scripted_llm_replays_replies_then_falls_back() {
        let llm = ScriptedLlm::new(["first".to_owned(), "second".to_owned()]);
        assert_eq!(llm.complete("a").await.unwrap(), "first");
        assert_eq!(llm.complete("b").await.unwrap(), "second");
        assert!(!llm.complete("c").await.unwrap().is_empty());
    }
}
