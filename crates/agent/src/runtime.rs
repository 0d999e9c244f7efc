use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use parley_core::{
    AuditSink, FlowKind, FraudCase, PersonaCatalog, PersonaDescriptor, PersonaMode,
    PhaseContext, PhaseFlow, ScenarioDeck, Session,
};
use parley_core::config::AppConfig;
use parley_core::phases::{FraudFlow, RoundFlow, TutorFlow};
use parley_store::RecordStore;

use crate::guardrails::CancelPolicy;
use crate::handoff::AgentHandoff;
use crate::router::{EventSender, RouterDeps, TurnEventRouter};
use crate::tools::fraud::{SubmitReport, VerifyIdentity};
use crate::tools::records::{CreateRecord, GetLastRecord, ListRecords};
use crate::tools::tutor::{EvaluateTeachBack, SwitchMode};
use crate::tools::ToolRegistry;
use crate::voice::{LlmClient, VoicePipeline};

/// Scenario prompts used when the store has none seeded.
const DEFAULT_SCENARIOS: &[&str] = &[
    "you are a weather forecaster reporting on raining meatballs",
    "sell me this invisible pen",
    "you are a tour guide in a city that does not exist",
    "give an acceptance speech for an award you did not win",
];

/// Per-session wiring: persona, tool set, flow, and router for one call.
pub struct AgentRuntime {
    router: TurnEventRouter,
    sender: EventSender,
    pipeline: Arc<dyn VoicePipeline>,
    opening: String,
}

impl AgentRuntime {
    pub async fn new(
        kind: FlowKind,
        config: &AppConfig,
        store: RecordStore,
        pipeline: Arc<dyn VoicePipeline>,
        llm: Arc<dyn LlmClient>,
        sink: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        let mode = PersonaMode::initial_for(kind);
        let persona = PersonaCatalog::descriptor(mode);

        let flow: Box<dyn PhaseFlow + Send + Sync> = match kind {
            FlowKind::Round => Box::new(RoundFlow),
            FlowKind::Tutor => Box::new(TutorFlow),
            FlowKind::Fraud => Box::new(FraudFlow),
        };

        let mut base_context = PhaseContext {
            max_rounds: config.conversation.max_rounds,
            max_verification_attempts: config.conversation.verification_max_attempts,
            ..PhaseContext::default()
        };

        let opening = match kind {
            FlowKind::Round => {
                "Welcome to the improv hour! I'll set up a scene and you act it out. \
                 Tell me your name and we'll get started."
                    .to_owned()
            }
            FlowKind::Tutor => {
                "Hey, good to see you! I'm your recall coach. Say \"quiz\" or \
                 \"teach back\" any time to switch modes. What should we study?"
                    .to_owned()
            }
            FlowKind::Fraud => {
                let case = pending_case(&store).await?;
                base_context.expected_answer = Some(case.security_answer.clone());
                base_context.transaction_summary = Some(case.transaction_summary());
                base_context.case_user = Some(case.user_name.clone());
                format!(
                    "Hello, this is the fraud prevention team at your bank. Am I \
                     speaking with {}? Before we continue I need to verify your \
                     identity. {}",
                    case.user_name, case.security_question
                )
            }
        };

        let deck = match kind {
            FlowKind::Round => {
                let mut pool = store.scenarios().load().await;
                if pool.is_empty() {
                    pool = DEFAULT_SCENARIOS.iter().map(|s| (*s).to_owned()).collect();
                }
                ScenarioDeck::new(pool)
            }
            _ => ScenarioDeck::new(Vec::new()),
        };

        let session = Session::new(
            Uuid::new_v4().to_string(),
            flow.initial_phase(),
            mode,
            Utc::now(),
        );
        info!(session = %session.id, ?kind, mode = mode.as_str(), "session.started");

        let registry = registry_for(&persona, &store, &llm, session.clock);
        let handoff = Arc::new(AgentHandoff::new(mode, store, pipeline.clone()));
        pipeline.set_voice_identity(&persona.voice_id).await?;

        let deps = RouterDeps {
            registry,
            handoff,
            pipeline: pipeline.clone(),
            llm,
            sink,
            cancel: CancelPolicy::new(config.conversation.cancel_keywords.clone()),
            deck,
            base_context,
        };
        let (router, sender) = TurnEventRouter::new(session, flow, deps);

        Ok(Self { router, sender, pipeline, opening })
    }

    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Speak the opening line, then consume events until the session closes.
    pub async fn run(self) -> Result<Session> {
        self.pipeline.speak(&self.opening).await?;
        Ok(self.router.run().await)
    }
}

async fn pending_case(store: &RecordStore) -> Result<FraudCase> {
    let cases = store.fraud_cases().load().await;
    let case = cases
        .iter()
        .find(|case| case.status == "pending")
        .or_else(|| cases.first())
        .cloned();
    match case {
        Some(case) => Ok(case),
        None => bail!("no fraud case on file; run `parley seed` first"),
    }
}

/// The tool set is what the persona declares, nothing more.
fn registry_for(
    persona: &PersonaDescriptor,
    store: &RecordStore,
    llm: &Arc<dyn LlmClient>,
    clock: DateTime<Utc>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::default();
    for tool in &persona.tools {
        match tool.as_str() {
            "list_records" => registry.register(ListRecords::new(store.clone())),
            "get_last_record" => registry.register(GetLastRecord::new(store.clone())),
            "create_record" => registry.register(CreateRecord::new(store.clone(), clock)),
            "verify_identity" => registry.register(VerifyIdentity::new(store.clone())),
            "submit_report" => registry.register(SubmitReport::new(store.clone())),
            "switch_mode" => registry.register(SwitchMode::new(store.clone())),
            "evaluate_teach_back" => {
                registry.register(EvaluateTeachBack::new(store.clone(), llm.clone()))
            }
            other => {
                tracing::warn!(tool = other, "persona.unknown_tool_skipped");
            }
        }
    }
    registry
}
