use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use parley_agent::runtime::AgentRuntime;
use parley_agent::voice::{ConsolePipeline, ScriptedLlm};
use parley_core::audit::TracingAuditSink;
use parley_core::config::{AppConfig, LoadOptions};
use parley_core::{CancelReason, FlowKind, Session};
use parley_store::RecordStore;

use crate::commands::CommandResult;

pub fn run(kind: FlowKind, config_path: Option<PathBuf>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "run",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "run",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(run_session(kind, config)) {
        Ok(session) => CommandResult::success(
            "run",
            format!("session {} ended in phase {:?}", session.id, session.phase),
        ),
        Err(error) => CommandResult::failure("run", "session", error.to_string(), 4),
    }
}

/// Console session: each stdin line is a completed user turn, and the
/// pipeline reports every finished utterance back to the router, so this
/// exercises the same event path a live call would.
async fn run_session(kind: FlowKind, config: AppConfig) -> anyhow::Result<Session> {
    let store = RecordStore::new(&config.data.dir);
    let pipeline = Arc::new(ConsolePipeline::new());
    let llm = Arc::new(ScriptedLlm::default());
    let sink = Arc::new(TracingAuditSink);

    let agent = AgentRuntime::new(kind, &config, store, pipeline.clone(), llm, sink).await?;
    let sender = agent.sender();
    pipeline.attach_events(sender.clone()).await;

    let mut driver = tokio::spawn(agent.run());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            session = &mut driver => {
                return session?;
            }
            line = lines.next_line() => {
                match line? {
                    Some(text) if !text.trim().is_empty() => {
                        sender.user_turn(text.trim()).await?;
                    }
                    Some(_) => {}
                    None => {
                        // stdin closed; wind the session down politely.
                        sender.cancel(CancelReason::External).await?;
                        return driver.await?;
                    }
                }
            }
        }
    }
}

fn init_logging(config: &AppConfig) {
    use parley_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
