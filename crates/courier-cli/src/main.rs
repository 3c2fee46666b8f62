use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant, sleep};
use tracing::info;

use courier_core::domain::TaskId;
use courier_core::impls::InMemoryConversationStore;
use courier_core::ports::{CapabilityFailure, ExecutionContext};
use courier_core::typed::{Handler, Payload};
use courier_core::{
    Dispatcher, OrchestratorBuilder, OrchestratorConfig, RegistryBuilder, StatusView,
    TaskEnvelope, TaskType, load_config,
};

/// Run the demo scenarios against an in-process orchestrator.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
struct Cli {
    /// YAML config file. Defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override `worker_count` from the config.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Conversation id used for the agent chat turns.
    #[arg(long, default_value = "demo")]
    conversation: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatRequest {
    message: String,
}

impl Payload for ChatRequest {
    const TASK_TYPE: TaskType = TaskType::AgentChat;
}

#[derive(Debug, Serialize)]
struct ChatReply {
    reply: String,
    turn: usize,
}

/// Stand-in agent: echoes the message and counts the turns it has seen.
struct EchoAgent;

#[async_trait]
impl Handler<ChatRequest> for EchoAgent {
    type Output = ChatReply;

    async fn handle(
        &self,
        req: ChatRequest,
        ctx: ExecutionContext,
    ) -> Result<ChatReply, CapabilityFailure> {
        sleep(Duration::from_millis(100)).await;
        Ok(ChatReply {
            reply: format!("echo: {}", req.message),
            turn: ctx.history().len() + 1,
        })
    }
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn wait_for(dispatcher: &Dispatcher, task_id: &TaskId) -> Result<StatusView> {
    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        let view = dispatcher
            .status(task_id)
            .with_context(|| format!("no status for {task_id}"))?;
        if view.ready {
            return Ok(view);
        }
        if Instant::now() > deadline {
            bail!("{task_id} still {} after 30s", view.status);
        }
        sleep(Duration::from_millis(50)).await;
    }
}

fn print_json(label: &str, value: &impl Serialize) -> Result<()> {
    println!("{label}: {}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => OrchestratorConfig::default(),
    };
    if let Some(workers) = cli.workers {
        config.worker_count = workers;
    }
    init_tracing(&config.log_level);

    let registry = RegistryBuilder::new()
        .register_typed::<ChatRequest, _>(EchoAgent)?
        .with_health_check()
        .expect_tasks(&[TaskType::AgentChat, TaskType::HealthCheck]);
    let dispatcher = OrchestratorBuilder::new(registry)
        .config(config)
        .conversation_store(Arc::new(InMemoryConversationStore::new()))
        .build()?;
    info!(capabilities = ?dispatcher.registry().registered_types(), "courier ready");

    // (A) synchronous health probe
    let health = dispatcher
        .submit(TaskEnvelope::new(TaskType::HealthCheck, serde_json::json!({})).with_priority(1))
        .await?;
    print_json("health_check", &health)?;

    // (B) asynchronous chat turns sharing one conversation
    for message in ["hello", "how are you?"] {
        let payload = ChatRequest {
            message: message.to_string(),
        }
        .to_payload()?;
        let accepted = dispatcher
            .submit(
                TaskEnvelope::new(TaskType::AgentChat, payload)
                    .asynchronous()
                    .with_priority(5)
                    .with_conversation(cli.conversation.as_str()),
            )
            .await?;
        print_json("agent_chat submitted", &accepted)?;

        let task_id = accepted
            .task_id()
            .context("asynchronous submit returned no handle")?;
        let view = wait_for(&dispatcher, &task_id).await?;
        print_json("agent_chat status", &view)?;

        // the turn is appended right after completion; give it a moment
        sleep(Duration::from_millis(20)).await;
    }

    print_json("counts", &dispatcher.counts().await)?;
    dispatcher.shutdown().await;
    Ok(())
}
