//! Capability port - the executor contract every task type plugs into.
//!
//! # Timeout contract
//! The orchestrator stops *waiting* when a task's timeout elapses; it does not
//! stop the capability. An abandoned call keeps running on the runtime until it
//! returns on its own. Capabilities that do long work should check
//! `ExecutionContext::deadline` and bail out once it has passed.

use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::domain::{ConversationId, Message, TaskType};

/// Everything a capability gets besides its payload.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    task_type: TaskType,
    conversation_id: Option<ConversationId>,
    history: Vec<Message>,
    deadline: Instant,
}

impl ExecutionContext {
    pub fn new(
        task_type: TaskType,
        conversation_id: Option<ConversationId>,
        history: Vec<Message>,
        deadline: Instant,
    ) -> Self {
        Self {
            task_type,
            conversation_id,
            history,
            deadline,
        }
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Prior turns of the conversation, oldest first. Empty without a
    /// conversation id.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Point after which nobody is waiting for the result any more.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Error returned by a capability. Wrapped as `CapabilityError` by the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CapabilityFailure {
    message: String,
}

impl CapabilityFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for CapabilityFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("json: {err}"))
    }
}

/// Executor for one task type.
///
/// Must be safe to call concurrently for distinct tasks. Arguments are owned
/// so the orchestrator can run the call on its own task and walk away from it
/// on timeout.
#[async_trait]
pub trait Capability: Send + Sync {
    async fn execute(
        &self,
        payload: serde_json::Value,
        context: ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityFailure>;
}

/// Capability backed by an async closure.
pub struct FnCapability<F> {
    f: F,
}

/// Wrap an async closure as a `Capability`.
///
/// ```ignore
/// let echo = from_fn(|payload, _ctx| async move { Ok(payload) });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnCapability<F>
where
    F: Fn(serde_json::Value, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, CapabilityFailure>> + Send + 'static,
{
    FnCapability { f }
}

#[async_trait]
impl<F, Fut> Capability for FnCapability<F>
where
    F: Fn(serde_json::Value, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, CapabilityFailure>> + Send + 'static,
{
    async fn execute(
        &self,
        payload: serde_json::Value,
        context: ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityFailure> {
        (self.f)(payload, context).await
    }
}
