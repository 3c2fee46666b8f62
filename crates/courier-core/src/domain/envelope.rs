//! TaskEnvelope - the immutable description of one unit of work.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::conversation::ConversationId;
use super::serde_time;
use super::task_type::TaskType;

pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;
pub const DEFAULT_PRIORITY: i32 = 5;

/// How the caller wants the task executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run inline and answer with the result.
    #[default]
    Synchronous,
    /// Queue for a background worker and answer with a handle.
    Asynchronous,
}

/// TaskType + payload + scheduling hints.
///
/// Design:
/// - Built once by the caller, then only read. The dispatcher never mutates an
///   envelope; it derives records and reports from it.
/// - `payload` is opaque to the orchestrator and forwarded as-is.
/// - `priority` is kept as a plain integer so out-of-range requests can be
///   represented and rejected at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    task_type: TaskType,

    #[serde(default)]
    payload: serde_json::Value,

    #[serde(default)]
    execution_mode: ExecutionMode,

    #[serde(default = "default_priority")]
    priority: i32,

    #[serde(
        default,
        rename = "timeout_ms",
        with = "serde_time::millis_opt",
        skip_serializing_if = "Option::is_none"
    )]
    timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    conversation_id: Option<ConversationId>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl TaskEnvelope {
    /// Synchronous, default priority, no timeout override, no conversation.
    pub fn new(task_type: TaskType, payload: serde_json::Value) -> Self {
        Self {
            task_type,
            payload,
            execution_mode: ExecutionMode::default(),
            priority: DEFAULT_PRIORITY,
            timeout: None,
            conversation_id: None,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    pub fn asynchronous(self) -> Self {
        self.with_mode(ExecutionMode::Asynchronous)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<ConversationId>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    pub fn has_valid_priority(&self) -> bool {
        (MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority)
    }
}
