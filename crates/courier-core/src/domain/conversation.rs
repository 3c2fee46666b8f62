//! Conversation model: ids and the messages threaded between tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MessageId;
use super::task_type::TaskType;

/// Opaque conversation identifier supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One completed turn of a conversation: what was asked and what came back.
///
/// Appended by the dispatcher after a task with a conversation id succeeds,
/// and handed (in append order) to the next task of the same conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub task_type: TaskType,
    pub request: serde_json::Value,
    pub response: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        message_id: MessageId,
        task_type: TaskType,
        request: serde_json::Value,
        response: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            message_id,
            task_type,
            request,
            response,
            created_at,
        }
    }
}
