//! Conversation context threading around task execution.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{ContextStoreError, Message, TaskEnvelope};
use crate::ports::{Clock, ConversationStore, IdGenerator};

/// Loads history before a task runs and appends its turn after it succeeds.
#[derive(Clone)]
pub struct ContextThreader {
    store: Option<Arc<dyn ConversationStore>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ContextThreader {
    pub fn new(
        store: Option<Arc<dyn ConversationStore>>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, ids, clock }
    }

    /// History for the envelope's conversation. Empty when the envelope has
    /// no conversation id or no store is configured.
    pub async fn load(&self, envelope: &TaskEnvelope) -> Result<Vec<Message>, ContextStoreError> {
        let (Some(store), Some(conversation_id)) = (&self.store, envelope.conversation_id()) else {
            return Ok(Vec::new());
        };
        let history = store.load(conversation_id).await?;
        debug!(
            conversation_id = %conversation_id,
            messages = history.len(),
            "conversation history loaded"
        );
        Ok(history)
    }

    /// Append the finished turn. A store failure is logged and swallowed:
    /// the task's own result is not affected.
    pub async fn record_turn(&self, envelope: &TaskEnvelope, response: &serde_json::Value) {
        let (Some(store), Some(conversation_id)) = (&self.store, envelope.conversation_id()) else {
            return;
        };
        let message = Message::new(
            self.ids.generate_message_id(),
            envelope.task_type(),
            envelope.payload().clone(),
            response.clone(),
            self.clock.now(),
        );
        if let Err(err) = store.append(conversation_id, message).await {
            warn!(
                conversation_id = %conversation_id,
                task_type = %envelope.task_type(),
                error = %err,
                "failed to append conversation turn"
            );
        }
    }
}
