//! In-memory conversation store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::{ContextStoreError, ConversationId, Message};
use crate::ports::ConversationStore;

/// Conversation history kept in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<ConversationId, Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, ContextStoreError> {
        let conversations = self.conversations.read().await;
        Ok(conversations.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<(), ContextStoreError> {
        self.conversations
            .write()
            .await
            .entry(conversation_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }
}
