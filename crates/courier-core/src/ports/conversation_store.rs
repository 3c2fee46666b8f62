//! ConversationStore port - persistence of conversation history.
//!
//! The orchestrator owns no storage: it loads history before a task with a
//! conversation id runs and appends the finished turn afterwards. The shipped
//! in-memory implementation lives in `impls::inmem_conversation`.

use async_trait::async_trait;

use crate::domain::{ContextStoreError, ConversationId, Message};

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Messages of the conversation in append order. Unknown conversations
    /// have an empty history.
    async fn load(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, ContextStoreError>;

    async fn append(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<(), ContextStoreError>;
}
