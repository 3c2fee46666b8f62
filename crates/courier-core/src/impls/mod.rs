//! Shipped implementations of the ports.

pub mod health;
pub mod inmem_conversation;

pub use health::HealthCheckCapability;
pub use inmem_conversation::InMemoryConversationStore;
