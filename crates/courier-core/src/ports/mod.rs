//! Ports - seams to collaborators the orchestrator does not implement.
//!
//! - `Capability`: domain work for one task type (agent, search, ingestion...)
//! - `ConversationStore`: conversation history persistence
//! - `Clock` / `IdGenerator`: time and ids, swappable for tests

pub mod capability;
pub mod clock;
pub mod conversation_store;
pub mod id_generator;

pub use self::capability::{Capability, CapabilityFailure, ExecutionContext, FnCapability, from_fn};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::conversation_store::ConversationStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
