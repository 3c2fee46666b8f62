//! Domain model (ids, task types, envelopes, outcomes, records, errors).
//!
//! Pure data: nothing here spawns, locks or talks to a collaborator.

pub mod conversation;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod record;
pub mod serde_time;
pub mod state;
pub mod task_type;

pub use conversation::{ConversationId, Message};
pub use envelope::{DEFAULT_PRIORITY, ExecutionMode, MAX_PRIORITY, MIN_PRIORITY, TaskEnvelope};
pub use errors::{ContextStoreError, DispatchError, ErrorKind, TaskError};
pub use ids::{IdParseError, MessageId, TaskId};
pub use outcome::{Accepted, ExecutionReport, ExecutionStatus, SubmitResult};
pub use record::{StatusRecord, TerminalWrite};
pub use state::TaskState;
pub use task_type::{ParseTaskTypeError, TaskType};
