//! Payload trait - binds a payload struct to its task type.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::TaskType;

/// A typed request body for one task type.
///
/// # Usage
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct ChatRequest {
///     message: String,
/// }
///
/// impl Payload for ChatRequest {
///     const TASK_TYPE: TaskType = TaskType::AgentChat;
/// }
/// ```
///
/// # Trait Bounds
/// - `DeserializeOwned`: decoded from the envelope's JSON payload
/// - `Serialize`: lets callers build envelopes from the same struct
/// - `Send + Sync + 'static`: moved onto worker tasks
pub trait Payload: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TASK_TYPE: TaskType;

    /// Encode into an envelope payload.
    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
