//! Errors - taxonomy shared by submit results, reports and status records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::task_type::TaskType;

/// Operational classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTaskType,
    InvalidPriority,
    UnsupportedExecutionMode,
    QueueFull,
    Timeout,
    CapabilityError,
    ContextUnavailable,
    ShuttingDown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnknownTaskType => "unknown_task_type",
            ErrorKind::InvalidPriority => "invalid_priority",
            ErrorKind::UnsupportedExecutionMode => "unsupported_execution_mode",
            ErrorKind::QueueFull => "queue_full",
            ErrorKind::Timeout => "timeout",
            ErrorKind::CapabilityError => "capability_error",
            ErrorKind::ContextUnavailable => "context_unavailable",
            ErrorKind::ShuttingDown => "shutting_down",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable error carried by execution reports and failed status records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TaskError {
    pub kind: ErrorKind,
    pub message: String,
}

impl TaskError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("no result within {} ms", after.as_millis()),
        )
    }

    pub fn capability(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapabilityError, message)
    }
}

/// Failure reported by a conversation store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextStoreError {
    #[error("conversation store unavailable: {0}")]
    Unavailable(String),

    #[error("conversation store rejected the message: {0}")]
    Rejected(String),
}

/// Errors returned synchronously from `Dispatcher::submit`.
///
/// Execution failures (timeout, capability error) are not here: they travel
/// inside the execution report or the terminal status record.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no capability registered for task_type={0}")]
    UnknownTaskType(TaskType),

    #[error("priority {0} is outside [1, 10]")]
    InvalidPriority(i32),

    #[error("task_type={0} does not support asynchronous execution")]
    UnsupportedExecutionMode(TaskType),

    #[error("background queue is full (capacity={capacity})")]
    QueueFull { capacity: usize },

    #[error(transparent)]
    ContextUnavailable(#[from] ContextStoreError),

    #[error("orchestrator is shutting down")]
    ShuttingDown,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownTaskType(_) => ErrorKind::UnknownTaskType,
            DispatchError::InvalidPriority(_) => ErrorKind::InvalidPriority,
            DispatchError::UnsupportedExecutionMode(_) => ErrorKind::UnsupportedExecutionMode,
            DispatchError::QueueFull { .. } => ErrorKind::QueueFull,
            DispatchError::ContextUnavailable(_) => ErrorKind::ContextUnavailable,
            DispatchError::ShuttingDown => ErrorKind::ShuttingDown,
        }
    }
}

impl From<DispatchError> for TaskError {
    fn from(err: DispatchError) -> Self {
        TaskError::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_error_serializes_kind_and_message() {
        let err = TaskError::timeout(Duration::from_millis(250));
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["kind"], "timeout");
        assert_eq!(v["message"], "no result within 250 ms");
    }

    #[test]
    fn dispatch_error_maps_to_kind() {
        let err = DispatchError::QueueFull { capacity: 10 };
        assert_eq!(err.kind(), ErrorKind::QueueFull);

        let task_err: TaskError = err.into();
        assert_eq!(task_err.kind, ErrorKind::QueueFull);
        assert!(task_err.message.contains("capacity=10"));
    }

    #[test]
    fn context_errors_convert_into_dispatch_errors() {
        let err: DispatchError = ContextStoreError::Unavailable("db down".into()).into();
        assert_eq!(err.kind(), ErrorKind::ContextUnavailable);
        assert!(err.to_string().contains("db down"));
    }
}
