//! Task state machine for background tasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a status record.
///
/// State transitions:
/// - Pending -> Running -> Completed
/// - Pending -> Running -> Failed (capability error or timeout)
///
/// Pending never jumps straight to a terminal state, and nothing leaves
/// Completed or Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Queued, not yet claimed by a worker.
    Pending,

    /// Claimed by a worker and executing.
    Running,

    /// Finished with a result.
    Completed,

    /// Finished with an error.
    Failed,
}

impl TaskState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }

    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::Running)
                | (TaskState::Running, TaskState::Completed)
                | (TaskState::Running, TaskState::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TaskState::Pending, TaskState::Running, true)]
    #[case(TaskState::Running, TaskState::Completed, true)]
    #[case(TaskState::Running, TaskState::Failed, true)]
    #[case(TaskState::Pending, TaskState::Completed, false)]
    #[case(TaskState::Pending, TaskState::Failed, false)]
    #[case(TaskState::Completed, TaskState::Failed, false)]
    #[case(TaskState::Failed, TaskState::Completed, false)]
    #[case(TaskState::Completed, TaskState::Running, false)]
    #[case(TaskState::Running, TaskState::Pending, false)]
    fn transitions(#[case] from: TaskState, #[case] to: TaskState, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(TaskState::Pending).unwrap(),
            serde_json::json!("pending")
        );
        assert_eq!(TaskState::Completed.to_string(), "completed");
    }
}
