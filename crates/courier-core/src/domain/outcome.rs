//! Outcome model: the uniform envelope returned from either execution path.
//!
//! This module does not know about queues or workers. It only defines the
//! shape of what a client gets back from `submit`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::TaskError;
use super::ids::TaskId;
use super::serde_time;
use super::state::TaskState;

/// Final status of an execution report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

/// Result/Error envelope.
///
/// Exactly one of `result` / `error` is set; the constructors are the only way
/// to build one in-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    status: ExecutionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<TaskError>,

    /// Wall-clock time spent waiting for the capability.
    #[serde(with = "serde_time::secs_f64")]
    execution_time: Duration,

    /// `true` when a background worker produced the outcome.
    async_mode: bool,
}

impl ExecutionReport {
    pub fn completed(result: serde_json::Value, execution_time: Duration, async_mode: bool) -> Self {
        Self {
            status: ExecutionStatus::Completed,
            result: Some(result),
            error: None,
            execution_time,
            async_mode,
        }
    }

    pub fn failed(error: TaskError, execution_time: Duration, async_mode: bool) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            result: None,
            error: Some(error),
            execution_time,
            async_mode,
        }
    }

    pub fn from_outcome(
        outcome: Result<serde_json::Value, TaskError>,
        execution_time: Duration,
        async_mode: bool,
    ) -> Self {
        match outcome {
            Ok(value) => Self::completed(value, execution_time, async_mode),
            Err(error) => Self::failed(error, execution_time, async_mode),
        }
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    pub fn result(&self) -> Option<&serde_json::Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&TaskError> {
        self.error.as_ref()
    }

    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    pub fn async_mode(&self) -> bool {
        self.async_mode
    }

    /// Drop the timing and hand back the outcome alone.
    pub fn into_outcome(self) -> Result<serde_json::Value, TaskError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(error),
            (result, None) => Ok(result.unwrap_or(serde_json::Value::Null)),
        }
    }
}

/// Acknowledgement for an asynchronously submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    pub task_id: TaskId,
    pub status: TaskState,
}

impl Accepted {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: TaskState::Pending,
        }
    }
}

/// What `submit` hands back: a finished report (synchronous) or a handle
/// (asynchronous).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubmitResult {
    Finished(ExecutionReport),
    Accepted(Accepted),
}

impl SubmitResult {
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            SubmitResult::Accepted(accepted) => Some(accepted.task_id),
            SubmitResult::Finished(_) => None,
        }
    }

    pub fn report(&self) -> Option<&ExecutionReport> {
        match self {
            SubmitResult::Finished(report) => Some(report),
            SubmitResult::Accepted(_) => None,
        }
    }

    pub fn into_report(self) -> Option<ExecutionReport> {
        match self {
            SubmitResult::Finished(report) => Some(report),
            SubmitResult::Accepted(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;
    use serde_json::json;
    use ulid::Ulid;

    #[test]
    fn completed_report_shape() {
        let report = ExecutionReport::completed(json!({"ok": true}), Duration::from_millis(1500), false);
        let v = serde_json::to_value(&report).unwrap();

        assert_eq!(v["status"], "completed");
        assert_eq!(v["result"]["ok"], true);
        assert!(v.get("error").is_none());
        assert_eq!(v["execution_time"], 1.5);
        assert_eq!(v["async_mode"], false);
    }

    #[test]
    fn failed_report_carries_only_error() {
        let report = ExecutionReport::from_outcome(
            Err(TaskError::capability("boom")),
            Duration::from_millis(3),
            true,
        );

        assert!(!report.is_success());
        assert!(report.result().is_none());
        assert_eq!(report.error().map(|e| e.kind), Some(ErrorKind::CapabilityError));

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["status"], "failed");
        assert!(v.get("result").is_none());
        assert_eq!(report.into_outcome(), Err(TaskError::capability("boom")));
    }

    #[test]
    fn accepted_serializes_as_pending_handle() {
        let task_id = TaskId::from_ulid(Ulid::new());
        let submit = SubmitResult::Accepted(Accepted::new(task_id));
        let v = serde_json::to_value(&submit).unwrap();

        assert_eq!(v, json!({"task_id": task_id.to_string(), "status": "pending"}));
        assert_eq!(submit.task_id(), Some(task_id));
        assert!(submit.report().is_none());
    }
}
