//! Status record: lifecycle of one background task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::{ErrorKind, TaskError};
use super::ids::TaskId;
use super::outcome::ExecutionReport;
use super::serde_time;
use super::state::TaskState;
use super::task_type::TaskType;

/// Result of asking a record to move to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalWrite {
    /// The record moved from Running to Completed/Failed.
    Applied,
    /// The record was already terminal; nothing changed.
    AlreadyTerminal,
    /// The record is still Pending; terminal states are only reachable from Running.
    NotStarted,
    /// No record exists for the handle.
    Missing,
}

/// Metadata + outcome for a background task.
///
/// Design:
/// - This is the single source of truth for task state.
/// - All transitions go through the methods below, which refuse anything the
///   state machine does not allow. A refused write leaves the record untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub task_id: TaskId,
    pub task_type: TaskType,
    pub priority: i32,
    pub state: TaskState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,

    /// Time the capability ran, copied from the report that finished the task.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_time::secs_f64_opt"
    )]
    pub execution_time: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_mode: Option<bool>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StatusRecord {
    pub fn pending(task_id: TaskId, task_type: TaskType, priority: i32, now: DateTime<Utc>) -> Self {
        Self {
            task_id,
            task_type,
            priority,
            state: TaskState::Pending,
            result: None,
            error: None,
            execution_time: None,
            async_mode: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
        }
    }

    /// Pending -> Running. Returns false if the record was not Pending.
    pub fn mark_running(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.can_transition_to(TaskState::Running) {
            return false;
        }
        self.state = TaskState::Running;
        self.started_at = Some(now);
        self.updated_at = now;
        true
    }

    /// Running -> Completed / Failed, at most once. The record keeps the
    /// report's outcome, execution time and mode flag.
    pub fn finish(&mut self, report: ExecutionReport, now: DateTime<Utc>) -> TerminalWrite {
        if self.state.is_terminal() {
            return TerminalWrite::AlreadyTerminal;
        }
        if self.state == TaskState::Pending {
            return TerminalWrite::NotStarted;
        }

        self.execution_time = Some(report.execution_time());
        self.async_mode = Some(report.async_mode());
        match report.into_outcome() {
            Ok(value) => {
                self.state = TaskState::Completed;
                self.result = Some(value);
            }
            Err(error) => {
                self.state = TaskState::Failed;
                self.error = Some(error);
            }
        }
        self.finished_at = Some(now);
        self.updated_at = now;
        TerminalWrite::Applied
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn timed_out(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|e| e.kind == ErrorKind::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::time::Duration;
    use ulid::Ulid;

    fn ok(value: serde_json::Value) -> ExecutionReport {
        ExecutionReport::completed(value, Duration::from_millis(250), true)
    }

    fn err(error: TaskError) -> ExecutionReport {
        ExecutionReport::failed(error, Duration::from_millis(10), true)
    }

    fn record() -> StatusRecord {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        StatusRecord::pending(TaskId::from_ulid(Ulid::new()), TaskType::AgentChat, 5, t0)
    }

    #[test]
    fn new_record_is_pending_without_outcome() {
        let r = record();
        assert_eq!(r.state, TaskState::Pending);
        assert!(r.result.is_none() && r.error.is_none());
        assert_eq!(r.created_at, r.updated_at);
    }

    #[test]
    fn pending_cannot_finish_directly() {
        let mut r = record();
        let write = r.finish(ok(json!(1)), Utc::now());
        assert_eq!(write, TerminalWrite::NotStarted);
        assert_eq!(r.state, TaskState::Pending);
        assert!(r.result.is_none());
        assert!(r.execution_time.is_none());
    }

    #[test]
    fn running_completes_once() {
        let mut r = record();
        assert!(r.mark_running(Utc::now()));
        assert!(!r.mark_running(Utc::now()));

        assert_eq!(r.finish(ok(json!({"a": 1})), Utc::now()), TerminalWrite::Applied);
        assert_eq!(r.state, TaskState::Completed);
        assert!(r.finished_at.is_some());
        assert_eq!(r.execution_time, Some(Duration::from_millis(250)));
        assert_eq!(r.async_mode, Some(true));

        let late = r.finish(err(TaskError::capability("late")), Utc::now());
        assert_eq!(late, TerminalWrite::AlreadyTerminal);
        assert_eq!(r.state, TaskState::Completed);
        assert_eq!(r.result, Some(json!({"a": 1})));
        assert!(r.error.is_none());
    }

    #[test]
    fn timeout_failure_is_sticky() {
        let mut r = record();
        r.mark_running(Utc::now());
        r.finish(err(TaskError::timeout(Duration::from_millis(10))), Utc::now());
        assert!(r.timed_out());

        assert_eq!(r.finish(ok(json!("late success")), Utc::now()), TerminalWrite::AlreadyTerminal);
        assert_eq!(r.state, TaskState::Failed);
        assert!(r.result.is_none());
        assert_eq!(r.execution_time, Some(Duration::from_millis(10)));
    }

    #[test]
    fn execution_time_serializes_as_seconds() {
        let mut r = record();
        r.mark_running(Utc::now());
        r.finish(ok(json!("done")), Utc::now());

        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["execution_time"], json!(0.25));
        assert_eq!(v["async_mode"], true);
        let back: StatusRecord = serde_json::from_value(v).unwrap();
        assert_eq!(back.execution_time, Some(Duration::from_millis(250)));
    }
}
