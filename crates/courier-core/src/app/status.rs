//! Read-side views returned by the dispatcher.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{StatusRecord, TaskError, TaskId, TaskState, serde_time};
use crate::store::StateCounts;

/// Poll response for a background task.
///
/// `successful`, `failed`, `timed_out`, `execution_time` and `async_mode` are
/// only present once `ready` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub task_id: TaskId,
    pub status: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timed_out: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_time::secs_f64_opt"
    )]
    pub execution_time: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_mode: Option<bool>,
}

impl From<&StatusRecord> for StatusView {
    fn from(record: &StatusRecord) -> Self {
        let ready = record.is_terminal();
        let ok = record.state == TaskState::Completed;
        Self {
            task_id: record.task_id,
            status: record.state,
            result: record.result.clone(),
            error: record.error.clone(),
            ready,
            successful: ready.then_some(ok),
            failed: ready.then_some(!ok),
            timed_out: ready.then(|| record.timed_out()),
            execution_time: record.execution_time.filter(|_| ready),
            async_mode: record.async_mode.filter(|_| ready),
        }
    }
}

/// Records per state plus the number of jobs waiting in the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub queue_depth: usize,
}

impl StatusCounts {
    pub(crate) fn new(states: StateCounts, queue_depth: usize) -> Self {
        Self {
            pending: states.pending,
            running: states.running,
            completed: states.completed,
            failed: states.failed,
            queue_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExecutionReport, TaskType};
    use chrono::Utc;
    use serde_json::json;
    use ulid::Ulid;

    fn record() -> StatusRecord {
        StatusRecord::pending(TaskId::from_ulid(Ulid::new()), TaskType::AgentChat, 5, Utc::now())
    }

    #[test]
    fn pending_view_omits_outcome_flags() {
        let v = serde_json::to_value(StatusView::from(&record())).unwrap();
        assert_eq!(v["status"], "pending");
        assert_eq!(v["ready"], false);
        assert!(v.get("successful").is_none());
        assert!(v.get("failed").is_none());
        assert!(v.get("result").is_none());
        assert!(v.get("timed_out").is_none());
        assert!(v.get("execution_time").is_none());
        assert!(v.get("async_mode").is_none());
    }

    #[test]
    fn completed_view_is_ready_and_successful() {
        let mut record = record();
        record.mark_running(Utc::now());
        record.finish(
            ExecutionReport::completed(json!({"reply": "hi"}), Duration::from_millis(1500), true),
            Utc::now(),
        );

        let v = serde_json::to_value(StatusView::from(&record)).unwrap();
        assert_eq!(v["status"], "completed");
        assert_eq!(v["ready"], true);
        assert_eq!(v["successful"], true);
        assert_eq!(v["failed"], false);
        assert_eq!(v["result"], json!({"reply": "hi"}));
        assert!(v.get("error").is_none());
        assert_eq!(v["timed_out"], false);
        assert_eq!(v["execution_time"], 1.5);
        assert_eq!(v["async_mode"], true);
    }

    #[test]
    fn failed_view_carries_error() {
        let mut record = record();
        record.mark_running(Utc::now());
        record.finish(
            ExecutionReport::failed(TaskError::capability("boom"), Duration::from_millis(2), true),
            Utc::now(),
        );

        let view = StatusView::from(&record);
        assert!(view.ready);
        assert_eq!(view.successful, Some(false));
        assert_eq!(view.failed, Some(true));
        assert_eq!(view.error, Some(TaskError::capability("boom")));
        assert_eq!(view.timed_out, Some(false));
    }

    #[test]
    fn timeout_failure_is_flagged() {
        let mut record = record();
        record.mark_running(Utc::now());
        let limit = Duration::from_millis(50);
        record.finish(ExecutionReport::failed(TaskError::timeout(limit), limit, true), Utc::now());

        let view = StatusView::from(&record);
        assert_eq!(view.failed, Some(true));
        assert_eq!(view.timed_out, Some(true));
        assert_eq!(view.execution_time, Some(limit));
    }
}
