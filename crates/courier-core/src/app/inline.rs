//! Inline executor: runs a task on the caller's task and waits for it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use super::execution::invoke;
use crate::domain::{ExecutionReport, Message, TaskEnvelope};
use crate::ports::{Capability, ExecutionContext};

#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl InlineExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute and report. Never returns an `Err`: failures and timeouts are
    /// part of the report.
    pub async fn execute(
        &self,
        envelope: &TaskEnvelope,
        capability: Arc<dyn Capability>,
        history: Vec<Message>,
        timeout: Duration,
    ) -> ExecutionReport {
        let started = Instant::now();
        let context = ExecutionContext::new(
            envelope.task_type(),
            envelope.conversation_id().cloned(),
            history,
            started + timeout,
        );

        let outcome = invoke(capability, envelope.payload().clone(), context, timeout).await;
        let elapsed = started.elapsed();

        info!(
            task_type = %envelope.task_type(),
            success = outcome.is_ok(),
            elapsed_ms = elapsed.as_millis() as u64,
            "inline task finished"
        );
        ExecutionReport::from_outcome(outcome, elapsed, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, ExecutionStatus, TaskType};
    use crate::ports::from_fn;
    use serde_json::json;

    #[tokio::test]
    async fn report_carries_result_and_elapsed_time() {
        let cap: Arc<dyn Capability> = Arc::new(from_fn(|p, _| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(json!({"echo": p}))
        }));
        let envelope = TaskEnvelope::new(TaskType::DocumentSearch, json!("rust"));

        let report = InlineExecutor::new()
            .execute(&envelope, cap, Vec::new(), Duration::from_secs(1))
            .await;

        assert_eq!(report.status(), ExecutionStatus::Completed);
        assert_eq!(report.result(), Some(&json!({"echo": "rust"})));
        assert!(report.execution_time() >= Duration::from_millis(5));
        assert!(!report.async_mode());
    }

    #[tokio::test]
    async fn never_returning_capability_times_out_on_schedule() {
        let cap: Arc<dyn Capability> =
            Arc::new(from_fn(|_, _| std::future::pending::<Result<serde_json::Value, _>>()));
        let envelope = TaskEnvelope::new(TaskType::AgentChat, json!({}));
        let timeout = Duration::from_millis(80);

        let started = Instant::now();
        let report = InlineExecutor::new()
            .execute(&envelope, cap, Vec::new(), timeout)
            .await;
        let waited = started.elapsed();

        assert_eq!(report.error().map(|e| e.kind), Some(ErrorKind::Timeout));
        assert!(waited >= timeout);
        assert!(waited < timeout + Duration::from_millis(100), "waited {waited:?}");
    }
}
