//! Built-in `health_check` capability.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::domain::TaskType;
use crate::ports::{Capability, CapabilityFailure, Clock, ExecutionContext, SystemClock};

/// Reports the orchestrator as healthy along with the task types it serves.
pub struct HealthCheckCapability {
    capabilities: Vec<TaskType>,
    clock: Arc<dyn Clock>,
}

impl HealthCheckCapability {
    pub fn new(capabilities: Vec<TaskType>) -> Self {
        Self::with_clock(capabilities, Arc::new(SystemClock))
    }

    pub fn with_clock(mut capabilities: Vec<TaskType>, clock: Arc<dyn Clock>) -> Self {
        capabilities.sort();
        capabilities.dedup();
        Self {
            capabilities,
            clock,
        }
    }
}

#[async_trait]
impl Capability for HealthCheckCapability {
    async fn execute(
        &self,
        _payload: serde_json::Value,
        _context: ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityFailure> {
        let names: Vec<&str> = self.capabilities.iter().map(|t| t.as_str()).collect();
        Ok(json!({
            "status": "healthy",
            "capabilities": names,
            "checked_at": self.clock.now().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn reports_sorted_capabilities_and_check_time() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()));
        let cap = HealthCheckCapability::with_clock(
            vec![TaskType::RagQuery, TaskType::AgentChat, TaskType::RagQuery],
            clock,
        );
        let ctx = ExecutionContext::new(
            TaskType::HealthCheck,
            None,
            Vec::new(),
            Instant::now() + Duration::from_secs(1),
        );

        let out = cap.execute(json!({}), ctx).await.unwrap();
        assert_eq!(out["status"], "healthy");
        assert_eq!(out["capabilities"], json!(["agent_chat", "rag_query"]));
        assert_eq!(out["checked_at"], "2026-03-01T12:00:00+00:00");
    }
}
