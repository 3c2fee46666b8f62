//! TaskType - the closed set of work kinds the orchestrator accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Kind of work carried by a `TaskEnvelope`.
///
/// The set is closed so dispatch is an exhaustive match; the payload stays
/// opaque and is only interpreted by the capability registered for the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    AgentChat,
    MultiAgentWorkflow,
    DocumentSearch,
    RagQuery,
    DocumentProcessing,
    SystemAnalysis,
    ComprehensiveWorkflow,
    HealthCheck,
    DataCleanup,
}

impl TaskType {
    pub const ALL: [TaskType; 9] = [
        TaskType::AgentChat,
        TaskType::MultiAgentWorkflow,
        TaskType::DocumentSearch,
        TaskType::RagQuery,
        TaskType::DocumentProcessing,
        TaskType::SystemAnalysis,
        TaskType::ComprehensiveWorkflow,
        TaskType::HealthCheck,
        TaskType::DataCleanup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::AgentChat => "agent_chat",
            TaskType::MultiAgentWorkflow => "multi_agent_workflow",
            TaskType::DocumentSearch => "document_search",
            TaskType::RagQuery => "rag_query",
            TaskType::DocumentProcessing => "document_processing",
            TaskType::SystemAnalysis => "system_analysis",
            TaskType::ComprehensiveWorkflow => "comprehensive_workflow",
            TaskType::HealthCheck => "health_check",
            TaskType::DataCleanup => "data_cleanup",
        }
    }

    /// Human label used when a registry entry does not set its own.
    pub fn label(self) -> &'static str {
        match self {
            TaskType::AgentChat => "Agent Chat",
            TaskType::MultiAgentWorkflow => "Multi-Agent Workflow",
            TaskType::DocumentSearch => "Document Search",
            TaskType::RagQuery => "RAG Query",
            TaskType::DocumentProcessing => "Document Processing",
            TaskType::SystemAnalysis => "System Analysis",
            TaskType::ComprehensiveWorkflow => "Comprehensive Workflow",
            TaskType::HealthCheck => "Health Check",
            TaskType::DataCleanup => "Data Cleanup",
        }
    }

    /// Timeout applied when neither the envelope nor the registry entry
    /// overrides it.
    pub fn default_timeout(self) -> Duration {
        let secs = match self {
            TaskType::HealthCheck => 10,
            TaskType::DocumentSearch => 30,
            TaskType::AgentChat | TaskType::RagQuery => 60,
            TaskType::SystemAnalysis => 120,
            TaskType::MultiAgentWorkflow | TaskType::DataCleanup => 300,
            TaskType::DocumentProcessing | TaskType::ComprehensiveWorkflow => 600,
        };
        Duration::from_secs(secs)
    }

    /// Health probes are meant to answer inline; everything else may be queued.
    pub fn supports_async_by_default(self) -> bool {
        !matches!(self, TaskType::HealthCheck)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task type '{0}'")]
pub struct ParseTaskTypeError(pub String);

impl FromStr for TaskType {
    type Err = ParseTaskTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseTaskTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::agent_chat(TaskType::AgentChat, "agent_chat")]
    #[case::rag_query(TaskType::RagQuery, "rag_query")]
    #[case::health_check(TaskType::HealthCheck, "health_check")]
    #[case::data_cleanup(TaskType::DataCleanup, "data_cleanup")]
    fn wire_name_matches_serde(#[case] task_type: TaskType, #[case] name: &str) {
        assert_eq!(task_type.as_str(), name);
        assert_eq!(
            serde_json::to_value(task_type).unwrap(),
            serde_json::json!(name)
        );
        assert_eq!(name.parse::<TaskType>().unwrap(), task_type);
    }

    #[test]
    fn every_variant_parses_from_its_name() {
        for task_type in TaskType::ALL {
            assert_eq!(task_type.as_str().parse::<TaskType>(), Ok(task_type));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "teleport".parse::<TaskType>().unwrap_err();
        assert_eq!(err, ParseTaskTypeError("teleport".to_string()));
    }

    #[test]
    fn only_health_check_is_sync_only() {
        let sync_only: Vec<_> = TaskType::ALL
            .into_iter()
            .filter(|t| !t.supports_async_by_default())
            .collect();
        assert_eq!(sync_only, vec![TaskType::HealthCheck]);
    }
}
