use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CapabilityOverride;
use crate::domain::TaskType;
use crate::ports::Capability;

/// What the orchestrator knows about one task type.
///
/// Label, timeout and async support start from the task type's defaults and
/// can be replaced before the registry is built.
#[derive(Clone)]
pub struct CapabilityEntry {
    task_type: TaskType,
    label: String,
    capability: Arc<dyn Capability>,
    default_timeout: Duration,
    supports_async: bool,
}

impl CapabilityEntry {
    pub fn new(task_type: TaskType, capability: Arc<dyn Capability>) -> Self {
        Self {
            task_type,
            label: task_type.label().to_string(),
            capability,
            default_timeout: task_type.default_timeout(),
            supports_async: task_type.supports_async_by_default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_async(mut self, supports_async: bool) -> Self {
        self.supports_async = supports_async;
        self
    }

    pub(crate) fn apply(&mut self, over: &CapabilityOverride) {
        if let Some(timeout) = over.timeout() {
            self.default_timeout = timeout;
        }
        if let Some(supports_async) = over.supports_async {
            self.supports_async = supports_async;
        }
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capability(&self) -> &Arc<dyn Capability> {
        &self.capability
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn supports_async(&self) -> bool {
        self.supports_async
    }
}

impl fmt::Debug for CapabilityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityEntry")
            .field("task_type", &self.task_type)
            .field("label", &self.label)
            .field("default_timeout", &self.default_timeout)
            .field("supports_async", &self.supports_async)
            .finish_non_exhaustive()
    }
}
