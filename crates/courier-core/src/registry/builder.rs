//! RegistryBuilder - boot-time registration with a fail-fast completeness check.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{CapabilityEntry, CapabilityRegistry, RegistryError};
use crate::config::CapabilityOverride;
use crate::domain::TaskType;
use crate::impls::HealthCheckCapability;
use crate::typed::{Handler, Payload, TypedCapability};

/// Builds a `CapabilityRegistry`.
///
/// ```ignore
/// let registry = CapabilityRegistry::builder()
///     .register_typed::<ChatRequest, _>(ChatAgent::new())?
///     .with_health_check()
///     .expect_tasks(&[TaskType::AgentChat, TaskType::HealthCheck])
///     .apply_overrides(&config.capabilities)
///     .build()?;
/// ```
///
/// `build()` fails with `MissingTaskTypes` when an expected task type was
/// never registered, and with `AlreadyRegistered(HealthCheck)` when a custom
/// `health_check` capability was registered alongside `with_health_check()`,
/// whatever the call order.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<TaskType, CapabilityEntry>,
    expected: Option<Vec<TaskType>>,
    health_check: bool,
    overrides: BTreeMap<TaskType, CapabilityOverride>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, entry: CapabilityEntry) -> Result<Self, RegistryError> {
        let task_type = entry.task_type();
        if self.entries.contains_key(&task_type)
            || (self.health_check && task_type == TaskType::HealthCheck)
        {
            return Err(RegistryError::AlreadyRegistered(task_type));
        }
        debug!(task_type = %task_type, label = entry.label(), "capability registered");
        self.entries.insert(task_type, entry);
        Ok(self)
    }

    /// Register a typed handler under `P::TASK_TYPE` with default settings.
    pub fn register_typed<P, H>(self, handler: H) -> Result<Self, RegistryError>
    where
        P: Payload,
        H: Handler<P> + 'static,
    {
        let capability = Arc::new(TypedCapability::<P, H>::new(handler));
        self.register(CapabilityEntry::new(P::TASK_TYPE, capability))
    }

    /// Serve `health_check` with the built-in capability. It reports the
    /// final set of registered task types.
    pub fn with_health_check(mut self) -> Self {
        self.health_check = true;
        self
    }

    pub fn expect_tasks(mut self, task_types: &[TaskType]) -> Self {
        self.expected = Some(task_types.to_vec());
        self
    }

    /// Require every `TaskType` to be served.
    pub fn expect_all(self) -> Self {
        self.expect_tasks(&TaskType::ALL)
    }

    /// Per-task-type settings from configuration, applied at build time.
    pub fn apply_overrides(mut self, overrides: &BTreeMap<TaskType, CapabilityOverride>) -> Self {
        self.overrides
            .extend(overrides.iter().map(|(t, o)| (*t, o.clone())));
        self
    }

    pub fn build(self) -> Result<CapabilityRegistry, RegistryError> {
        let Self {
            mut entries,
            expected,
            health_check,
            overrides,
        } = self;

        if health_check {
            if entries.contains_key(&TaskType::HealthCheck) {
                return Err(RegistryError::AlreadyRegistered(TaskType::HealthCheck));
            }
            let mut served: Vec<TaskType> = entries.keys().copied().collect();
            served.push(TaskType::HealthCheck);
            let capability = Arc::new(HealthCheckCapability::new(served));
            entries.insert(
                TaskType::HealthCheck,
                CapabilityEntry::new(TaskType::HealthCheck, capability),
            );
        }

        if let Some(expected) = expected {
            let missing: Vec<TaskType> = expected
                .into_iter()
                .filter(|t| !entries.contains_key(t))
                .collect();
            if !missing.is_empty() {
                return Err(RegistryError::MissingTaskTypes(missing));
            }
        }

        for (task_type, over) in &overrides {
            match entries.get_mut(task_type) {
                Some(entry) => entry.apply(over),
                None => warn!(task_type = %task_type, "override for unregistered task type ignored"),
            }
        }

        Ok(CapabilityRegistry { entries })
    }
}
