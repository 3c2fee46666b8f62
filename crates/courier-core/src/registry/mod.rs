//! Capability registry - task type to executor lookup.
//!
//! Built once at startup through `RegistryBuilder`, then shared read-only via
//! `Arc`. No locks: nothing mutates it after `build()`.

mod builder;
mod entry;

use std::collections::HashMap;

use crate::domain::TaskType;

pub use self::builder::RegistryBuilder;
pub use self::entry::CapabilityEntry;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("capability for task type '{0}' is already registered")]
    AlreadyRegistered(TaskType),

    #[error("missing task types: {0:?}; they were expected but not registered")]
    MissingTaskTypes(Vec<TaskType>),
}

#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<TaskType, CapabilityEntry>,
}

impl CapabilityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn resolve(&self, task_type: TaskType) -> Option<&CapabilityEntry> {
        self.entries.get(&task_type)
    }

    /// Registered task types in declaration order of `TaskType`.
    pub fn registered_types(&self) -> Vec<TaskType> {
        let mut types: Vec<TaskType> = self.entries.keys().copied().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
