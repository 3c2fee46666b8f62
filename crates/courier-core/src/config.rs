//! Orchestrator configuration, loaded from YAML.
//!
//! ```yaml
//! worker_count: 4
//! queue_capacity: 100
//! retention_ms: 3600000
//! sweep_interval_ms: 60000
//! log_level: info
//! capabilities:
//!   document_processing:
//!     timeout_ms: 900000
//!   system_analysis:
//!     supports_async: false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::TaskType;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-task-type settings that replace the registered defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityOverride {
    pub timeout_ms: Option<u64>,
    pub supports_async: Option<bool>,
}

impl CapabilityOverride {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
    /// Terminal records older than this are swept. `None` keeps them forever.
    pub retention_ms: Option<u64>,
    pub sweep_interval_ms: u64,
    pub log_level: String,
    pub capabilities: BTreeMap<TaskType, CapabilityOverride>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_capacity: 100,
            retention_ms: None,
            sweep_interval_ms: 60_000,
            log_level: "info".to_string(),
            capabilities: BTreeMap::new(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn retention(&self) -> Option<Duration> {
        self.retention_ms.map(Duration::from_millis)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid("worker_count must be > 0".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be > 0".into()));
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid("sweep_interval_ms must be > 0".into()));
        }
        if self.retention_ms == Some(0) {
            return Err(ConfigError::Invalid("retention_ms must be > 0 when set".into()));
        }
        for (task_type, over) in &self.capabilities {
            if over.timeout_ms == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "capabilities.{task_type}.timeout_ms must be > 0"
                )));
            }
        }
        Ok(())
    }
}

/// Read, parse and validate a YAML config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<OrchestratorConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    OrchestratorConfig::from_yaml_str(&raw)
}
