//! courier-core
//!
//! Core building blocks for the Courier task orchestrator: one submission
//! surface in front of many capabilities (agent chat, search, RAG, document
//! processing, maintenance), executed inline or on a background worker pool.
//!
//! # Modules
//! - **domain**: data model (ids, task types, envelopes, reports, status records, errors)
//! - **ports**: seams to collaborators (Capability, ConversationStore, Clock, IdGenerator)
//! - **typed**: payload-typed capabilities (Payload trait, Handler trait)
//! - **registry**: task type to capability lookup, built once at startup
//! - **queue**: bounded priority queue shared by submitters and workers
//! - **store**: concurrent status store for background tasks
//! - **app**: dispatcher, executors, builder, retention sweeper
//! - **config**: YAML configuration
//! - **impls**: shipped implementations (in-memory conversation store, health check)

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;
pub mod registry;
pub mod store;
pub mod typed;

pub use app::{BuildError, Dispatcher, OrchestratorBuilder, StatusCounts, StatusView};
pub use config::{CapabilityOverride, ConfigError, OrchestratorConfig, load_config};
pub use domain::{
    DispatchError, ErrorKind, ExecutionMode, ExecutionReport, SubmitResult, TaskEnvelope,
    TaskError, TaskId, TaskState, TaskType,
};
pub use registry::{CapabilityEntry, CapabilityRegistry, RegistryBuilder, RegistryError};
