//! App - composes ports, registry, queue and store into the orchestrator.
//!
//! # Main components
//! - **OrchestratorBuilder**: wiring and startup validation
//! - **Dispatcher**: submission entry point, status and counts
//! - **InlineExecutor**: synchronous execution under a timeout
//! - **BackgroundRunner**: priority queue + worker pool
//! - **RetentionSweeper**: removal of expired terminal records

pub mod builder;
pub mod context;
pub mod dispatcher;
mod execution;
pub mod inline;
pub mod retention;
pub mod runner;
pub mod status;

pub use self::builder::{BuildError, OrchestratorBuilder};
pub use self::context::ContextThreader;
pub use self::dispatcher::Dispatcher;
pub use self::inline::InlineExecutor;
pub use self::retention::RetentionSweeper;
pub use self::runner::BackgroundRunner;
pub use self::status::{StatusCounts, StatusView};
