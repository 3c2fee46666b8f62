//! OrchestratorBuilder - wiring and startup validation.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::info;

use super::context::ContextThreader;
use super::dispatcher::Dispatcher;
use super::retention::RetentionSweeper;
use super::runner::BackgroundRunner;
use crate::config::{ConfigError, OrchestratorConfig};
use crate::ports::{Clock, ConversationStore, IdGenerator, SystemClock, UlidGenerator};
use crate::registry::{RegistryBuilder, RegistryError};
use crate::store::StatusStore;

/// Startup failure: bad configuration or an incomplete registry.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Builds a `Dispatcher`.
///
/// ```ignore
/// let dispatcher = OrchestratorBuilder::new(
///         RegistryBuilder::new()
///             .register_typed::<ChatRequest, _>(ChatAgent)?
///             .with_health_check(),
///     )
///     .config(load_config("courier.yaml")?)
///     .conversation_store(Arc::new(InMemoryConversationStore::new()))
///     .build()?;
/// ```
///
/// `build()` validates the config, applies its capability overrides to the
/// registry and spawns the worker pool (unless deferred), the completion
/// listener and, when retention is configured, the sweeper. It must run inside
/// a tokio runtime.
pub struct OrchestratorBuilder {
    registry: RegistryBuilder,
    config: OrchestratorConfig,
    conversation_store: Option<Arc<dyn ConversationStore>>,
    clock: Option<Arc<dyn Clock>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    defer_workers: bool,
}

impl OrchestratorBuilder {
    pub fn new(registry: RegistryBuilder) -> Self {
        Self {
            registry,
            config: OrchestratorConfig::default(),
            conversation_store: None,
            clock: None,
            id_generator: None,
            defer_workers: false,
        }
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversation_store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// Leave the worker pool stopped until `Dispatcher::start_workers`.
    pub fn defer_workers(mut self, defer: bool) -> Self {
        self.defer_workers = defer;
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let Self {
            registry,
            config,
            conversation_store,
            clock,
            id_generator,
            defer_workers,
        } = self;

        config.validate()?;
        let registry = Arc::new(registry.apply_overrides(&config.capabilities).build()?);

        let clock: Arc<dyn Clock> = clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids: Arc<dyn IdGenerator> =
            id_generator.unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        let store = Arc::new(StatusStore::new(Arc::clone(&clock)));
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let runner = Arc::new(BackgroundRunner::new(
            config.queue_capacity,
            config.worker_count,
            Arc::clone(&store),
            Arc::clone(&ids),
            completions_tx,
        ));
        let context = ContextThreader::new(conversation_store, ids, Arc::clone(&clock));
        let (shutdown_tx, _) = watch::channel(false);

        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&runner),
            Arc::clone(&store),
            context,
            completions_rx,
            shutdown_tx.clone(),
        );

        if let Some(retention) = config.retention() {
            let sweeper = RetentionSweeper::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                retention,
                config.sweep_interval(),
            );
            dispatcher.track(sweeper.spawn(shutdown_tx.subscribe()));
        }

        if !defer_workers {
            runner.start();
        }

        info!(
            capabilities = registry.len(),
            workers = config.worker_count,
            queue_capacity = config.queue_capacity,
            retention_ms = config.retention_ms,
            deferred = defer_workers,
            "orchestrator built"
        );
        Ok(dispatcher)
    }
}
