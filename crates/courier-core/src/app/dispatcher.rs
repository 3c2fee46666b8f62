//! Dispatcher - the single entry point for task submission.
//!
//! # Flow
//! 1. Validate: task type registered, priority in range, async supported
//! 2. Resolve the timeout (envelope, else registry default)
//! 3. Load conversation history when the envelope names a conversation
//!    (bounded by the task timeout)
//! 4. Synchronous: run inline, append the turn (also bounded), return the report
//!    Asynchronous: queue the job, return the handle
//!
//! Asynchronous turns are appended by a completion listener once the worker
//! has written the terminal state, so a poll can observe COMPLETED shortly
//! before the turn is visible in the conversation store.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout as within;
use tracing::{debug, info, warn};

use super::context::ContextThreader;
use super::inline::InlineExecutor;
use super::runner::{BackgroundRunner, Completion};
use super::status::{StatusCounts, StatusView};
use crate::domain::{
    Accepted, ContextStoreError, DispatchError, ExecutionMode, SubmitResult, TaskEnvelope, TaskId,
};
use crate::registry::{CapabilityEntry, CapabilityRegistry};
use crate::store::StatusStore;

pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    inline: InlineExecutor,
    runner: Arc<BackgroundRunner>,
    store: Arc<StatusStore>,
    context: ContextThreader,
    shutdown_tx: watch::Sender<bool>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Wires the parts together and spawns the completion listener.
    /// Called by `OrchestratorBuilder::build`.
    pub(crate) fn new(
        registry: Arc<CapabilityRegistry>,
        runner: Arc<BackgroundRunner>,
        store: Arc<StatusStore>,
        context: ContextThreader,
        completions: mpsc::UnboundedReceiver<Completion>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Self {
        let listener = spawn_completion_listener(
            completions,
            context.clone(),
            shutdown_tx.subscribe(),
        );
        Self {
            registry,
            inline: InlineExecutor::new(),
            runner,
            store,
            context,
            shutdown_tx,
            background: Mutex::new(vec![listener]),
        }
    }

    pub(crate) fn track(&self, handle: JoinHandle<()>) {
        self.background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Check an envelope against the registry without running it.
    pub fn validate(&self, envelope: &TaskEnvelope) -> Result<&CapabilityEntry, DispatchError> {
        let task_type = envelope.task_type();
        let entry = self
            .registry
            .resolve(task_type)
            .ok_or(DispatchError::UnknownTaskType(task_type))?;
        if !envelope.has_valid_priority() {
            return Err(DispatchError::InvalidPriority(envelope.priority()));
        }
        if envelope.execution_mode() == ExecutionMode::Asynchronous && !entry.supports_async() {
            return Err(DispatchError::UnsupportedExecutionMode(task_type));
        }
        Ok(entry)
    }

    /// Submit a task.
    ///
    /// Validation, context-load and queue-admission failures come back as
    /// `Err`. Execution failures (timeout, capability error) do not: they are
    /// in the returned report (synchronous) or the status record (asynchronous).
    ///
    /// Each conversation store call is bounded by the task timeout: a load
    /// that does not answer in time is `ContextUnavailable`, an append that
    /// does not is logged and dropped. A synchronous submit therefore returns
    /// within roughly three times the timeout even with a hung store.
    pub async fn submit(&self, envelope: TaskEnvelope) -> Result<SubmitResult, DispatchError> {
        let entry = match self.validate(&envelope) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(task_type = %envelope.task_type(), error = %err, "submission rejected");
                return Err(err);
            }
        };
        let timeout = envelope.timeout().unwrap_or(entry.default_timeout());
        let capability = Arc::clone(entry.capability());

        let loaded = within(timeout, self.context.load(&envelope))
            .await
            .unwrap_or_else(|_| {
                Err(ContextStoreError::Unavailable(format!(
                    "no answer within {}ms",
                    timeout.as_millis()
                )))
            });
        let history = loaded.map_err(|err| {
            warn!(
                task_type = %envelope.task_type(),
                conversation_id = ?envelope.conversation_id().map(|c| c.as_str()),
                error = %err,
                "conversation history unavailable"
            );
            DispatchError::from(err)
        })?;

        match envelope.execution_mode() {
            ExecutionMode::Synchronous => {
                let report = self
                    .inline
                    .execute(&envelope, capability, history, timeout)
                    .await;
                if let Some(result) = report.result() {
                    let appended = within(timeout, self.context.record_turn(&envelope, result)).await;
                    if appended.is_err() {
                        warn!(
                            task_type = %envelope.task_type(),
                            timeout_ms = timeout.as_millis() as u64,
                            "conversation append timed out, turn dropped"
                        );
                    }
                }
                Ok(SubmitResult::Finished(report))
            }
            ExecutionMode::Asynchronous => {
                let task_type = envelope.task_type();
                let task_id = self
                    .runner
                    .enqueue(Arc::new(envelope), capability, history, timeout)
                    .await?;
                info!(task_id = %task_id, task_type = %task_type, "task accepted");
                Ok(SubmitResult::Accepted(Accepted::new(task_id)))
            }
        }
    }

    /// Status of a background task, or `None` for an unknown (or swept) handle.
    pub fn status(&self, task_id: &TaskId) -> Option<StatusView> {
        self.store.get(task_id).map(|record| StatusView::from(&record))
    }

    pub async fn counts(&self) -> StatusCounts {
        StatusCounts::new(self.store.counts(), self.runner.queue_depth().await)
    }

    /// Start the worker pool if it was deferred at build time.
    pub fn start_workers(&self) -> bool {
        self.runner.start()
    }

    /// Stop accepting background work, wait for in-flight tasks, flush their
    /// conversation turns and stop the sweeper. Synchronous submissions keep
    /// working.
    pub async fn shutdown(&self) {
        self.runner.shutdown().await;
        // ignore send error: every receiver may already be gone
        let _ = self.shutdown_tx.send(true);

        let handles: Vec<JoinHandle<()>> = self
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "background task exited abnormally");
            }
        }
        info!("dispatcher shut down");
    }
}

fn spawn_completion_listener(
    mut completions: mpsc::UnboundedReceiver<Completion>,
    context: ContextThreader,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                completion = completions.recv() => {
                    let Some(completion) = completion else { break };
                    handle_completion(&context, completion).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        // workers have joined: whatever they sent is already here
                        while let Ok(completion) = completions.try_recv() {
                            handle_completion(&context, completion).await;
                        }
                        break;
                    }
                }
            }
        }
        debug!("completion listener stopped");
    })
}

async fn handle_completion(context: &ContextThreader, completion: Completion) {
    if let Ok(result) = &completion.outcome {
        debug!(task_id = %completion.task_id, "recording conversation turn");
        context.record_turn(&completion.envelope, result).await;
    }
}
