//! Background runner: bounded priority queue drained by a fixed worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::execution::invoke;
use crate::domain::{
    DispatchError, ExecutionReport, Message, TaskEnvelope, TaskError, TaskId, TerminalWrite,
};
use crate::ports::{Capability, ExecutionContext, IdGenerator};
use crate::queue::{PushError, SharedQueue};
use crate::store::StatusStore;

/// Everything a worker needs to run one task, fixed at submission time.
pub(crate) struct QueuedJob {
    task_id: TaskId,
    envelope: Arc<TaskEnvelope>,
    capability: Arc<dyn Capability>,
    history: Vec<Message>,
    timeout: Duration,
}

/// Emitted after a worker writes a task's terminal state.
#[derive(Debug)]
pub(crate) struct Completion {
    pub task_id: TaskId,
    pub envelope: Arc<TaskEnvelope>,
    pub outcome: Result<serde_json::Value, TaskError>,
}

pub struct BackgroundRunner {
    queue: SharedQueue<QueuedJob>,
    store: Arc<StatusStore>,
    ids: Arc<dyn IdGenerator>,
    worker_count: usize,
    completions: mpsc::UnboundedSender<Completion>,
    workers: Mutex<Option<WorkerGroup>>,
    closed: AtomicBool,
}

impl BackgroundRunner {
    pub(crate) fn new(
        queue_capacity: usize,
        worker_count: usize,
        store: Arc<StatusStore>,
        ids: Arc<dyn IdGenerator>,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            queue: SharedQueue::new(queue_capacity),
            store,
            ids,
            worker_count,
            completions,
            workers: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Generate a handle, create the PENDING record and queue the job.
    ///
    /// A full or closed queue is rejected before any id or record exists.
    /// The closed check happens under the queue lock, so nothing is accepted
    /// once `shutdown` has closed the queue.
    pub(crate) async fn enqueue(
        &self,
        envelope: Arc<TaskEnvelope>,
        capability: Arc<dyn Capability>,
        history: Vec<Message>,
        timeout: Duration,
    ) -> Result<TaskId, DispatchError> {
        let priority = envelope.priority();
        let task_type = envelope.task_type();
        let task_id = self
            .queue
            .try_push_with(priority, || {
                let task_id = self.ids.generate_task_id();
                self.store.insert_pending(task_id, task_type, priority);
                let job = QueuedJob {
                    task_id,
                    envelope,
                    capability,
                    history,
                    timeout,
                };
                (job, task_id)
            })
            .await
            .map_err(|err| match err {
                PushError::Full { capacity } => {
                    warn!(task_type = %task_type, capacity, "queue full, submission rejected");
                    DispatchError::QueueFull { capacity }
                }
                PushError::Closed => DispatchError::ShuttingDown,
            })?;

        debug!(task_id = %task_id, task_type = %task_type, priority, "task queued");
        Ok(task_id)
    }

    /// Spawn the worker pool. No-op if it is already running or the runner
    /// has been shut down. Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        if workers.is_some() {
            return false;
        }
        *workers = Some(WorkerGroup::spawn(
            self.worker_count,
            self.queue.clone(),
            Arc::clone(&self.store),
            self.completions.clone(),
        ));
        info!(workers = self.worker_count, "background workers started");
        true
    }

    pub fn is_running(&self) -> bool {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Refuse new submissions, stop workers from taking queued jobs and wait
    /// for in-flight ones. Jobs still queued stay PENDING.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.queue.close().await;
        let group = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(group) = group {
            group.shutdown_and_join().await;
            info!("background workers stopped");
        }
    }

    pub async fn queue_depth(&self) -> usize {
        self.queue.len().await
    }
}

/// Worker group handle.
/// - `request_shutdown()` stops every worker before its next pop
/// - `shutdown_and_join()` also waits for in-flight jobs
struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    fn spawn(
        n: usize,
        queue: SharedQueue<QueuedJob>,
        store: Arc<StatusStore>,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let joins = (0..n)
            .map(|worker_id| {
                let queue = queue.clone();
                let store = Arc::clone(&store);
                let completions = completions.clone();
                let mut rx = shutdown_rx.clone();
                tokio::spawn(async move {
                    worker_loop(worker_id, queue, store, completions, &mut rx).await;
                })
            })
            .collect();

        Self { shutdown_tx, joins }
    }

    fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(err) = join.await {
                warn!(error = %err, "worker exited abnormally");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: SharedQueue<QueuedJob>,
    store: Arc<StatusStore>,
    completions: mpsc::UnboundedSender<Completion>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    debug!(worker_id, "worker started");
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // pop() waits, so race it against shutdown
        let job = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            job = queue.pop() => job,
        };

        run_job(worker_id, job, &store, &completions).await;
    }
    debug!(worker_id, "worker stopped");
}

async fn run_job(
    worker_id: usize,
    job: QueuedJob,
    store: &StatusStore,
    completions: &mpsc::UnboundedSender<Completion>,
) {
    let QueuedJob {
        task_id,
        envelope,
        capability,
        history,
        timeout,
    } = job;
    let task_type = envelope.task_type();

    if !store.mark_running(&task_id) {
        warn!(task_id = %task_id, task_type = %task_type, worker_id, "queued task is no longer pending, skipped");
        return;
    }
    info!(task_id = %task_id, task_type = %task_type, worker_id, "task started");

    let started = Instant::now();
    let context = ExecutionContext::new(
        task_type,
        envelope.conversation_id().cloned(),
        history,
        started + timeout,
    );
    let outcome = invoke(capability, envelope.payload().clone(), context, timeout).await;
    let report = ExecutionReport::from_outcome(outcome.clone(), started.elapsed(), true);

    info!(
        task_id = %task_id,
        task_type = %task_type,
        worker_id,
        success = report.is_success(),
        elapsed_ms = report.execution_time().as_millis() as u64,
        "task finished"
    );

    if store.set_terminal(&task_id, report) != TerminalWrite::Applied {
        return;
    }
    let completion = Completion {
        task_id,
        envelope,
        outcome,
    };
    if completions.send(completion).is_err() {
        debug!(task_id = %task_id, "completion listener gone");
    }
}
