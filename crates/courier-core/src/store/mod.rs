//! Status store: concurrent map of background task records.
//!
//! Every mutation goes through `DashMap::get_mut`, which holds the shard's
//! write lock for that key, so each record has a single writer at a time.
//! Readers get clones and never observe a half-applied transition.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{ExecutionReport, StatusRecord, TaskId, TaskState, TaskType, TerminalWrite};
use crate::ports::Clock;

/// Number of records per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StateCounts {
    pub fn total(&self) -> usize {
        self.pending + self.running + self.completed + self.failed
    }
}

pub struct StatusStore {
    records: DashMap<TaskId, StatusRecord>,
    clock: Arc<dyn Clock>,
}

impl StatusStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// Create a PENDING record and return a copy of it.
    pub fn insert_pending(&self, task_id: TaskId, task_type: TaskType, priority: i32) -> StatusRecord {
        let record = StatusRecord::pending(task_id, task_type, priority, self.clock.now());
        self.records.insert(task_id, record.clone());
        record
    }

    pub fn get(&self, task_id: &TaskId) -> Option<StatusRecord> {
        self.records.get(task_id).map(|r| r.value().clone())
    }

    /// PENDING -> RUNNING. False if the record is missing or not pending.
    pub fn mark_running(&self, task_id: &TaskId) -> bool {
        let Some(mut record) = self.records.get_mut(task_id) else {
            warn!(task_id = %task_id, "mark_running on unknown task");
            return false;
        };
        let now = self.clock.now();
        record.mark_running(now)
    }

    /// Write the terminal state for a running task.
    ///
    /// Only the first terminal write lands; later ones are reported as
    /// `AlreadyTerminal` and leave the record untouched.
    pub fn set_terminal(&self, task_id: &TaskId, report: ExecutionReport) -> TerminalWrite {
        let Some(mut record) = self.records.get_mut(task_id) else {
            warn!(task_id = %task_id, "terminal write for unknown task");
            return TerminalWrite::Missing;
        };
        let now = self.clock.now();
        let write = record.finish(report, now);
        match write {
            TerminalWrite::Applied => {
                debug!(task_id = %task_id, state = %record.state, "terminal state recorded");
            }
            TerminalWrite::AlreadyTerminal => {
                debug!(task_id = %task_id, state = %record.state, "ignored second terminal write");
            }
            TerminalWrite::NotStarted => {
                warn!(task_id = %task_id, "terminal write for a task that never started");
            }
            TerminalWrite::Missing => {}
        }
        write
    }

    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for record in self.records.iter() {
            match record.state {
                TaskState::Pending => counts.pending += 1,
                TaskState::Running => counts.running += 1,
                TaskState::Completed => counts.completed += 1,
                TaskState::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Delete terminal records last updated before `cutoff`. Returns how many
    /// were removed.
    pub fn purge_terminal_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| !(record.is_terminal() && record.updated_at < cutoff));
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
