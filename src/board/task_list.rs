//! Task list view-model
//!
//! Owns the cached task collection and the client-local timing set, and
//! applies the reconciliation rules as requests complete. It performs no I/O:
//! callers ask it to `begin_*` an operation, run the request themselves
//! (spawned task in the TUI, awaited inline in `TaskService`), and hand the
//! outcome back through `finish_load` / `complete`.

use crate::api::{ApiError, GENERIC_FAILURE};
use crate::model::{NewTask, Task, TaskId, TaskStatus};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Task ids the user is currently timing on this client
pub type TimingSet = BTreeSet<TaskId>;

/// A user-initiated change to server state
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Start(TaskId),
    Stop(TaskId),
    Finish(TaskId),
    Remove(TaskId),
    Create(NewTask),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Start(_) => MutationKind::Start,
            Mutation::Stop(_) => MutationKind::Stop,
            Mutation::Finish(_) => MutationKind::Finish,
            Mutation::Remove(_) => MutationKind::Remove,
            Mutation::Create(_) => MutationKind::Create,
        }
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Mutation::Start(id) | Mutation::Stop(id) | Mutation::Finish(id) | Mutation::Remove(id) => {
                Some(id)
            }
            Mutation::Create(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Start,
    Stop,
    Finish,
    Remove,
    Create,
}

impl MutationKind {
    pub fn verb(&self) -> &'static str {
        match self {
            MutationKind::Start => "start timer",
            MutationKind::Stop => "stop timer",
            MutationKind::Finish => "finish task",
            MutationKind::Remove => "delete task",
            MutationKind::Create => "create task",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            MutationKind::Create => "Failed to create task",
            _ => GENERIC_FAILURE,
        }
    }
}

/// Why a mutation was refused before any request was sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("Task {0} is not in the list")]
    UnknownTask(TaskId),
    #[error("Task {0} is already being timed")]
    AlreadyTiming(TaskId),
    #[error("No active session for task {0}")]
    NotTiming(TaskId),
    #[error("Task {0} is already completed")]
    TaskCompleted(TaskId),
    #[error("Task {0} has a request in flight")]
    Busy(TaskId),
}

/// Identifies one issued load; only the newest may overwrite the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Issued by `begin` for an accepted mutation
///
/// Carries the session epoch so a completion that arrives after `reset` can
/// no longer touch the timing set or the collection of the next session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationTicket {
    epoch: u64,
}

/// What the caller should do after a mutation completes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Followup {
    /// Issue a fresh `load()`
    pub reload: bool,
    /// Close the create-task surface
    pub close_form: bool,
    /// Inline error to show, already normalized for display
    pub error: Option<String>,
}

/// Tasks grouped by last-fetched status
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub pending: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl<'a> Partition<'a> {
    pub fn group(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Pending => &self.pending,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
        }
    }
}

#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    timing: TimingSet,
    /// Epoch each outstanding request was issued in
    in_flight: HashMap<TaskId, u64>,
    creating: Option<u64>,
    generation: u64,
    epoch: u64,
    loading: bool,
    loaded_once: bool,
    last_error: Option<String>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Queries ────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn timing(&self) -> &TimingSet {
        &self.timing
    }

    pub fn is_timing(&self, id: &TaskId) -> bool {
        self.timing.contains(id)
    }

    pub fn is_busy(&self, id: &TaskId) -> bool {
        self.in_flight.contains_key(id)
    }

    pub fn is_creating(&self) -> bool {
        self.creating == Some(self.epoch)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded_once
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Group tasks by server-reported status, preserving fetch order
    pub fn partition(&self) -> Partition<'_> {
        let mut groups = Partition::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => groups.pending.push(task),
                TaskStatus::InProgress => groups.in_progress.push(task),
                TaskStatus::Completed => groups.completed.push(task),
            }
        }
        groups
    }

    // ─── Load ───────────────────────────────────────────────────

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply a load result. Returns false when the ticket was stale.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<Task>, ApiError>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "Dropping stale task list response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "Task list loaded");
                self.tasks = tasks;
                self.loaded_once = true;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Task list load failed");
                self.last_error = Some(e.user_message(GENERIC_FAILURE));
            }
        }
        true
    }

    /// Merge server-reported active sessions into the timing set
    ///
    /// Completed tasks and ids missing from the collection are skipped.
    /// Returns the number of ids added.
    pub fn seed_timing<I>(&mut self, active: I) -> usize
    where
        I: IntoIterator<Item = TaskId>,
    {
        let mut added = 0;
        for id in active {
            let eligible = self.task(&id).is_some_and(|t| !t.is_completed());
            if eligible && self.timing.insert(id) {
                added += 1;
            }
        }
        if added > 0 {
            tracing::info!(added, "Restored active timers from server sessions");
        }
        added
    }

    // ─── Mutations ──────────────────────────────────────────────

    /// Check preconditions and mark the mutation in flight
    pub fn begin(&mut self, mutation: &Mutation) -> Result<MutationTicket, Rejected> {
        let ticket = MutationTicket { epoch: self.epoch };
        let Some(id) = mutation.task_id() else {
            self.creating = Some(self.epoch);
            return Ok(ticket);
        };
        let task = self
            .task(id)
            .ok_or_else(|| Rejected::UnknownTask(id.clone()))?;

        if self.in_flight.contains_key(id) {
            return Err(Rejected::Busy(id.clone()));
        }

        match mutation {
            Mutation::Start(_) if self.timing.contains(id) => {
                return Err(Rejected::AlreadyTiming(id.clone()))
            }
            Mutation::Start(_) | Mutation::Finish(_) | Mutation::Remove(_)
                if task.is_completed() =>
            {
                return Err(Rejected::TaskCompleted(id.clone()))
            }
            Mutation::Stop(_) if !self.timing.contains(id) => {
                return Err(Rejected::NotTiming(id.clone()))
            }
            _ => {}
        }

        self.in_flight.insert(id.clone(), ticket.epoch);
        Ok(ticket)
    }

    /// Apply the outcome of a mutation previously accepted by `begin`
    ///
    /// Results from before the last `reset` only release the in-flight
    /// guard; they change nothing else and ask for nothing.
    pub fn complete(
        &mut self,
        ticket: MutationTicket,
        mutation: &Mutation,
        result: Result<(), ApiError>,
    ) -> Followup {
        let kind = mutation.kind();
        match mutation.task_id() {
            Some(id) => {
                if self.in_flight.get(id) == Some(&ticket.epoch) {
                    self.in_flight.remove(id);
                }
            }
            None => {
                if self.creating == Some(ticket.epoch) {
                    self.creating = None;
                }
            }
        }

        if ticket.epoch != self.epoch {
            tracing::debug!(
                action = kind.verb(),
                stale = ticket.epoch,
                current = self.epoch,
                "Dropping mutation result from a previous session"
            );
            return Followup::default();
        }

        if let Err(e) = result {
            tracing::warn!(action = kind.verb(), error = %e, "Mutation failed");
            return Followup {
                error: Some(e.user_message(kind.fallback_message())),
                ..Default::default()
            };
        }

        tracing::info!(action = kind.verb(), task = ?mutation.task_id(), "Mutation succeeded");
        match mutation {
            Mutation::Start(id) => {
                if self.task(id).is_some() {
                    self.timing.insert(id.clone());
                }
            }
            Mutation::Stop(id) | Mutation::Finish(id) => {
                self.timing.remove(id);
            }
            Mutation::Remove(id) => {
                self.timing.remove(id);
                self.tasks.retain(|t| &t.id != id);
            }
            Mutation::Create(_) => {
                return Followup {
                    reload: true,
                    close_form: true,
                    error: None,
                };
            }
        }

        Followup {
            reload: true,
            ..Default::default()
        }
    }

    /// Forget local state after the credential is dropped
    ///
    /// Requests still on the wire stay marked busy until they come back, so
    /// the same action cannot be sent twice.
    pub fn reset(&mut self) {
        // Keep counting so responses issued before the reset stay stale
        *self = Self {
            in_flight: std::mem::take(&mut self.in_flight),
            generation: self.generation + 1,
            epoch: self.epoch + 1,
            ..Self::default()
        };
    }
}
