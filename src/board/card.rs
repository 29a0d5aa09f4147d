//! Task card: local elapsed timer and action enablement
//!
//! The card owns no network logic. Its timer state follows the task's
//! membership in the timing set, which the card only observes.

use crate::model::{Task, TaskId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    /// Next instant at which the counter advances
    Timing { next_tick: Instant },
}

/// Per-card elapsed counter driven by timing-set membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTimer {
    state: TimerState,
    elapsed: u64,
}

impl Default for CardTimer {
    fn default() -> Self {
        Self {
            state: TimerState::Idle,
            elapsed: 0,
        }
    }
}

impl CardTimer {
    pub fn is_timing(&self) -> bool {
        matches!(self.state, TimerState::Timing { .. })
    }

    /// Whole seconds counted since the task entered the timing set
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Follow the external timing signal
    ///
    /// Both transitions reset the counter; entering Timing anchors the tick
    /// phase at `now`.
    pub fn sync(&mut self, timing: bool, now: Instant) {
        match (self.state, timing) {
            (TimerState::Idle, true) => {
                self.elapsed = 0;
                self.state = TimerState::Timing {
                    next_tick: now + TICK,
                };
            }
            (TimerState::Timing { .. }, false) => {
                self.elapsed = 0;
                self.state = TimerState::Idle;
            }
            _ => {}
        }
    }

    /// Fire every tick due at or before `now`, one increment per second
    pub fn advance(&mut self, now: Instant) {
        if let TimerState::Timing { mut next_tick } = self.state {
            while next_tick <= now {
                self.elapsed += 1;
                next_tick += TICK;
            }
            self.state = TimerState::Timing { next_tick };
        }
    }

    pub fn display(&self) -> String {
        format_elapsed(self.elapsed())
    }
}

/// Render seconds as `M:SS` below an hour and `H:MM:SS` from then on
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Timers for every visible card, reconciled against the timing set
#[derive(Debug, Default)]
pub struct CardTimers {
    timers: HashMap<TaskId, CardTimer>,
}

impl CardTimers {
    /// Bring every card in line with the timing set and advance its ticks
    ///
    /// Cards for tasks no longer present are dropped.
    pub fn reconcile<'a, I>(&mut self, tasks: I, is_timing: impl Fn(&TaskId) -> bool, now: Instant)
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut seen = HashMap::with_capacity(self.timers.len());
        for task in tasks {
            let mut timer = self.timers.remove(&task.id).unwrap_or_default();
            timer.sync(is_timing(&task.id), now);
            timer.advance(now);
            seen.insert(task.id.clone(), timer);
        }
        self.timers = seen;
    }

    pub fn get(&self, id: &TaskId) -> CardTimer {
        self.timers.get(id).copied().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

/// Which card actions are offered right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub start: bool,
    pub stop: bool,
    /// Finish is hidden rather than disabled for completed tasks
    pub finish_visible: bool,
    pub finish: bool,
    pub delete: bool,
}

impl Affordances {
    pub fn for_card(task: &Task, timing: bool, busy: bool) -> Self {
        let completed = task.is_completed();
        let open = !completed && !busy;
        Self {
            start: open && !timing,
            stop: open && timing,
            finish_visible: !completed,
            finish: open,
            delete: open,
        }
    }
}
