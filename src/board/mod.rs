//! View-models for the task board and the daily summary
//!
//! Nothing in here draws or performs I/O except `service`, which drives the
//! list against a `TrackerApi` for the headless commands.

pub mod card;
pub mod forms;
pub mod service;
pub mod summary;
pub mod task_list;

pub use card::{format_elapsed, Affordances, CardTimers};
pub use forms::{CreateTaskForm, FieldCursor, LoginForm, SignupForm};
pub use service::{active_task_ids, execute, ActionError, TaskService};
pub use summary::{chart_slices, format_time_spent, segment_widths, SummaryView};
pub use task_list::{LoadTicket, Mutation, MutationKind, MutationTicket, TaskList};
