// Wire models for the time-tracking API
//
// These structs map to the JSON bodies the tracker service sends and accepts.
// Only the fields the client uses are modelled; serde ignores the rest, which
// keeps us tolerant of additive API changes.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a task (or any other server record)
///
/// The service sends string ids, but some deployments emit integers, so both
/// are accepted on input. Always serialized back as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TaskId(s),
            RawId::Number(n) => TaskId(n.to_string()),
        })
    }
}

/// Task lifecycle status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Pending", alias = "PENDING")]
    Pending,
    #[serde(rename = "In Progress", alias = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "Completed", alias = "COMPLETED", alias = "DONE")]
    Completed,
}

impl TaskStatus {
    /// Display order used for task groups and chart segments
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A task owned by the remote service; the client only caches it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_task_name: String,
    #[serde(default)]
    pub planned_start_date: Option<String>,
    #[serde(default)]
    pub planned_end_date: Option<String>,
    #[serde(default)]
    pub estimated_effort_min: Option<u32>,
    pub status: TaskStatus,
    #[serde(default)]
    pub user_id: Option<TaskId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn planned_start(&self) -> Option<NaiveDate> {
        self.planned_start_date.as_deref().and_then(parse_day)
    }

    pub fn planned_end(&self) -> Option<NaiveDate> {
        self.planned_end_date.as_deref().and_then(parse_day)
    }
}

/// Parse the date part of either `2024-01-15` or `2024-01-15T09:30:00`
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// One timed session against a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSession {
    pub id: TaskId,
    pub task_id: TaskId,
    #[serde(default)]
    pub user_id: Option<TaskId>,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration_sec: Option<u64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TimeSession {
    /// A session without an end time is still running server-side
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<TaskId>,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.username.clone().unwrap_or_else(|| self.email.clone()),
        }
    }
}

/// Task row inside the day summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTask {
    pub id: TaskId,
    pub user_task_name: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub time_spent_seconds: u64,
}

/// Three-way status distribution used for the summary chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistribution {
    #[serde(rename = "PENDING", default)]
    pub pending: u32,
    #[serde(rename = "IN_PROGRESS", default)]
    pub in_progress: u32,
    #[serde(rename = "COMPLETED", alias = "DONE", default)]
    pub completed: u32,
}

impl StatusDistribution {
    pub fn count(&self, status: TaskStatus) -> u32 {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }

    pub fn total(&self) -> u32 {
        self.pending + self.in_progress + self.completed
    }
}

/// Aggregated snapshot for the current day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(default)]
    pub total_time_tracked: String,
    #[serde(default)]
    pub total_time_tracked_seconds: u64,
    #[serde(default)]
    pub completed_tasks_count: u32,
    #[serde(default)]
    pub tasks_worked_on_count: u32,
    #[serde(default)]
    pub tasks_worked_on: Vec<SummaryTask>,
    #[serde(default)]
    pub completed_tasks: Vec<SummaryTask>,
    #[serde(default)]
    pub in_progress_tasks: Vec<SummaryTask>,
    #[serde(default)]
    pub pending_tasks: Vec<SummaryTask>,
    #[serde(default)]
    pub task_status_chart: StatusDistribution,
}

/// Body for `POST /tasks`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub user_task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_effort_min: Option<u32>,
}

/// Partial body for `PUT /tasks/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_effort_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Body for `POST /auth/signup`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Envelope carrying `{status, message}` used by signup and the day summary
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> StatusEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Envelope carrying only `{data}` (task list)
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_accepts_numeric_ids_and_spaced_status() {
        let json = r#"{"id": 7, "user_task_name": "Write report", "status": "In Progress"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId::from(7));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.planned_start().is_none());
    }

    #[test]
    fn summary_statuses_accept_screaming_case() {
        let json = r#"{"id": "a", "user_task_name": "x", "status": "DONE", "time_spent_seconds": 90}"#;
        let row: SummaryTask = serde_json::from_str(json).unwrap();
        assert_eq!(row.status, Some(TaskStatus::Completed));
    }

    #[test]
    fn distribution_accepts_done_alias() {
        let dist: StatusDistribution =
            serde_json::from_str(r#"{"PENDING": 2, "IN_PROGRESS": 1, "DONE": 4}"#).unwrap();
        assert_eq!(dist.completed, 4);
        assert_eq!(dist.total(), 7);
    }

    #[test]
    fn planned_dates_parse_from_datetime_strings() {
        let json = r#"{
            "id": "t1",
            "user_task_name": "Plan",
            "status": "Pending",
            "planned_start_date": "2025-03-01T09:00:00",
            "planned_end_date": "2025-03-04"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.planned_start(), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(task.planned_end(), NaiveDate::from_ymd_opt(2025, 3, 4));
    }

    #[test]
    fn new_task_omits_unset_fields() {
        let body = NewTask {
            user_task_name: "Inbox zero".to_string(),
            planned_start_date: None,
            planned_end_date: NaiveDate::from_ymd_opt(2025, 5, 2),
            estimated_effort_min: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"user_task_name": "Inbox zero", "planned_end_date": "2025-05-02"})
        );
    }

    #[test]
    fn status_update_serializes_wire_label() {
        let value = serde_json::to_value(TaskUpdate::status(TaskStatus::Completed)).unwrap();
        assert_eq!(value, serde_json::json!({"status": "Completed"}));
    }
}
