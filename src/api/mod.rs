// API gateway - outbound calls to the time-tracking service
//
// `TrackerApi` is the seam between view state and the network: the view-models
// and CLI only see this trait, the HTTP implementation lives in `client`, and
// tests substitute an in-memory fake.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{extract_message, ApiError, ApiResult, GENERIC_FAILURE};

use crate::model::{DaySummary, NewTask, Signup, Task, TaskId, TaskUpdate, TimeSession, User};
use async_trait::async_trait;
use serde_json::Value;

/// Operations offered by the remote service
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// `POST /auth/login`, returns the bearer token
    async fn login(&self, email: &str, password: &str) -> ApiResult<String>;

    /// `POST /auth/signup`, returns the server's confirmation message
    async fn signup(&self, signup: &Signup) -> ApiResult<String>;

    /// `GET /auth/me`
    async fn current_user(&self) -> ApiResult<User>;

    /// `GET /tasks`
    async fn list_tasks(&self) -> ApiResult<Vec<Task>>;

    /// `GET /tasks/{id}`
    async fn get_task(&self, id: &TaskId) -> ApiResult<Task>;

    /// `POST /tasks`
    async fn create_task(&self, task: &NewTask) -> ApiResult<Task>;

    /// `PUT /tasks/{id}`
    async fn update_task(&self, id: &TaskId, update: &TaskUpdate) -> ApiResult<Task>;

    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, id: &TaskId) -> ApiResult<()>;

    /// `GET /tasks/{id}/total-time-spent`
    async fn total_time_spent(&self, id: &TaskId) -> ApiResult<TimeSpent>;

    /// `POST /time-sessions/start`
    async fn start_timer(&self, id: &TaskId, notes: Option<&str>) -> ApiResult<TimeSession>;

    /// `POST /time-sessions/stop`
    async fn stop_timer(&self, id: &TaskId, notes: Option<&str>) -> ApiResult<TimeSession>;

    /// `GET /time-sessions`
    async fn list_sessions(&self) -> ApiResult<Vec<TimeSession>>;

    /// `GET /cds/current-day-summary`
    async fn day_summary(&self) -> ApiResult<DaySummary>;
}

/// Total time recorded against one task
///
/// The endpoint's shape is loosely specified; seconds and a preformatted
/// string are picked up from whichever keys are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSpent {
    pub seconds: Option<u64>,
    pub display: Option<String>,
}

impl TimeSpent {
    const SECONDS_KEYS: [&'static str; 5] = [
        "total_time_spent_seconds",
        "total_seconds",
        "time_spent_seconds",
        "duration_sec",
        "seconds",
    ];
    const DISPLAY_KEYS: [&'static str; 3] = ["total_time_spent", "formatted", "duration"];

    pub fn from_value(value: &Value) -> Self {
        let value = value.get("data").unwrap_or(value);
        match value {
            Value::Number(n) => Self {
                seconds: n.as_f64().map(|s| s.max(0.0) as u64),
                display: None,
            },
            Value::String(s) => Self {
                seconds: None,
                display: Some(s.clone()),
            },
            Value::Object(map) => Self {
                seconds: Self::SECONDS_KEYS
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_f64))
                    .map(|s| s.max(0.0) as u64),
                display: Self::DISPLAY_KEYS
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str))
                    .map(str::to_string),
            },
            _ => Self::default(),
        }
    }

    /// Server-formatted string when present, else `Xh Ym` from seconds
    pub fn render(&self) -> String {
        match (&self.display, self.seconds) {
            (Some(display), _) => display.clone(),
            (None, Some(secs)) => crate::board::format_time_spent(secs),
            (None, None) => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn time_spent_from_various_shapes() {
        assert_eq!(TimeSpent::from_value(&json!(125)).seconds, Some(125));
        let wrapped = TimeSpent::from_value(&json!({
            "data": {"total_time_spent_seconds": 3600, "total_time_spent": "1h 0m"}
        }));
        assert_eq!(wrapped.seconds, Some(3600));
        assert_eq!(wrapped.display.as_deref(), Some("1h 0m"));
        assert_eq!(TimeSpent::from_value(&json!(null)), TimeSpent::default());
        assert_eq!(TimeSpent::from_value(&json!(3_660)).render(), "1h 1m");
        assert_eq!(TimeSpent::default().render(), "-");
    }
}
