//! Await-style driver over `TaskList`
//!
//! Runs each operation to completion inline: precondition check, request,
//! reconciliation, follow-up reload. The CLI uses this directly; the TUI uses
//! `execute` from spawned tasks and applies results itself.

use super::task_list::{Followup, Mutation, Rejected, TaskList};
use crate::api::{ApiError, ApiResult, TrackerApi, GENERIC_FAILURE};
use crate::model::{NewTask, TaskId, TaskStatus, TaskUpdate};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Rejected(#[from] Rejected),
    #[error("{message}")]
    Failed { message: String, source: ApiError },
}

impl ActionError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ActionError::Failed { source, .. } if source.is_unauthorized())
    }
}

/// Issue the request a mutation stands for
pub async fn execute(api: &dyn TrackerApi, mutation: &Mutation) -> ApiResult<()> {
    match mutation {
        Mutation::Start(id) => api.start_timer(id, None).await.map(|_| ()),
        Mutation::Stop(id) => api.stop_timer(id, None).await.map(|_| ()),
        Mutation::Finish(id) => api
            .update_task(id, &TaskUpdate::status(TaskStatus::Completed))
            .await
            .map(|_| ()),
        Mutation::Remove(id) => api.delete_task(id).await,
        Mutation::Create(task) => api.create_task(task).await.map(|_| ()),
    }
}

/// Ids of tasks with a running session on the server
pub async fn active_task_ids(api: &dyn TrackerApi) -> ApiResult<Vec<TaskId>> {
    let sessions = api.list_sessions().await?;
    Ok(sessions
        .into_iter()
        .filter(|s| s.is_active())
        .map(|s| s.task_id)
        .collect())
}

pub struct TaskService {
    api: Arc<dyn TrackerApi>,
    list: TaskList,
    restore_active_timers: bool,
    seeded: bool,
}

impl TaskService {
    pub fn new(api: Arc<dyn TrackerApi>, restore_active_timers: bool) -> Self {
        Self {
            api,
            list: TaskList::new(),
            restore_active_timers,
            seeded: false,
        }
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    /// Fetch the collection; on first success optionally restore timers
    pub async fn load(&mut self) -> ApiResult<()> {
        let ticket = self.list.begin_load();
        let result = self.api.list_tasks().await;
        let failure = result.as_ref().err().cloned();
        self.list.finish_load(ticket, result);
        if let Some(e) = failure {
            return Err(e);
        }

        if self.restore_active_timers && !self.seeded {
            self.seeded = true;
            match active_task_ids(self.api.as_ref()).await {
                Ok(ids) => {
                    self.list.seed_timing(ids);
                }
                Err(e) => tracing::warn!(error = %e, "Could not restore active timers"),
            }
        }
        Ok(())
    }

    pub async fn start_timing(&mut self, id: TaskId) -> Result<(), ActionError> {
        self.run(Mutation::Start(id)).await.map(|_| ())
    }

    pub async fn stop_timing(&mut self, id: TaskId) -> Result<(), ActionError> {
        self.run(Mutation::Stop(id)).await.map(|_| ())
    }

    pub async fn finish(&mut self, id: TaskId) -> Result<(), ActionError> {
        self.run(Mutation::Finish(id)).await.map(|_| ())
    }

    /// Delete a task; confirmation is the caller's responsibility
    pub async fn remove(&mut self, id: TaskId) -> Result<(), ActionError> {
        self.run(Mutation::Remove(id)).await.map(|_| ())
    }

    /// Create a task; the returned followup says whether to close the form
    pub async fn create_task(&mut self, task: NewTask) -> Result<Followup, ActionError> {
        self.run(Mutation::Create(task)).await
    }

    async fn run(&mut self, mutation: Mutation) -> Result<Followup, ActionError> {
        let ticket = self.list.begin(&mutation)?;
        let result = execute(self.api.as_ref(), &mutation).await;
        let failure = result.as_ref().err().cloned();
        let followup = self.list.complete(ticket, &mutation, result);

        if let Some(source) = failure {
            let message = followup
                .error
                .clone()
                .unwrap_or_else(|| source.user_message(GENERIC_FAILURE));
            return Err(ActionError::Failed { message, source });
        }

        if followup.reload {
            if let Err(e) = self.load().await {
                tracing::warn!(error = %e, "Reload after mutation failed");
            }
        }
        Ok(followup)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory `TrackerApi` used by view-model and TUI tests

    use crate::api::{ApiError, ApiResult, TimeSpent, TrackerApi};
    use crate::model::{
        DaySummary, NewTask, Signup, Task, TaskId, TaskStatus, TaskUpdate, TimeSession, User,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeApi {
        pub tasks: Mutex<Vec<Task>>,
        pub sessions: Mutex<Vec<TimeSession>>,
        pub fail_next: Mutex<Option<ApiError>>,
        pub calls: Mutex<Vec<String>>,
        next_id: Mutex<u64>,
    }

    impl FakeApi {
        pub fn with_tasks(tasks: Vec<Task>) -> Self {
            Self {
                tasks: Mutex::new(tasks),
                next_id: Mutex::new(100),
                ..Default::default()
            }
        }

        pub fn fail_next(&self, err: ApiError) {
            *self.fail_next.lock().unwrap() = Some(err);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) -> ApiResult<()> {
            self.calls.lock().unwrap().push(call.to_string());
            match self.fail_next.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        pub fn push_session(&self, id: &TaskId, active: bool) {
            let session = self.session(id, active);
            self.sessions.lock().unwrap().push(session);
        }

        fn session(&self, id: &TaskId, active: bool) -> TimeSession {
            TimeSession {
                id: TaskId::from("s"),
                task_id: id.clone(),
                user_id: None,
                start_time: "2025-01-01T09:00:00".to_string(),
                end_time: (!active).then(|| "2025-01-01T10:00:00".to_string()),
                duration_sec: None,
                notes: None,
                created_at: None,
            }
        }

        fn set_status(&self, id: &TaskId, status: TaskStatus) -> ApiResult<Task> {
            let mut tasks = self.tasks.lock().unwrap();
            let task = tasks
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or(ApiError::Status {
                    status: 404,
                    message: Some("Task not found".to_string()),
                })?;
            task.status = status;
            Ok(task.clone())
        }
    }

    pub fn task(id: u64, status: TaskStatus) -> Task {
        Task {
            id: TaskId::from(id),
            user_task_name: format!("Task {}", id),
            planned_start_date: None,
            planned_end_date: None,
            estimated_effort_min: None,
            status,
            user_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[async_trait]
    impl TrackerApi for FakeApi {
        async fn login(&self, _email: &str, _password: &str) -> ApiResult<String> {
            self.record("login")?;
            Ok("token".to_string())
        }

        async fn signup(&self, _signup: &Signup) -> ApiResult<String> {
            self.record("signup")?;
            Ok("User created successfully!".to_string())
        }

        async fn current_user(&self) -> ApiResult<User> {
            self.record("me")?;
            Ok(User {
                id: None,
                email: "me@example.com".to_string(),
                username: None,
                first_name: None,
                last_name: None,
            })
        }

        async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
            self.record("list_tasks")?;
            Ok(self.tasks.lock().unwrap().clone())
        }

        async fn get_task(&self, id: &TaskId) -> ApiResult<Task> {
            self.record("get_task")?;
            self.tasks
                .lock()
                .unwrap()
                .iter()
                .find(|t| &t.id == id)
                .cloned()
                .ok_or(ApiError::Status {
                    status: 404,
                    message: None,
                })
        }

        async fn create_task(&self, new: &NewTask) -> ApiResult<Task> {
            self.record("create_task")?;
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let mut created = task(*next, TaskStatus::Pending);
            created.user_task_name = new.user_task_name.clone();
            self.tasks.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update_task(&self, id: &TaskId, update: &TaskUpdate) -> ApiResult<Task> {
            self.record("update_task")?;
            self.set_status(id, update.status.unwrap_or(TaskStatus::Pending))
        }

        async fn delete_task(&self, id: &TaskId) -> ApiResult<()> {
            self.record("delete_task")?;
            self.tasks.lock().unwrap().retain(|t| &t.id != id);
            Ok(())
        }

        async fn total_time_spent(&self, _id: &TaskId) -> ApiResult<TimeSpent> {
            self.record("total_time_spent")?;
            Ok(TimeSpent {
                seconds: Some(0),
                display: None,
            })
        }

        async fn start_timer(&self, id: &TaskId, _notes: Option<&str>) -> ApiResult<TimeSession> {
            self.record("start_timer")?;
            self.set_status(id, TaskStatus::InProgress)?;
            let session = self.session(id, true);
            self.sessions.lock().unwrap().push(session.clone());
            Ok(session)
        }

        async fn stop_timer(&self, id: &TaskId, _notes: Option<&str>) -> ApiResult<TimeSession> {
            self.record("stop_timer")?;
            let mut sessions = self.sessions.lock().unwrap();
            for s in sessions.iter_mut().filter(|s| &s.task_id == id) {
                s.end_time = Some("2025-01-01T10:00:00".to_string());
            }
            Ok(self.session(id, false))
        }

        async fn list_sessions(&self) -> ApiResult<Vec<TimeSession>> {
            self.record("list_sessions")?;
            Ok(self.sessions.lock().unwrap().clone())
        }

        async fn day_summary(&self) -> ApiResult<DaySummary> {
            self.record("day_summary")?;
            Ok(DaySummary::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{task, FakeApi};
    use super::*;

    fn service(api: Arc<FakeApi>, restore: bool) -> TaskService {
        TaskService::new(api, restore)
    }

    #[tokio::test]
    async fn start_then_reload_picks_up_server_status() {
        let api = Arc::new(FakeApi::with_tasks(vec![task(1, TaskStatus::Pending)]));
        let mut svc = service(api.clone(), false);
        svc.load().await.unwrap();

        svc.start_timing(TaskId::from(1)).await.unwrap();
        assert!(svc.list().is_timing(&TaskId::from(1)));
        assert_eq!(svc.list().tasks()[0].status, TaskStatus::InProgress);
        assert_eq!(api.calls(), vec!["list_tasks", "start_timer", "list_tasks"]);
    }

    #[tokio::test]
    async fn rejected_action_sends_no_request() {
        let api = Arc::new(FakeApi::with_tasks(vec![task(1, TaskStatus::Completed)]));
        let mut svc = service(api.clone(), false);
        svc.load().await.unwrap();

        let err = svc.remove(TaskId::from(1)).await.unwrap_err();
        assert!(matches!(err, ActionError::Rejected(Rejected::TaskCompleted(_))));
        assert_eq!(api.calls(), vec!["list_tasks"]);
    }

    #[tokio::test]
    async fn failed_stop_reports_message_and_skips_reload() {
        let api = Arc::new(FakeApi::with_tasks(vec![task(1, TaskStatus::Pending)]));
        let mut svc = service(api.clone(), false);
        svc.load().await.unwrap();
        svc.start_timing(TaskId::from(1)).await.unwrap();

        api.fail_next(ApiError::from_status(404, r#"{"detail": "No active session"}"#));
        let err = svc.stop_timing(TaskId::from(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "No active session");
        assert!(svc.list().is_timing(&TaskId::from(1)));
        assert_eq!(api.calls().last().map(String::as_str), Some("stop_timer"));
    }

    #[tokio::test]
    async fn unauthorized_is_surfaced_as_such() {
        let api = Arc::new(FakeApi::with_tasks(vec![task(1, TaskStatus::Pending)]));
        let mut svc = service(api.clone(), false);
        svc.load().await.unwrap();

        api.fail_next(ApiError::Unauthorized);
        let err = svc.finish(TaskId::from(1)).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn first_load_restores_active_timers_once() {
        let api = Arc::new(FakeApi::with_tasks(vec![
            task(1, TaskStatus::InProgress),
            task(2, TaskStatus::Pending),
        ]));
        api.push_session(&TaskId::from(1), true);
        api.push_session(&TaskId::from(2), false);
        let mut svc = service(api.clone(), true);
        svc.load().await.unwrap();
        assert!(svc.list().is_timing(&TaskId::from(1)));
        assert!(!svc.list().is_timing(&TaskId::from(2)));

        svc.load().await.unwrap();
        let listed = api.calls().iter().filter(|c| *c == "list_sessions").count();
        assert_eq!(listed, 1);
    }

    #[tokio::test]
    async fn create_closes_form_and_reloads() {
        let api = Arc::new(FakeApi::with_tasks(vec![]));
        let mut svc = service(api.clone(), false);
        svc.load().await.unwrap();

        let followup = svc
            .create_task(NewTask {
                user_task_name: "Fresh".to_string(),
                planned_start_date: None,
                planned_end_date: None,
                estimated_effort_min: Some(15),
            })
            .await
            .unwrap();
        assert!(followup.close_form);
        assert_eq!(svc.list().tasks().len(), 1);
        assert_eq!(svc.list().tasks()[0].user_task_name, "Fresh");
    }
}
