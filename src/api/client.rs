//! HTTP implementation of `TrackerApi`

use super::{ApiError, ApiResult, TimeSpent, TrackerApi};
use crate::auth::AuthContext;
use crate::model::{
    DataEnvelope, DaySummary, NewTask, Signup, StatusEnvelope, Task, TaskId, TaskUpdate,
    TimeSession, User,
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// Endpoints that issue credentials; they never carry one, and a 401 from
/// them is a wrong password rather than an expired session
const CREDENTIAL_PATHS: [&str; 2] = ["/auth/login", "/auth/signup"];

/// reqwest-backed client for the tracker service
///
/// Injects `Authorization: Bearer <token>` whenever the auth context holds a
/// token. A 401 on an authenticated request invalidates that token, which
/// the TUI observes to force the login screen.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthContext,
    read_retry: bool,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        auth: AuthContext,
        timeout: Duration,
        read_retry: bool,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!(base_url = %base_url, read_retry, "API client initialized");

        Ok(Self {
            http,
            base_url,
            auth,
            read_retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the raw JSON body
    ///
    /// GETs are retried once on transient failure when enabled; mutations
    /// are never retried.
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let attempts = if method == Method::GET && self.read_retry {
            2
        } else {
            1
        };

        let mut last_err = ApiError::Transport("no attempt made".to_string());
        for attempt in 1..=attempts {
            match self.send_once(method.clone(), path, body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!(%method, path, error = %e, "Transient read failure, retrying once");
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }

    async fn send_once(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let token = if CREDENTIAL_PATHS.contains(&path) {
            None
        } else {
            self.auth.token()
        };
        let mut req = self.http.request(method.clone(), self.url(path));
        if let Some(token) = &token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(%method, path, status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            if let Some(sent) = &token {
                self.auth.invalidate_if(sent);
                return Err(ApiError::Unauthorized);
            }
        }
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let value = self.send(Method::GET, path, None).await?;
        decode_lenient(value)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> ApiResult<T> {
        let value = self.send(Method::POST, path, Some(body)).await?;
        decode_lenient(value)
    }
}

/// Decode `T` directly, or from a `{data: T}` wrapper
fn decode_lenient<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => Ok(v),
        Err(direct) => match value {
            Value::Object(mut map) if map.contains_key("data") => {
                let inner = map.remove("data").unwrap_or(Value::Null);
                serde_json::from_value(inner).map_err(|e| ApiError::Decode(e.to_string()))
            }
            _ => Err(ApiError::Decode(direct.to_string())),
        },
    }
}

/// Find the bearer token in a login response
fn extract_token(value: &Value) -> Option<String> {
    const KEYS: [&str; 2] = ["access_token", "token"];
    let lookup = |v: &Value| {
        KEYS.iter()
            .find_map(|k| v.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    };
    lookup(value).or_else(|| value.get("data").and_then(lookup))
}

/// Reject envelopes whose `status` field is present and not "success"
fn require_success<T>(envelope: &StatusEnvelope<T>, fallback: &str) -> ApiResult<()> {
    match envelope.status.as_deref() {
        None | Some("success") => Ok(()),
        Some(_) => Err(ApiError::Application {
            message: envelope
                .message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
        }),
    }
}

#[async_trait]
impl TrackerApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let value = self
            .send(
                Method::POST,
                "/auth/login",
                Some(&json!({ "email": email, "password": password })),
            )
            .await?;
        extract_token(&value)
            .ok_or_else(|| ApiError::Decode("login response carried no access token".to_string()))
    }

    async fn signup(&self, signup: &Signup) -> ApiResult<String> {
        let body = serde_json::to_value(signup).map_err(|e| ApiError::Decode(e.to_string()))?;
        let envelope: StatusEnvelope<Value> = self.post("/auth/signup", &body).await?;
        if !envelope.is_success() {
            return Err(ApiError::Application {
                message: envelope
                    .message
                    .unwrap_or_else(|| "Signup failed. Please try again.".to_string()),
            });
        }
        Ok(envelope
            .message
            .unwrap_or_else(|| "User created successfully!".to_string()))
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.get("/auth/me").await
    }

    async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let envelope: DataEnvelope<Vec<Task>> = self.get("/tasks").await?;
        Ok(envelope.data)
    }

    async fn get_task(&self, id: &TaskId) -> ApiResult<Task> {
        self.get(&format!("/tasks/{}", id)).await
    }

    async fn create_task(&self, task: &NewTask) -> ApiResult<Task> {
        let body = serde_json::to_value(task).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.post("/tasks", &body).await
    }

    async fn update_task(&self, id: &TaskId, update: &TaskUpdate) -> ApiResult<Task> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self
            .send(Method::PUT, &format!("/tasks/{}", id), Some(&body))
            .await?;
        decode_lenient(value)
    }

    async fn delete_task(&self, id: &TaskId) -> ApiResult<()> {
        self.send(Method::DELETE, &format!("/tasks/{}", id), None)
            .await
            .map(|_| ())
    }

    async fn total_time_spent(&self, id: &TaskId) -> ApiResult<TimeSpent> {
        let value = self
            .send(Method::GET, &format!("/tasks/{}/total-time-spent", id), None)
            .await?;
        Ok(TimeSpent::from_value(&value))
    }

    async fn start_timer(&self, id: &TaskId, notes: Option<&str>) -> ApiResult<TimeSession> {
        self.post(
            "/time-sessions/start",
            &json!({ "task_id": id, "notes": notes }),
        )
        .await
    }

    async fn stop_timer(&self, id: &TaskId, notes: Option<&str>) -> ApiResult<TimeSession> {
        self.post(
            "/time-sessions/stop",
            &json!({ "task_id": id, "notes": notes }),
        )
        .await
    }

    async fn list_sessions(&self) -> ApiResult<Vec<TimeSession>> {
        self.get("/time-sessions").await
    }

    async fn day_summary(&self) -> ApiResult<DaySummary> {
        let envelope: StatusEnvelope<DaySummary> = self.get("/cds/current-day-summary").await?;
        require_success(&envelope, "Unexpected API response")?;
        envelope
            .data
            .ok_or_else(|| ApiError::Decode("summary response carried no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthState, CredentialStore};
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serve `router` on an ephemeral port and return its base URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str, token: Option<&str>) -> (tempfile::TempDir, ApiClient) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials"));
        if let Some(token) = token {
            store.save(token).unwrap();
        }
        let auth = AuthContext::probe(store);
        let client = ApiClient::new(base_url, auth, Duration::from_secs(5), true).unwrap();
        (dir, client)
    }

    #[tokio::test]
    async fn injects_bearer_token_and_unwraps_task_list() {
        let router = Router::new().route(
            "/tasks",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth != "Bearer secret" {
                    return (StatusCode::BAD_REQUEST, Json(json!({"detail": auth})));
                }
                (
                    StatusCode::OK,
                    Json(json!({"data": [
                        {"id": 1, "user_task_name": "A", "status": "Pending"},
                        {"id": 2, "user_task_name": "B", "status": "In Progress"}
                    ]})),
                )
            }),
        );
        let base = serve(router).await;
        let (_dir, api) = client(&base, Some("secret"));

        let tasks = api.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].id, TaskId::from(2));
    }

    #[tokio::test]
    async fn unauthorized_clears_stored_credential() {
        let router = Router::new().route(
            "/time-sessions/start",
            post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"detail": "expired"}))) }),
        );
        let base = serve(router).await;
        let (dir, api) = client(&base, Some("stale"));

        let err = api.start_timer(&TaskId::from(1), None).await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
        assert_eq!(api.auth.state(), AuthState::Unauthenticated);
        assert!(!dir.path().join("credentials").exists());
    }

    #[tokio::test]
    async fn login_failure_without_token_reports_server_message() {
        let router = Router::new().route(
            "/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Invalid credentials"})),
                )
            }),
        );
        let base = serve(router).await;
        let (_dir, api) = client(&base, None);

        let err = api.login("a@b.c", "nope").await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "Invalid credentials");
    }

    #[tokio::test]
    async fn failed_relogin_keeps_session_and_reports_server_message() {
        let router = Router::new().route(
            "/auth/login",
            post(|headers: HeaderMap| async move {
                let detail = if headers.contains_key("authorization") {
                    "bearer sent to login"
                } else {
                    "Invalid credentials"
                };
                (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail })))
            }),
        );
        let base = serve(router).await;
        let (dir, api) = client(&base, Some("old"));

        let err = api.login("a@b.c", "nope").await.unwrap_err();
        assert!(!err.is_unauthorized());
        assert_eq!(err.user_message("fallback"), "Invalid credentials");
        assert_eq!(api.auth.token().as_deref(), Some("old"));
        assert!(dir.path().join("credentials").exists());
    }

    #[tokio::test]
    async fn late_rejection_of_old_token_keeps_fresh_login() {
        let router = Router::new().route(
            "/time-sessions/start",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                (StatusCode::UNAUTHORIZED, Json(json!({"detail": "expired"})))
            }),
        );
        let base = serve(router).await;
        let (dir, api) = client(&base, Some("old"));

        let pending = {
            let api = api.clone();
            tokio::spawn(async move { api.start_timer(&TaskId::from(1), None).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        api.auth.login("fresh".to_string()).unwrap();

        let err = pending.await.unwrap().unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
        assert_eq!(api.auth.state(), AuthState::Authenticated);
        assert_eq!(api.auth.token().as_deref(), Some("fresh"));
        let stored = std::fs::read_to_string(dir.path().join("credentials")).unwrap();
        assert_eq!(stored, "fresh");
    }

    #[tokio::test]
    async fn login_extracts_nested_token() {
        let router = Router::new().route(
            "/auth/login",
            post(|| async { Json(json!({"data": {"access_token": "fresh", "token_type": "bearer"}})) }),
        );
        let base = serve(router).await;
        let (_dir, api) = client(&base, None);

        assert_eq!(api.login("a@b.c", "pw").await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn summary_with_error_status_is_application_failure() {
        let router = Router::new().route(
            "/cds/current-day-summary",
            get(|| async { Json(json!({"status": "error", "message": "No data for today"})) }),
        );
        let base = serve(router).await;
        let (_dir, api) = client(&base, Some("t"));

        let err = api.day_summary().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Application {
                message: "No data for today".to_string()
            }
        );
    }

    #[tokio::test]
    async fn reads_retry_once_but_mutations_do_not() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/time-sessions",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                    } else {
                        (StatusCode::OK, Json(json!([])))
                    }
                }),
            )
            .route(
                "/tasks",
                post(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(100, Ordering::SeqCst);
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"message": "down"})))
                }),
            )
            .with_state(hits.clone());
        let base = serve(router).await;
        let (_dir, api) = client(&base, Some("t"));

        assert!(api.list_sessions().await.unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let new_task = NewTask {
            user_task_name: "x".to_string(),
            planned_start_date: None,
            planned_end_date: None,
            estimated_effort_min: None,
        };
        let err = api.create_task(&new_task).await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "down");
        assert_eq!(hits.load(Ordering::SeqCst), 102);
    }

    #[test]
    fn decode_lenient_accepts_bare_and_wrapped() {
        let bare = json!({"id": "s1", "task_id": "t1", "start_time": "2025-01-01T09:00:00"});
        let session: TimeSession = decode_lenient(bare.clone()).unwrap();
        assert!(session.is_active());
        let wrapped: TimeSession = decode_lenient(json!({ "data": bare })).unwrap();
        assert_eq!(wrapped.id, TaskId::from("s1"));
    }
}
