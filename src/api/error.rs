//! API error taxonomy
//!
//! Every call through the API client resolves to `Result<T, ApiError>`, so
//! call sites match on a tag instead of probing error shapes.

use thiserror::Error;

/// Message shown when nothing more specific can be extracted
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// Server rejected the stored credential (handled globally)
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Response arrived but reported a non-success status field
    #[error("{message}")]
    Application { message: String },

    /// Non-2xx response (not found, conflict, validation, server errors)
    #[error("Request failed with status {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build from a non-success HTTP status and its raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            message: extract_message(body),
        }
    }

    /// Transport failures and 5xx responses are worth one more read attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Best human-readable string for inline display
    ///
    /// Prefers the server's own words (structured `message`/`detail`), then
    /// the error text, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(m), ..
            } => m.clone(),
            Self::Application { message } if !message.trim().is_empty() => message.clone(),
            Self::Application { .. } | Self::Decode(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Pull a message out of a JSON error body
///
/// Understands `{"message": ".."}`, `{"detail": ".."}` and the list form
/// `{"detail": [{"msg": ".."}]}`. A short plain-text body is used verbatim.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        // Plain text bodies; skip HTML error pages
        return (trimmed.len() <= 200 && !trimmed.starts_with('<')).then(|| trimmed.to_string());
    };

    if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
        if !msg.is_empty() {
            return Some(msg.to_string());
        }
    }

    match value.get("detail") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => value.as_str().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_wins_over_detail() {
        let body = r#"{"message": "Email already exists", "detail": "ignored"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Email already exists"));
    }

    #[test]
    fn detail_string_and_list_forms() {
        assert_eq!(
            extract_message(r#"{"detail": "Task not found"}"#).as_deref(),
            Some("Task not found")
        );
        let list = r#"{"detail": [{"loc": ["body", "email"], "msg": "field required"}]}"#;
        assert_eq!(extract_message(list).as_deref(), Some("field required"));
    }

    #[test]
    fn plain_text_and_html_bodies() {
        assert_eq!(extract_message("Bad gateway").as_deref(), Some("Bad gateway"));
        assert_eq!(extract_message("<html><body>502</body></html>"), None);
        assert_eq!(extract_message("   "), None);
    }

    #[test]
    fn user_message_falls_back_in_order() {
        let with_body = ApiError::from_status(409, r#"{"detail": "Timer already running"}"#);
        assert_eq!(with_body.user_message("fallback"), "Timer already running");

        let bare = ApiError::from_status(404, "");
        assert_eq!(bare.user_message("fallback"), "Request failed with status 404");

        let app = ApiError::Application {
            message: String::new(),
        };
        assert_eq!(app.user_message("Failed to create task"), "Failed to create task");
    }

    #[test]
    fn transient_classification() {
        assert!(ApiError::Transport("reset".into()).is_transient());
        assert!(ApiError::from_status(503, "").is_transient());
        assert!(!ApiError::from_status(404, "").is_transient());
        assert!(!ApiError::Unauthorized.is_transient());
    }
}
