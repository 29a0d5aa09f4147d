//! Form state and client-side validation
//!
//! Validation failures never reach the network: `validate()` either yields
//! a request body or a `FormError` to show inline.

use crate::model::{NewTask, Signup};
use chrono::NaiveDate;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Task name is required")]
    MissingTaskName,
    #[error("{field} must be a date like 2025-01-31")]
    InvalidDate { field: &'static str },
    #[error("Estimated effort must be a whole number of minutes, at least 1")]
    InvalidEffort,
    #[error("Email is required")]
    MissingEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("First name and last name are required")]
    MissingName,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
}

/// Text input focus cursor shared by the multi-field forms
pub trait FieldCursor {
    const FIELD_COUNT: usize;

    fn focus(&self) -> usize;
    fn set_focus(&mut self, index: usize);
    fn field_mut(&mut self, index: usize) -> &mut String;

    fn next_field(&mut self) {
        self.set_focus((self.focus() + 1) % Self::FIELD_COUNT);
    }

    fn prev_field(&mut self) {
        self.set_focus((self.focus() + Self::FIELD_COUNT - 1) % Self::FIELD_COUNT);
    }

    fn push_char(&mut self, c: char) {
        let index = self.focus();
        self.field_mut(index).push(c);
    }

    fn pop_char(&mut self) {
        let index = self.focus();
        self.field_mut(index).pop();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Create task
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CreateTaskForm {
    pub name: String,
    pub planned_start: String,
    pub planned_end: String,
    pub effort_minutes: String,
    pub focus: usize,
    pub error: Option<String>,
}

impl CreateTaskForm {
    pub const LABELS: [&'static str; 4] = [
        "Task name *",
        "Planned start (YYYY-MM-DD)",
        "Planned end (YYYY-MM-DD)",
        "Estimated effort (minutes)",
    ];

    pub fn values(&self) -> [&str; 4] {
        [
            &self.name,
            &self.planned_start,
            &self.planned_end,
            &self.effort_minutes,
        ]
    }

    pub fn validate(&self) -> Result<NewTask, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingTaskName);
        }

        Ok(NewTask {
            user_task_name: name.to_string(),
            planned_start_date: parse_optional_date(&self.planned_start, "Planned start")?,
            planned_end_date: parse_optional_date(&self.planned_end, "Planned end")?,
            estimated_effort_min: parse_effort(&self.effort_minutes)?,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl FieldCursor for CreateTaskForm {
    const FIELD_COUNT: usize = 4;

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, index: usize) {
        self.focus = index;
    }

    fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.name,
            1 => &mut self.planned_start,
            2 => &mut self.planned_end,
            _ => &mut self.effort_minutes,
        }
    }
}

fn parse_optional_date(raw: &str, field: &'static str) -> Result<Option<NaiveDate>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| FormError::InvalidDate { field })
}

/// Effort is optional, but when given must be an integer of at least one minute
pub fn parse_effort(raw: &str) -> Result<Option<u32>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).map(Some).map_err(|_| FormError::InvalidEffort),
        _ => Err(FormError::InvalidEffort),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: usize,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(String, String), FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        if self.password.is_empty() {
            return Err(FormError::MissingPassword);
        }
        Ok((email.to_string(), self.password.clone()))
    }
}

impl FieldCursor for LoginForm {
    const FIELD_COUNT: usize = 2;

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, index: usize) {
        self.focus = index;
    }

    fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.email,
            _ => &mut self.password,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Signup
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
    pub focus: usize,
}

impl SignupForm {
    pub const LABELS: [&'static str; 5] = [
        "Email *",
        "First name *",
        "Last name *",
        "Password *",
        "Confirm password *",
    ];

    pub fn validate(&self) -> Result<Signup, FormError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if self.email.trim().is_empty() {
            return Err(FormError::MissingEmail);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort);
        }

        Ok(Signup {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        })
    }

    /// Password fields are masked when rendered
    pub fn is_secret(index: usize) -> bool {
        index >= 3
    }

    pub fn values(&self) -> [&str; 5] {
        [
            &self.email,
            &self.first_name,
            &self.last_name,
            &self.password,
            &self.confirm_password,
        ]
    }
}

impl FieldCursor for SignupForm {
    const FIELD_COUNT: usize = 5;

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, index: usize) {
        self.focus = index;
    }

    fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.email,
            1 => &mut self.first_name,
            2 => &mut self.last_name,
            3 => &mut self.password,
            _ => &mut self.confirm_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, effort: &str) -> CreateTaskForm {
        CreateTaskForm {
            name: name.to_string(),
            effort_minutes: effort.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_or_blank_name_is_rejected() {
        assert_eq!(form("", "").validate(), Err(FormError::MissingTaskName));
        assert_eq!(form("   ", "").validate(), Err(FormError::MissingTaskName));
    }

    #[test]
    fn effort_must_be_at_least_one() {
        assert_eq!(form("x", "0").validate(), Err(FormError::InvalidEffort));
        assert_eq!(form("x", "-5").validate(), Err(FormError::InvalidEffort));
        assert_eq!(form("x", "1.5").validate(), Err(FormError::InvalidEffort));
        assert_eq!(form("x", "1").validate().unwrap().estimated_effort_min, Some(1));
        assert_eq!(form("x", "").validate().unwrap().estimated_effort_min, None);
    }

    #[test]
    fn valid_submission_trims_and_parses_dates() {
        let mut f = form("  Write docs ", "90");
        f.planned_start = "2025-02-01".to_string();
        let task = f.validate().unwrap();
        assert_eq!(task.user_task_name, "Write docs");
        assert_eq!(task.planned_start_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(task.planned_end_date, None);
    }

    #[test]
    fn malformed_date_names_the_field() {
        let mut f = form("x", "");
        f.planned_end = "tomorrow".to_string();
        assert_eq!(
            f.validate(),
            Err(FormError::InvalidDate {
                field: "Planned end"
            })
        );
    }

    #[test]
    fn signup_rules_apply_in_order() {
        let mut f = SignupForm {
            email: "a@b.c".to_string(),
            first_name: "Ada".to_string(),
            last_name: " ".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            focus: 0,
        };
        assert_eq!(f.validate(), Err(FormError::MissingName));

        f.last_name = "Lovelace".to_string();
        f.confirm_password = "secret2".to_string();
        assert_eq!(f.validate(), Err(FormError::PasswordMismatch));

        f.password = "abc".to_string();
        f.confirm_password = "abc".to_string();
        assert_eq!(f.validate(), Err(FormError::PasswordTooShort));

        f.password = "abcdef".to_string();
        f.confirm_password = "abcdef".to_string();
        assert_eq!(f.validate().unwrap().last_name, "Lovelace");
    }

    #[test]
    fn login_requires_both_fields() {
        let mut f = LoginForm::default();
        assert_eq!(f.validate(), Err(FormError::MissingEmail));
        f.email = "a@b.c".to_string();
        assert_eq!(f.validate(), Err(FormError::MissingPassword));
        f.password = "pw".to_string();
        assert!(f.validate().is_ok());
    }

    #[test]
    fn cursor_wraps_in_both_directions() {
        let mut f = CreateTaskForm::default();
        f.prev_field();
        assert_eq!(f.focus, 3);
        f.next_field();
        assert_eq!(f.focus, 0);
        f.push_char('a');
        f.push_char('b');
        f.pop_char();
        assert_eq!(f.name, "a");
    }
}
