/// Input validation for request payloads
///
/// Every payload is checked field by field and all failures are reported
/// together as a map of field name to a human-readable message. An empty map
/// means the payload is valid.
///
/// Payload structs use `#[serde(default)]` so that a missing JSON field shows
/// up here as "required" rather than as a decode failure.
///
/// # Rules
///
/// | Payload  | Field    | Rule                                      |
/// |----------|----------|-------------------------------------------|
/// | Todo     | title    | required, at most 255 characters          |
/// | Todo     | priority | exactly `low`, `medium` or `high`         |
/// | Register | username | required, 3 to 50 characters              |
/// | Register | email    | required, `local@domain.tld` shape        |
/// | Register | password | required, at least 6 characters           |
/// | Login    | email    | required, `local@domain.tld` shape        |
/// | Login    | password | required                                  |

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::models::todo::{Priority, TodoFields};

/// Field name → error message
pub type FieldErrors = BTreeMap<String, String>;

pub const TITLE_MAX_CHARS: usize = 255;
pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Todo create/update payload
///
/// Any `id` or `user_id` in the request body is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TodoPayload {
    #[validate(custom(function = "check_title"))]
    pub title: String,

    pub completed: bool,

    #[validate(custom(function = "check_priority"))]
    pub priority: String,
}

impl TodoPayload {
    /// Validates the payload and converts it into typed todo fields
    pub fn into_fields(self) -> Result<TodoFields, FieldErrors> {
        let errors = validate_todo(&self);
        if !errors.is_empty() {
            return Err(errors);
        }

        let priority = self.priority.parse::<Priority>().map_err(|()| {
            FieldErrors::from([("priority".to_string(), PRIORITY_MESSAGE.to_string())])
        })?;

        Ok(TodoFields {
            title: self.title,
            completed: self.completed,
            priority,
        })
    }
}

/// Registration payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterPayload {
    #[validate(custom(function = "check_username"))]
    pub username: String,

    #[validate(custom(function = "check_email"))]
    pub email: String,

    #[validate(custom(function = "check_new_password"))]
    pub password: String,
}

/// Login payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginPayload {
    #[validate(custom(function = "check_email"))]
    pub email: String,

    #[validate(custom(function = "check_password_present"))]
    pub password: String,
}

/// Validates a todo payload
pub fn validate_todo(payload: &TodoPayload) -> FieldErrors {
    collect(payload.validate())
}

/// Validates a registration payload
pub fn validate_register(payload: &RegisterPayload) -> FieldErrors {
    collect(payload.validate())
}

/// Validates a login payload
pub fn validate_login(payload: &LoginPayload) -> FieldErrors {
    collect(payload.validate())
}

/// Checks the `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }

    match email.rsplit_once('@') {
        Some((_, domain)) => {
            let labels: Vec<&str> = domain.split('.').collect();
            labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
        }
        None => false,
    }
}

const PRIORITY_MESSAGE: &str = "Priority must be low, medium, or high";

fn collect(result: Result<(), ValidationErrors>) -> FieldErrors {
    let Err(errors) = result else {
        return FieldErrors::new();
    };

    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errors)| {
            errors.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(invalid("required", "Title is required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(invalid("length", "Title must be at most 255 characters"));
    }
    Ok(())
}

fn check_priority(priority: &str) -> Result<(), ValidationError> {
    match priority.parse::<Priority>() {
        Ok(_) => Ok(()),
        Err(()) => Err(invalid("priority", PRIORITY_MESSAGE)),
    }
}

fn check_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(invalid("required", "Username is required"));
    }
    let len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(invalid(
            "length",
            "Username must be between 3 and 50 characters",
        ));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(invalid("required", "Email is required"));
    }
    if email.chars().count() > EMAIL_MAX_CHARS {
        return Err(invalid("length", "Email must be at most 100 characters"));
    }
    if !is_valid_email(email) {
        return Err(invalid("email", "Invalid email format"));
    }
    Ok(())
}

fn check_new_password(password: &str) -> Result<(), ValidationError> {
    check_password_present(password)?;
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(invalid(
            "length",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

fn check_password_present(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    Ok(())
}
