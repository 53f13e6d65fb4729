use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::model::Role;

pub const USERNAME_LEN: (usize, usize) = (3, 50);
pub const PASSWORD_LEN: (usize, usize) = (6, 100);

pub const USERNAME_LEN_MSG: &str = "Username must be between 3 and 50 characters.";
pub const EMAIL_MSG: &str = "Must be a valid email address.";
pub const PASSWORD_LEN_MSG: &str = "Password must be at least 6 characters long.";
pub const ROLE_MSG: &str = "Role must be either admin, manager, or staff.";
pub const USERNAME_TAKEN_MSG: &str = "Username already exists.";
pub const EMAIL_TAKEN_MSG: &str = "Email already exists.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One entry per violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    /// All messages joined into one line for the response envelope.
    pub fn message(&self) -> String {
        join_messages(&self.errors)
    }

    #[cfg(test)]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Raw, user-editable fields for a new account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Raw fields for an update. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChangesInput {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Output of [`validate_new_user`]. Password is still plaintext here.
#[derive(Debug, Clone)]
pub struct ValidNewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct ValidChanges {
    pub role: Option<Role>,
    pub password: Option<String>,
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn within(value: &str, (min, max): (usize, usize)) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if !within(password, PASSWORD_LEN) {
        errors.push(FieldError {
            field: "password",
            message: PASSWORD_LEN_MSG.into(),
        });
    }
}

fn check_role(role: Option<&str>, errors: &mut Vec<FieldError>) -> Option<Role> {
    let raw = role?;
    match raw.parse::<Role>() {
        Ok(r) => Some(r),
        Err(_) => {
            errors.push(FieldError {
                field: "role",
                message: ROLE_MSG.into(),
            });
            None
        }
    }
}

pub fn validate_new_user(input: NewUserInput) -> Result<ValidNewUser, ValidationError> {
    let mut errors = Vec::new();

    let username = input.username.trim().to_string();
    if !within(&username, USERNAME_LEN) {
        errors.push(FieldError {
            field: "username",
            message: USERNAME_LEN_MSG.into(),
        });
    }

    let email = input.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        errors.push(FieldError {
            field: "email",
            message: EMAIL_MSG.into(),
        });
    }

    check_password(&input.password, &mut errors);
    let role = check_role(input.role.as_deref(), &mut errors).unwrap_or_default();

    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }
    Ok(ValidNewUser {
        username,
        email,
        password: input.password,
        role,
    })
}

pub fn validate_changes(input: UserChangesInput) -> Result<ValidChanges, ValidationError> {
    let mut errors = Vec::new();
    if let Some(password) = input.password.as_deref() {
        check_password(password, &mut errors);
    }
    let role = check_role(input.role.as_deref(), &mut errors);

    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }
    Ok(ValidChanges {
        role,
        password: input.password,
    })
}
