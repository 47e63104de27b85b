//! Input validation for auth API requests.
//!
//! This module checks raw request payloads against the signup and signin
//! schemas and produces either parsed data or field-level errors.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::api::error::{ApiError, ValidationErrorBuilder};
use crate::auth::{NewUser, DEFAULT_ROLE};
use crate::db::{SigninRequest, SignupRequest};

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();
}

/// Valid role values
const VALID_ROLES: [&str; 2] = ["user", "admin"];

/// Parsed signin credentials
#[derive(Debug)]
pub struct SigninCredentials {
    pub email: String,
    pub password: String,
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() < 2 {
        return Err("Name is too short (min 2 characters)".to_string());
    }

    if name.len() > 255 {
        return Err("Name is too long (max 255 characters)".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 255 {
        return Err("Email is too long (max 255 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password is too short (min 8 characters)".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a role value
pub fn validate_role(role: &str) -> Result<(), String> {
    if !VALID_ROLES.contains(&role) {
        return Err(format!(
            "Invalid role. Must be one of: {}",
            VALID_ROLES.join(", ")
        ));
    }
    Ok(())
}

/// Check a signup payload against the creation schema.
///
/// Returns parsed data for the credential service, or a 400 ApiError
/// carrying every field error found.
pub fn validate_signup(req: &SignupRequest) -> Result<NewUser, ApiError> {
    let mut builder = ValidationErrorBuilder::new();

    match req.name.as_deref() {
        Some(name) => {
            if let Err(msg) = validate_name(name) {
                builder.add("name", msg);
            }
        }
        None => {
            builder.add("name", "Name is required");
        }
    }

    match req.email.as_deref() {
        Some(email) => {
            if let Err(msg) = validate_email(email) {
                builder.add("email", msg);
            }
        }
        None => {
            builder.add("email", "Email is required");
        }
    }

    match req.password.as_deref() {
        Some(password) => {
            if let Err(msg) = validate_password(password) {
                builder.add("password", msg);
            }
        }
        None => {
            builder.add("password", "Password is required");
        }
    }

    if let Some(role) = req.role.as_deref() {
        if let Err(msg) = validate_role(role) {
            builder.add("role", msg);
        }
    }

    builder.finish()?;

    // All required fields are present once finish() passes
    Ok(NewUser {
        name: req.name.as_deref().unwrap_or_default().trim().to_string(),
        email: normalize_email(req.email.as_deref().unwrap_or_default()),
        password: req.password.clone().unwrap_or_default(),
        role: req
            .role
            .clone()
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
    })
}

/// Check a signin payload against the sign-in schema.
pub fn validate_signin(req: &SigninRequest) -> Result<SigninCredentials, ApiError> {
    let mut builder = ValidationErrorBuilder::new();

    match req.email.as_deref() {
        Some(email) => {
            if let Err(msg) = validate_email(email) {
                builder.add("email", msg);
            }
        }
        None => {
            builder.add("email", "Email is required");
        }
    }

    match req.password.as_deref() {
        Some(password) => {
            if password.is_empty() {
                builder.add("password", "Password is required");
            }
        }
        None => {
            builder.add("password", "Password is required");
        }
    }

    builder.finish()?;

    Ok(SigninCredentials {
        email: normalize_email(req.email.as_deref().unwrap_or_default()),
        password: req.password.clone().unwrap_or_default(),
    })
}

/// Emails are matched case-insensitively; store and look up in lowercase
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
