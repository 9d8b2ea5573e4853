//! Form checks run before anything is sent to the backend.
//!
//! Every validator returns a map from field name to message. An empty map
//! means the input can be submitted.

use regex::Regex;
use reqwest::Url;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::IssueStatus;

pub type FieldErrors = BTreeMap<&'static str, String>;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", summarize(.0))]
pub struct ValidationError(pub FieldErrors);

impl ValidationError {
    pub fn check(errors: FieldErrors) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(errors))
        }
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.is_empty() {
        errors.insert("email", "Email is required".to_string());
    } else if !is_valid_email(email) {
        errors.insert("email", "Email address is not valid".to_string());
    }
}

fn check_image_url(errors: &mut FieldErrors, image_url: Option<&str>) {
    let url = match image_url.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return,
    };
    let ok = Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !ok {
        errors.insert("imageUrl", "Image URL must be an http(s) address".to_string());
    }
}

fn check_text(errors: &mut FieldErrors, title: &str, description: &str) {
    if title.trim().is_empty() {
        errors.insert("title", "Title is required".to_string());
    }
    if description.trim().is_empty() {
        errors.insert("description", "Description is required".to_string());
    }
}

pub fn validate_registration(username: &str, email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if username.is_empty() {
        errors.insert("username", "Username is required".to_string());
    } else if username.chars().count() < MIN_USERNAME_CHARS {
        errors.insert(
            "username",
            format!("Username must be at least {} characters", MIN_USERNAME_CHARS),
        );
    }

    check_email(&mut errors, email);

    if password.is_empty() {
        errors.insert("password", "Password is required".to_string());
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.insert(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_CHARS),
        );
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.insert("password", "Password must contain at least one digit".to_string());
    }

    errors
}

/// Sign-in only checks the email shape; password strength is a registration rule.
pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.insert("password", "Password is required".to_string());
    }
    errors
}

/// New issues may not start out closed.
pub fn validate_new_issue(
    title: &str,
    description: &str,
    status: Option<IssueStatus>,
    image_url: Option<&str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, title, description);
    if !matches!(status, Some(IssueStatus::Open) | Some(IssueStatus::InProgress)) {
        errors.insert("issueStatus", "Choose a status: Open or In-progress".to_string());
    }
    check_image_url(&mut errors, image_url);
    errors
}

pub fn validate_issue_edit(title: &str, description: &str, image_url: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, title, description);
    check_image_url(&mut errors, image_url);
    errors
}
