//! Client side of the headless-CMS backend.

pub mod envelope;
pub mod http;
pub mod query;

use serde::Deserialize;
use std::fmt;

use crate::models::{Filter, Issue, IssueDraft, IssuePatch, User};

pub use http::HttpClient;

/// The backend call a failure belongs to; picks the fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Vote,
    Delete,
    Login,
    Register,
}

impl Operation {
    /// Shown when the server reported an error without a message.
    pub fn server_fallback(&self) -> &'static str {
        match self {
            Operation::Login => "Incorrect email or password",
            Operation::Register => "Could not create the account",
            Operation::Update => "Could not update the issue",
            Operation::Delete => "Unexpected response from the server",
            _ => "Something went wrong",
        }
    }

    /// Shown when the request never completed.
    pub fn network_message(&self) -> &'static str {
        match self {
            Operation::List => "Failed to load issues",
            Operation::Get => "Failed to load the issue",
            Operation::Create => "Failed to add the issue",
            Operation::Update => "Failed to update the issue",
            Operation::Vote => "Failed to record the vote",
            Operation::Delete => "Failed to delete the issue",
            Operation::Login => "Sign-in failed",
            Operation::Register => "Registration failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Vote => "vote",
            Operation::Delete => "delete",
            Operation::Login => "login",
            Operation::Register => "register",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with an error payload or a non-success status.
    #[error("{message}")]
    Server { status: Option<u16>, message: String },

    /// The request did not complete. The cause is logged, not surfaced.
    #[error("{}", .0.network_message())]
    Network(Operation),

    /// The response did not have the expected shape.
    #[error("Unexpected response from the server ({0})")]
    Decode(String),

    #[error("You need to sign in first")]
    Unauthenticated,
}

/// Successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    pub jwt: String,
    pub user: User,
}

/// Issue endpoints. Mutating calls pick up the bearer token themselves.
pub trait IssueApi {
    fn list(&self, filter: Filter, current_user_id: Option<&str>) -> Result<Vec<Issue>, ApiError>;
    fn get(&self, document_id: &str) -> Result<Issue, ApiError>;
    fn create(&self, draft: &IssueDraft) -> Result<Issue, ApiError>;
    fn update(&self, document_id: &str, patch: &IssuePatch) -> Result<Issue, ApiError>;
    fn delete(&self, document_id: &str) -> Result<(), ApiError>;
}

pub trait AuthApi {
    fn login(&self, identifier: &str, password: &str) -> Result<AuthGrant, ApiError>;
    fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthGrant, ApiError>;
}
