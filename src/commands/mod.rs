pub mod create;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod login;
pub mod logout;
pub mod register;
pub mod show;
pub mod theme;
pub mod vote;
pub mod votes;
pub mod whoami;

use anyhow::{bail, Result};

use crate::api::{ApiError, IssueApi};
use crate::models::{Issue, User};
use crate::session::SessionStore;

/// The signed-in user, or `ApiError::Unauthenticated`.
pub(crate) fn require_user(session: &SessionStore) -> Result<User> {
    match session.current_user()? {
        Some(user) => Ok(user),
        None => Err(ApiError::Unauthenticated.into()),
    }
}

pub(crate) fn refuse_if_signed_in(session: &SessionStore) -> Result<()> {
    if let Some(user) = session.current_user()? {
        bail!(
            "Already signed in as {}. Run 'issuedesk logout' first.",
            user.username
        );
    }
    Ok(())
}

/// Loads an issue and checks that `user` created it.
pub(crate) fn fetch_owned(api: &dyn IssueApi, document_id: &str, user: &User, action: &str) -> Result<Issue> {
    let issue = api.get(document_id)?;
    if !issue.is_owned_by(user) {
        bail!("You can only {} your own issues", action);
    }
    Ok(issue)
}
