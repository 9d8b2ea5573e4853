use anyhow::Result;

use crate::api::IssueApi;
use crate::commands::require_user;
use crate::models::{IssueDraft, IssueStatus};
use crate::session::SessionStore;
use crate::validate::{validate_new_issue, ValidationError};

pub fn run(
    api: &dyn IssueApi,
    session: &SessionStore,
    title: &str,
    description: &str,
    status: Option<IssueStatus>,
    image_url: Option<&str>,
) -> Result<()> {
    let author = require_user(session)?;
    ValidationError::check(validate_new_issue(title, description, status, image_url))?;

    // Validation guarantees a status is present.
    let status = status.unwrap_or(IssueStatus::Open);
    let draft = IssueDraft::new(title, description, status, image_url, &author);
    let issue = api.create(&draft)?;

    println!("Created issue {} [{}]", issue.document_id, issue.status);
    Ok(())
}
