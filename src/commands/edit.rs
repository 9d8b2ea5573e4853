use anyhow::{bail, Result};

use crate::api::IssueApi;
use crate::commands::{fetch_owned, require_user};
use crate::models::{IssueEdit, IssueStatus};
use crate::session::SessionStore;
use crate::validate::{validate_issue_edit, ValidationError};
use crate::viewmodel::IssueListViewModel;

/// Fields given on the command line. Anything left out keeps its current value.
#[derive(Debug, Default, Clone)]
pub struct EditArgs<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    /// An empty string clears the image.
    pub image_url: Option<&'a str>,
    pub status: Option<IssueStatus>,
}

impl EditArgs<'_> {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image_url.is_none() && self.status.is_none()
    }

    fn apply(&self, edit: &mut IssueEdit) {
        if let Some(title) = self.title {
            edit.title = title.to_string();
        }
        if let Some(description) = self.description {
            edit.description = description.to_string();
        }
        if let Some(url) = self.image_url {
            edit.image_url = Some(url.to_string());
        }
        if let Some(status) = self.status {
            edit.status = status;
        }
    }
}

pub fn run(api: &dyn IssueApi, session: &SessionStore, document_id: &str, args: EditArgs) -> Result<()> {
    if args.is_empty() {
        bail!("Nothing to change. Pass --title, --description, --image-url or --status.");
    }

    let user = require_user(session)?;
    let current = fetch_owned(api, document_id, &user, "edit")?;

    let mut edit = IssueEdit::from_issue(&current);
    args.apply(&mut edit);
    ValidationError::check(validate_issue_edit(
        &edit.title,
        &edit.description,
        edit.image_url.as_deref(),
    ))?;

    let mut vm = IssueListViewModel::new();
    vm.present(current);
    let updated = vm.apply_edit(api, document_id, edit)?;

    println!("Updated issue {} [{}]", updated.document_id, updated.status);
    Ok(())
}
