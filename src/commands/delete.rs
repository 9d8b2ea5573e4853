use anyhow::Result;
use std::io::{self, Write};

use crate::api::IssueApi;
use crate::commands::{fetch_owned, require_user};
use crate::session::SessionStore;
use crate::viewmodel::IssueListViewModel;
use crate::votes::VoteLedger;

pub fn run(
    api: &dyn IssueApi,
    session: &SessionStore,
    ledger: &VoteLedger,
    document_id: &str,
    force: bool,
) -> Result<()> {
    let user = require_user(session)?;
    let issue = fetch_owned(api, document_id, &user, "delete")?;

    if !force {
        print!("Delete issue {} \"{}\"? [y/N] ", document_id, issue.title);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !confirmed(&input) {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let mut vm = IssueListViewModel::new();
    vm.present(issue);
    vm.delete(api, document_id)?;
    ledger.forget(document_id)?;

    println!("Deleted issue {}", document_id);
    Ok(())
}

fn confirmed(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Internal function for testing without stdin interaction
#[cfg(test)]
pub fn run_force(api: &dyn IssueApi, session: &SessionStore, ledger: &VoteLedger, document_id: &str) -> Result<()> {
    run(api, session, ledger, document_id, true)
}
