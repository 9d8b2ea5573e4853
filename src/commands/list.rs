use anyhow::Result;

use crate::api::IssueApi;
use crate::display::{self, Palette};
use crate::models::{Filter, Issue};
use crate::session::SessionStore;
use crate::viewmodel::IssueListViewModel;
use crate::votes::VoteLedger;

pub fn run(
    api: &dyn IssueApi,
    session: &SessionStore,
    ledger: &VoteLedger,
    palette: Palette,
    filter: Filter,
) -> Result<()> {
    let user = session.current_user()?;
    let user_id = user.as_ref().map(|u| u.id.to_string());

    let mut vm = IssueListViewModel::new();
    let issues = vm.load(api, filter, user_id.as_deref())?;

    if issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    for issue in issues {
        let voted = ledger.contains(&issue.document_id)?;
        println!("{}", row(issue, palette, voted));
    }

    Ok(())
}

fn row(issue: &Issue, palette: Palette, voted: bool) -> String {
    format!(
        "{:<26} {} {:<40} {}{:>4} {:<12} {}",
        issue.document_id,
        palette.padded_badge(issue.status, 13),
        display::truncate(&issue.title, 40),
        if voted { "*" } else { " " },
        issue.counter,
        display::truncate(&issue.username, 12),
        issue.created_at.format("%Y-%m-%d")
    )
}
