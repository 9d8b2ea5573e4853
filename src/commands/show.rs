use anyhow::Result;

use crate::api::IssueApi;
use crate::display::{self, Palette};
use crate::models::Issue;
use crate::session::SessionStore;
use crate::votes::VoteLedger;

pub fn run(
    api: &dyn IssueApi,
    session: &SessionStore,
    ledger: &VoteLedger,
    palette: Palette,
    document_id: &str,
) -> Result<()> {
    let issue = api.get(document_id)?;
    let owned = match session.current_user()? {
        Some(user) => issue.is_owned_by(&user),
        None => false,
    };
    let voted = ledger.contains(&issue.document_id)?;

    for line in render(&issue, palette, voted, owned) {
        println!("{}", line);
    }
    Ok(())
}

fn render(issue: &Issue, palette: Palette, voted: bool, owned: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", issue.title, palette.badge(issue.status)),
        format!("Id: {}", issue.document_id),
        format!("Status: {}", issue.status.label()),
        format!("Reported by: {}", issue.username),
        format!(
            "Votes: {}{}",
            display::votes(issue.counter),
            if voted { " (you voted)" } else { "" }
        ),
        format!("Created: {}", display::timestamp(&issue.created_at)),
    ];

    if let Some(closed) = &issue.closing_time {
        lines.push(format!("Closed: {}", display::timestamp(closed)));
    }
    if let Some(url) = &issue.image_url {
        lines.push(format!("Image: {}", url));
    }

    if !issue.description.is_empty() {
        lines.push(String::new());
        lines.push("Description:".to_string());
        for line in issue.description.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if owned {
        lines.push(String::new());
        lines.push(format!(
            "You reported this issue: issuedesk edit {0} | issuedesk delete {0}",
            issue.document_id
        ));
    }

    lines
}
