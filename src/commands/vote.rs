use anyhow::Result;

use crate::api::IssueApi;
use crate::commands::require_user;
use crate::display;
use crate::session::SessionStore;
use crate::viewmodel::IssueListViewModel;
use crate::votes::VoteLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub fn run(
    api: &dyn IssueApi,
    session: &SessionStore,
    ledger: &VoteLedger,
    document_id: &str,
    direction: Direction,
) -> Result<()> {
    require_user(session)?;

    let mut vm = IssueListViewModel::new();
    vm.present(api.get(document_id)?);

    let counter = match direction {
        Direction::Up => vm.vote(api, ledger, document_id)?,
        Direction::Down => vm.unvote(api, ledger, document_id)?,
    };

    let verb = match direction {
        Direction::Up => "Voted on",
        Direction::Down => "Removed vote from",
    };
    println!("{} {} ({})", verb, document_id, display::votes(counter));
    Ok(())
}
