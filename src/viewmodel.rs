//! In-memory state behind the issue list.
//!
//! Loads follow `Idle -> Loading -> Loaded | Failed`. Each load hands out a
//! [`LoadTicket`]; only the ticket of the most recent load may land, so a slow
//! response for an abandoned filter never overwrites newer state.
//!
//! Votes are optimistic and roll back when the backend rejects them. Edits
//! and deletes are pessimistic: the list only changes once the backend has
//! confirmed.

use anyhow::{bail, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{ApiError, IssueApi};
use crate::models::{Filter, Issue, IssueEdit, IssuePatch};
use crate::votes::VoteLedger;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    filter: Filter,
}

impl LoadTicket {
    pub fn filter(&self) -> Filter {
        self.filter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct IssueListViewModel {
    issues: Vec<Issue>,
    filter: Filter,
    state: LoadState,
    generation: u64,
}

impl IssueListViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn find(&self, document_id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.document_id == document_id)
    }

    fn position(&self, document_id: &str) -> Option<usize> {
        self.issues.iter().position(|i| i.document_id == document_id)
    }

    /// Switches the active filter and starts a fresh load for it.
    pub fn set_filter(&mut self, filter: Filter) -> LoadTicket {
        self.filter = filter;
        self.refresh()
    }

    /// Starts a load for the current filter, superseding any load in flight.
    pub fn refresh(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        debug!(generation = self.generation, filter = %self.filter, "loading issues");
        LoadTicket {
            generation: self.generation,
            filter: self.filter,
        }
    }

    /// Lands a load result. Results for superseded tickets are dropped.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<Vec<Issue>, ApiError>) -> LoadOutcome {
        if ticket.generation != self.generation || ticket.filter != self.filter {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale issue load"
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(issues) => {
                debug!(count = issues.len(), filter = %self.filter, "issues loaded");
                self.issues = issues;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(error = %e, filter = %self.filter, "issue load failed");
                self.state = LoadState::Failed(e.to_string());
            }
        }
        LoadOutcome::Applied
    }

    /// Fetches `filter` and lands the result in one step.
    pub fn load(&mut self, api: &dyn IssueApi, filter: Filter, current_user_id: Option<&str>) -> Result<&[Issue], ApiError> {
        let ticket = self.set_filter(filter);
        let result = api.list(filter, current_user_id);
        let failure = result.as_ref().err().cloned();
        self.complete_load(ticket, result);
        match failure {
            Some(e) => Err(e),
            None => Ok(&self.issues),
        }
    }

    /// Shows a single issue, as the detail view does.
    pub fn present(&mut self, issue: Issue) {
        self.generation += 1;
        self.issues = vec![issue];
        self.state = LoadState::Loaded;
    }

    /// Drops all state. Any load still in flight becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.issues.clear();
        self.filter = Filter::All;
        self.state = LoadState::Idle;
    }

    pub fn vote(&mut self, api: &dyn IssueApi, ledger: &VoteLedger, document_id: &str) -> Result<u32> {
        if ledger.contains(document_id)? {
            bail!("You have already voted on {}", document_id);
        }
        let index = match self.position(document_id) {
            Some(index) => index,
            None => bail!("Issue {} not found", document_id),
        };

        let previous = self.issues[index].counter;
        let counter = previous.saturating_add(1);
        ledger.record(document_id)?;
        self.issues[index].counter = counter;

        self.push_counter(api, ledger, index, previous, counter, true)?;
        info!(document_id, counter, "voted");
        Ok(counter)
    }

    pub fn unvote(&mut self, api: &dyn IssueApi, ledger: &VoteLedger, document_id: &str) -> Result<u32> {
        if !ledger.contains(document_id)? {
            bail!("You have not voted on {}", document_id);
        }
        let index = match self.position(document_id) {
            Some(index) => index,
            None => bail!("Issue {} not found", document_id),
        };

        let previous = self.issues[index].counter;
        let counter = previous.saturating_sub(1);
        ledger.forget(document_id)?;
        self.issues[index].counter = counter;

        self.push_counter(api, ledger, index, previous, counter, false)?;
        info!(document_id, counter, "vote removed");
        Ok(counter)
    }

    /// Sends the already-applied counter. On failure the counter and the
    /// ledger entry go back to how they were, and the backend's error is
    /// returned even if the ledger cannot be restored.
    fn push_counter(
        &mut self,
        api: &dyn IssueApi,
        ledger: &VoteLedger,
        index: usize,
        previous: u32,
        counter: u32,
        voted: bool,
    ) -> Result<()> {
        let document_id = self.issues[index].document_id.clone();
        match api.update(&document_id, &IssuePatch::Counter { counter }) {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(document_id = %document_id, error = %e, "vote rejected, rolling back");
                self.issues[index].counter = previous;
                let restored = if voted {
                    ledger.forget(&document_id)
                } else {
                    ledger.record(&document_id)
                };
                if let Err(store_err) = restored {
                    warn!(document_id = %document_id, error = %store_err, "failed to restore vote ledger");
                }
                Err(e.into())
            }
        }
    }

    /// Sends an edit and, once confirmed, swaps in the backend's record.
    pub fn apply_edit(&mut self, api: &dyn IssueApi, document_id: &str, edit: IssueEdit) -> Result<&Issue, ApiError> {
        let patch = edit.into_patch(Utc::now());
        let updated = api.update(document_id, &patch)?;
        info!(document_id, status = %updated.status, "issue updated");

        let index = match self.position(document_id) {
            Some(index) => {
                self.issues[index] = updated;
                index
            }
            None => {
                self.issues.push(updated);
                self.issues.len() - 1
            }
        };
        Ok(&self.issues[index])
    }

    /// Deletes on the backend, then drops the issue from the list.
    pub fn delete(&mut self, api: &dyn IssueApi, document_id: &str) -> Result<(), ApiError> {
        api.delete(document_id)?;
        self.issues.retain(|i| i.document_id != document_id);
        info!(document_id, "issue deleted");
        Ok(())
    }
}
