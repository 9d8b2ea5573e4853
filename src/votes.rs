use anyhow::Result;
use tracing::debug;

use crate::db::Database;

/// Issues this client believes it has voted on.
///
/// The ledger is purely local. The backend keeps a bare counter with no
/// per-user attribution, so the ledger cannot stop a second vote cast from
/// another machine or after the ledger is wiped.
pub struct VoteLedger<'a> {
    db: &'a Database,
}

impl<'a> VoteLedger<'a> {
    pub fn new(db: &'a Database) -> Self {
        VoteLedger { db }
    }

    pub fn contains(&self, document_id: &str) -> Result<bool> {
        self.db.has_vote(document_id)
    }

    /// Returns false when the entry was already present.
    pub fn record(&self, document_id: &str) -> Result<bool> {
        let added = self.db.add_vote(document_id)?;
        debug!(document_id, added, "vote recorded");
        Ok(added)
    }

    /// Returns false when there was nothing to remove.
    pub fn forget(&self, document_id: &str) -> Result<bool> {
        let removed = self.db.remove_vote(document_id)?;
        debug!(document_id, removed, "vote forgotten");
        Ok(removed)
    }

    pub fn entries(&self) -> Result<Vec<String>> {
        self.db.list_votes()
    }
}
