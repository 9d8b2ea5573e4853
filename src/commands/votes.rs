use anyhow::Result;

use crate::votes::VoteLedger;

pub fn run(ledger: &VoteLedger) -> Result<()> {
    let entries = ledger.entries()?;

    if entries.is_empty() {
        println!("No votes recorded.");
        return Ok(());
    }

    println!("Voted on {} issue(s):", entries.len());
    for document_id in entries {
        println!("  {}", document_id);
    }
    Ok(())
}
