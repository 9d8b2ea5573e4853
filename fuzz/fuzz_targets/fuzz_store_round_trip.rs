#![no_main]

//! Fuzz target for the local stores.
//!
//! Sessions, theme values and vote ledger entries with arbitrary Unicode
//! content must survive a trip through SQLite unchanged.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tempfile::tempdir;

use issuedesk::db::Database;
use issuedesk::models::User;
use issuedesk::session::SessionStore;
use issuedesk::theme::ThemeStore;
use issuedesk::votes::VoteLedger;

#[derive(Arbitrary, Debug)]
struct StoreInput {
    token: String,
    user_id: i64,
    username: String,
    email: String,
    theme: String,
    votes: Vec<String>,
}

fuzz_target!(|input: StoreInput| {
    let dir = match tempdir() {
        Ok(d) => d,
        Err(_) => return,
    };
    let db = match Database::open(&dir.path().join("issuedesk.db")) {
        Ok(d) => d,
        Err(_) => return,
    };

    let session = SessionStore::new(&db);
    let user = User {
        id: input.user_id,
        username: input.username,
        email: input.email,
    };
    if session.set(&input.token, &user).is_ok() {
        let stored = session.get().ok().flatten();
        let stored = stored.expect("fresh session reads back");
        assert_eq!(stored.token, input.token);
        assert_eq!(stored.user, user);
    }
    let _ = session.clear();
    assert!(matches!(session.get(), Ok(None)));

    // Unknown values fall back to the default instead of failing.
    let themes = ThemeStore::new(&db);
    if let Ok(theme) = input.theme.parse() {
        let _ = themes.set(theme);
    }
    assert!(themes.get().is_ok());

    let ledger = VoteLedger::new(&db);
    for document_id in input.votes.iter().take(20) {
        let _ = ledger.record(document_id);
    }
    if let Ok(entries) = ledger.entries() {
        let mut seen = std::collections::HashSet::new();
        assert!(entries.iter().all(|e| seen.insert(e.clone())));
    }
});
