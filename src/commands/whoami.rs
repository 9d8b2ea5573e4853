use anyhow::Result;

use crate::models::User;
use crate::session::SessionStore;

pub const TITLE: &str = "Welcome to Issues Tracker";
pub const TAGLINE: &str = "An integrated system for managing and tracking issues";

pub fn greeting(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            "Hello {}, start tracking and managing your issues efficiently",
            user.username
        ),
        None => TAGLINE.to_string(),
    }
}

pub fn run(session: &SessionStore) -> Result<()> {
    let current = session.get()?;

    println!("{}", TITLE);
    println!("{}", greeting(current.as_ref().map(|s| &s.user)));

    match current {
        Some(session) => {
            println!();
            println!("Signed in as {} <{}>", session.user.username, session.user.email);
            println!("Session expires: {}", crate::display::timestamp(&session.expires_at));
            println!("\n  issuedesk create \"Title\" -d \"What happened\"");
            println!("  issuedesk list --filter mine");
        }
        None => {
            println!("\n  issuedesk list");
            println!("  issuedesk register --username <name> --email <email>");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::*;

    #[test]
    fn test_greeting_names_user() {
        assert_eq!(
            greeting(Some(&sara())),
            "Hello sara, start tracking and managing your issues efficiently"
        );
    }

    #[test]
    fn test_greeting_signed_out() {
        assert_eq!(greeting(None), TAGLINE);
    }

    #[test]
    fn test_run_either_way() {
        let (db, _dir) = setup_test_db();
        let session = SessionStore::new(&db);
        run(&session).unwrap();
        sign_in(&session, &sara());
        run(&session).unwrap();
    }
}
