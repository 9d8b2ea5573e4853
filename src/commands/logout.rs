use anyhow::Result;

use crate::session::SessionStore;

pub fn run(session: &SessionStore) -> Result<()> {
    let was_signed_in = session.is_authenticated()?;
    session.clear()?;

    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}
