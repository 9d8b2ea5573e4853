use anyhow::Result;

use crate::api::AuthApi;
use crate::commands::refuse_if_signed_in;
use crate::session::SessionStore;
use crate::validate::{validate_registration, ValidationError};

pub fn run(session: &SessionStore, auth: &dyn AuthApi, username: &str, email: &str, password: &str) -> Result<()> {
    refuse_if_signed_in(session)?;
    ValidationError::check(validate_registration(username, email, password))?;

    let grant = auth.register(username, email, password)?;
    session.set(&grant.jwt, &grant.user)?;

    println!("Account created. Signed in as {}", grant.user.username);
    Ok(())
}
