use anyhow::Result;

use crate::api::AuthApi;
use crate::commands::refuse_if_signed_in;
use crate::session::SessionStore;
use crate::validate::{validate_login, ValidationError};

pub fn run(session: &SessionStore, auth: &dyn AuthApi, email: &str, password: &str) -> Result<()> {
    refuse_if_signed_in(session)?;
    ValidationError::check(validate_login(email, password))?;

    let grant = auth.login(email, password)?;
    session.set(&grant.jwt, &grant.user)?;

    println!("Signed in as {}", grant.user.username);
    Ok(())
}
