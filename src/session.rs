use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::cell::RefCell;
use tracing::{debug, info, warn};

use crate::db::{parse_datetime, Database};
use crate::models::{Session, User};

/// Sessions are never refreshed; they lapse this long after sign-in.
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
}

/// Anything that can hand out the current bearer token on demand.
pub trait TokenSource {
    fn bearer_token(&self) -> Option<String>;
}

type Listener<'a> = Box<dyn Fn(&SessionEvent) + 'a>;

pub struct SessionStore<'a> {
    db: &'a Database,
    listeners: RefCell<Vec<Listener<'a>>>,
}

impl<'a> SessionStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        SessionStore {
            db,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Returns the persisted session. A missing, unreadable or expired record
    /// all read as "signed out".
    pub fn get(&self) -> Result<Option<Session>> {
        self.get_at(Utc::now())
    }

    fn get_at(&self, now: DateTime<Utc>) -> Result<Option<Session>> {
        let row = match self.db.load_session()? {
            Some(row) => row,
            None => return Ok(None),
        };

        let user: User = match serde_json::from_str(&row.user_json) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "stored user record is unreadable, treating as signed out");
                return Ok(None);
            }
        };

        let expires_at = match parse_datetime(&row.expires_at) {
            Some(ts) => ts,
            None => {
                warn!("stored session expiry is unreadable, treating as signed out");
                return Ok(None);
            }
        };

        if expires_at <= now {
            debug!(%expires_at, "session expired");
            self.db.delete_session()?;
            return Ok(None);
        }

        Ok(Some(Session {
            token: row.token,
            user,
            expires_at,
        }))
    }

    pub fn set(&self, token: &str, user: &User) -> Result<Session> {
        self.set_at(token, user, Utc::now())
    }

    fn set_at(&self, token: &str, user: &User, now: DateTime<Utc>) -> Result<Session> {
        let user_json = serde_json::to_string(user).context("Failed to serialize user")?;
        let expires_at = now + Duration::days(SESSION_TTL_DAYS);
        self.db.save_session(token, &user_json, expires_at)?;
        info!(user_id = user.id, username = %user.username, "signed in");

        self.notify(&SessionEvent::SignedIn(user.clone()));
        Ok(Session {
            token: token.to_string(),
            user: user.clone(),
            expires_at,
        })
    }

    /// Drops the session and tells every subscriber to discard in-memory state.
    pub fn clear(&self) -> Result<()> {
        if self.db.delete_session()? {
            info!("signed out");
        }
        self.notify(&SessionEvent::SignedOut);
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.get()?.is_some())
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        Ok(self.get()?.map(|session| session.user))
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'a) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self, event: &SessionEvent) {
        for listener in self.listeners.borrow().iter() {
            listener(event);
        }
    }
}

impl TokenSource for SessionStore<'_> {
    fn bearer_token(&self) -> Option<String> {
        match self.get() {
            Ok(session) => session.map(|s| s.token),
            Err(e) => {
                warn!(error = %e, "could not read session");
                None
            }
        }
    }
}
