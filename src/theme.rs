use anyhow::Result;
use tracing::{debug, warn};

use crate::db::Database;
use crate::models::Theme;

const THEME_KEY: &str = "theme";

/// Light/dark preference. Independent of the session: it survives sign-out.
pub struct ThemeStore<'a> {
    db: &'a Database,
}

impl<'a> ThemeStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        ThemeStore { db }
    }

    pub fn get(&self) -> Result<Theme> {
        let stored = self.db.get_preference(THEME_KEY)?;
        Ok(match stored {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!(value = %value, "unknown theme stored, using light");
                Theme::Light
            }),
            None => Theme::default(),
        })
    }

    pub fn set(&self, theme: Theme) -> Result<()> {
        self.db.set_preference(THEME_KEY, theme.as_str())?;
        debug!(theme = theme.as_str(), "theme saved");
        Ok(())
    }

    pub fn toggle(&self) -> Result<Theme> {
        let next = self.get()?.toggled();
        self.set(next)?;
        Ok(next)
    }
}
