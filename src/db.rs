use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA_VERSION: i32 = 1;

/// Raw session row as stored on disk. The user record stays serialized here;
/// decoding it is the session store's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub token: String,
    pub user_json: String,
    pub expires_at: String,
}

/// Local client-side storage: one SQLite file per `.issuedesk` directory.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                -- At most one signed-in session; token and user live in the same row
                CREATE TABLE IF NOT EXISTS session (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    token TEXT NOT NULL,
                    user_json TEXT NOT NULL,
                    expires_at TEXT NOT NULL
                );

                -- Free-form client preferences (theme, ...)
                CREATE TABLE IF NOT EXISTS preferences (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                -- Issues this client has voted on
                CREATE TABLE IF NOT EXISTS voted_issues (
                    document_id TEXT PRIMARY KEY,
                    voted_at TEXT NOT NULL
                );
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        Ok(())
    }

    // Session
    pub fn save_session(&self, token: &str, user_json: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO session (id, token, user_json, expires_at) VALUES (1, ?1, ?2, ?3)",
            params![token, user_json, expires_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<SessionRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT token, user_json, expires_at FROM session WHERE id = 1",
                [],
                |row| {
                    Ok(SessionRow {
                        token: row.get(0)?,
                        user_json: row.get(1)?,
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn delete_session(&self) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM session", [])?;
        Ok(rows > 0)
    }

    // Preferences
    pub fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // Vote ledger
    pub fn add_vote(&self, document_id: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO voted_issues (document_id, voted_at) VALUES (?1, ?2)",
            params![document_id, now],
        )?;
        Ok(rows > 0)
    }

    pub fn remove_vote(&self, document_id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM voted_issues WHERE document_id = ?1", [document_id])?;
        Ok(rows > 0)
    }

    pub fn has_vote(&self, document_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM voted_issues WHERE document_id = ?1",
            [document_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn list_votes(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT document_id FROM voted_issues ORDER BY rowid")?;
        let votes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(votes)
    }
}

pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
