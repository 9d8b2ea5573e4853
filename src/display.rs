use chrono::{DateTime, Local, Utc};
use std::io::IsTerminal;

use crate::models::{IssueStatus, Theme};

const RESET: &str = "\x1b[0m";

/// Status badge colours for the active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    theme: Theme,
    enabled: bool,
}

impl Palette {
    pub fn new(theme: Theme, enabled: bool) -> Self {
        Palette { theme, enabled }
    }

    /// Colours only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn for_stdout(theme: Theme) -> Self {
        let enabled = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Palette::new(theme, enabled)
    }

    fn code(&self, status: IssueStatus) -> &'static str {
        match (self.theme, status) {
            (Theme::Light, IssueStatus::Open) => "\x1b[32m",
            (Theme::Light, IssueStatus::InProgress) => "\x1b[33m",
            (Theme::Light, IssueStatus::Closed) => "\x1b[31m",
            (Theme::Dark, IssueStatus::Open) => "\x1b[92m",
            (Theme::Dark, IssueStatus::InProgress) => "\x1b[93m",
            (Theme::Dark, IssueStatus::Closed) => "\x1b[91m",
        }
    }

    pub fn badge(&self, status: IssueStatus) -> String {
        self.padded_badge(status, 0)
    }

    /// Pads to `width` columns before colouring, so escape codes do not
    /// count towards the width.
    pub fn padded_badge(&self, status: IssueStatus, width: usize) -> String {
        let text = format!("{:<width$}", format!("[{}]", status.as_str()), width = width);
        if self.enabled {
            format!("{}{}{}", self.code(status), text, RESET)
        } else {
            text
        }
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// `MM/DD/YYYY hh:mm AM/PM`, in local time.
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%m/%d/%Y %I:%M %p").to_string()
}

pub fn votes(counter: u32) -> String {
    match counter {
        1 => "1 vote".to_string(),
        n => format!("{} votes", n),
    }
}
