use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In-progress", alias = "In Progress")]
    InProgress,
    #[serde(rename = "Closed")]
    Closed,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 3] = [IssueStatus::Open, IssueStatus::InProgress, IssueStatus::Closed];

    /// Wire spelling used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "Open",
            IssueStatus::InProgress => "In-progress",
            IssueStatus::Closed => "Closed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in progress",
            IssueStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(IssueStatus::Open),
            "in-progress" | "in progress" | "in_progress" | "inprogress" => Ok(IssueStatus::InProgress),
            "closed" => Ok(IssueStatus::Closed),
            other => Err(format!(
                "Invalid status '{}'. Must be one of: open, in-progress, closed",
                other
            )),
        }
    }
}

/// Which slice of the issue board a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Status(IssueStatus),
    Mine,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Status(status) => f.write_str(status.label()),
            Filter::Mine => f.write_str("mine"),
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "mine" | "my-issues" | "myissues" => Ok(Filter::Mine),
            other => other.parse::<IssueStatus>().map(Filter::Status).map_err(|_| {
                format!(
                    "Invalid filter '{}'. Must be one of: all, open, in-progress, closed, mine",
                    other
                )
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: i64,
    pub document_id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub status: IssueStatus,
    pub counter: u32,
    pub user_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closing_time: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.user_id == user.id.to_string()
    }
}

/// Body of a create request. The backend assigns ids and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub issue_status: IssueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub counter: u32,
    pub user_id: String,
    pub username: String,
}

impl IssueDraft {
    pub fn new(
        title: &str,
        description: &str,
        status: IssueStatus,
        image_url: Option<&str>,
        author: &User,
    ) -> Self {
        IssueDraft {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            issue_status: status,
            image_url: image_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            counter: 0,
            user_id: author.id.to_string(),
            username: author.username.clone(),
        }
    }
}

/// Editable fields of an existing issue, pre-filled from its current values.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueEdit {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub status: IssueStatus,
}

impl IssueEdit {
    pub fn from_issue(issue: &Issue) -> Self {
        IssueEdit {
            title: issue.title.clone(),
            description: issue.description.clone(),
            image_url: issue.image_url.clone(),
            status: issue.status,
        }
    }

    /// `closingTime` is stamped with `now` only when the edit closes the issue.
    pub fn into_patch(self, now: DateTime<Utc>) -> IssuePatch {
        let closing_time = (self.status == IssueStatus::Closed).then_some(now);
        IssuePatch::Edit {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            image_url: self
                .image_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            issue_status: self.status,
            closing_time,
        }
    }
}

/// Body of an update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IssuePatch {
    Edit {
        title: String,
        description: String,
        #[serde(rename = "imageUrl")]
        image_url: Option<String>,
        #[serde(rename = "issueStatus")]
        issue_status: IssueStatus,
        #[serde(rename = "closingTime")]
        closing_time: Option<DateTime<Utc>>,
    },
    Counter {
        counter: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Invalid theme '{}'. Must be light or dark", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_issue() -> Issue {
        Issue {
            id: 7,
            document_id: "abc".to_string(),
            title: "Broken lamp".to_string(),
            description: "Street lamp is out".to_string(),
            image_url: None,
            status: IssueStatus::Open,
            counter: 3,
            user_id: "5".to_string(),
            username: "sara".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            updated_at: None,
            closing_time: None,
        }
    }

    #[test]
    fn test_status_parses_cli_spellings() {
        assert_eq!("open".parse::<IssueStatus>().unwrap(), IssueStatus::Open);
        assert_eq!("In Progress".parse::<IssueStatus>().unwrap(), IssueStatus::InProgress);
        assert_eq!("in-progress".parse::<IssueStatus>().unwrap(), IssueStatus::InProgress);
        assert_eq!("CLOSED".parse::<IssueStatus>().unwrap(), IssueStatus::Closed);
        assert!("pending".parse::<IssueStatus>().is_err());
    }

    #[test]
    fn test_status_accepts_legacy_wire_spelling() {
        let status: IssueStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(status, IssueStatus::InProgress);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"In-progress\"");
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!("mine".parse::<Filter>().unwrap(), Filter::Mine);
        assert_eq!(
            "closed".parse::<Filter>().unwrap(),
            Filter::Status(IssueStatus::Closed)
        );
        assert!("everything".parse::<Filter>().is_err());
    }

    #[test]
    fn test_draft_starts_with_zero_votes() {
        let user = User { id: 5, username: "sara".to_string(), email: "s@x.io".to_string() };
        let draft = IssueDraft::new(" Title ", "Body", IssueStatus::Open, Some("  "), &user);
        assert_eq!(draft.counter, 0);
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.user_id, "5");
        assert_eq!(draft.image_url, None);

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["issueStatus"], "Open");
        assert_eq!(json["userId"], "5");
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_closing_edit_stamps_closing_time() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut edit = IssueEdit::from_issue(&sample_issue());
        edit.status = IssueStatus::Closed;

        match edit.into_patch(now) {
            IssuePatch::Edit { closing_time, .. } => assert_eq!(closing_time, Some(now)),
            other => panic!("unexpected patch {:?}", other),
        }
    }

    #[test]
    fn test_non_closing_edit_sends_null_closing_time() {
        let now = Utc::now();
        for status in [IssueStatus::Open, IssueStatus::InProgress] {
            let mut edit = IssueEdit::from_issue(&sample_issue());
            edit.status = status;
            let json = serde_json::to_value(edit.into_patch(now)).unwrap();
            assert!(json["closingTime"].is_null());
            assert!(json.as_object().unwrap().contains_key("closingTime"));
        }
    }

    #[test]
    fn test_edit_trims_image_url() {
        let mut edit = IssueEdit::from_issue(&sample_issue());
        edit.image_url = Some("  https://x.io/a.png  ".to_string());

        match edit.into_patch(Utc::now()) {
            IssuePatch::Edit { image_url, .. } => {
                assert_eq!(image_url.as_deref(), Some("https://x.io/a.png"))
            }
            other => panic!("unexpected patch {:?}", other),
        }
    }

    #[test]
    fn test_counter_patch_shape() {
        let json = serde_json::to_value(IssuePatch::Counter { counter: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({ "counter": 4 }));
    }

    #[test]
    fn test_ownership_compares_string_ids() {
        let issue = sample_issue();
        let owner = User { id: 5, username: "sara".to_string(), email: "s@x.io".to_string() };
        let other = User { id: 6, ..owner.clone() };
        assert!(issue.is_owned_by(&owner));
        assert!(!issue.is_owned_by(&other));
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
