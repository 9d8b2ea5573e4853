//! Typed decoding of backend responses.
//!
//! Bodies are checked for an `error` payload first, then for a success
//! status, and only then decoded into wire records. Anything that does not
//! fit the expected shape becomes `ApiError::Decode` instead of a half-filled
//! value.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{ApiError, AuthGrant, Operation};
use crate::db::parse_datetime;
use crate::models::{Issue, IssueStatus};

const INVALID_CREDENTIALS: &str = "Invalid identifier or password";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(i64),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        }
    }
}

/// An issue exactly as the backend sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueRecord {
    id: i64,
    document_id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    issue_status: IssueStatus,
    #[serde(default)]
    counter: Option<i64>,
    #[serde(default)]
    user_id: Option<IdValue>,
    #[serde(default)]
    username: Option<String>,
    created_at: String,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    closing_time: Option<String>,
}

fn timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    parse_datetime(raw).ok_or_else(|| ApiError::Decode(format!("bad {} timestamp '{}'", field, raw)))
}

fn optional_timestamp(field: &str, raw: Option<String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => timestamp(field, raw).map(Some),
    }
}

impl TryFrom<IssueRecord> for Issue {
    type Error = ApiError;

    fn try_from(record: IssueRecord) -> Result<Self, Self::Error> {
        let counter = match record.counter {
            None => 0,
            Some(n) => u32::try_from(n)
                .map_err(|_| ApiError::Decode(format!("vote counter {} out of range", n)))?,
        };

        Ok(Issue {
            id: record.id,
            document_id: record.document_id,
            title: record.title,
            description: record.description.unwrap_or_default(),
            image_url: record.image_url.filter(|url| !url.trim().is_empty()),
            status: record.issue_status,
            counter,
            user_id: record.user_id.map(IdValue::into_string).unwrap_or_default(),
            username: record.username.unwrap_or_default(),
            created_at: timestamp("createdAt", &record.created_at)?,
            updated_at: optional_timestamp("updatedAt", record.updated_at)?,
            closing_time: optional_timestamp("closingTime", record.closing_time)?,
        })
    }
}

fn server_error(status: u16, error: &Value, op: Operation) -> ApiError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let message = match (op, message) {
        (Operation::Login, Some(INVALID_CREDENTIALS)) => Operation::Login.server_fallback().to_string(),
        (_, Some(m)) => m.to_string(),
        (_, None) => op.server_fallback().to_string(),
    };

    ApiError::Server {
        status: Some(status),
        message,
    }
}

/// Rejects error payloads and non-success statuses; returns the parsed body
/// (if there was one).
fn check(status: u16, body: &str, op: Operation) -> Result<Option<Value>, ApiError> {
    let value = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<Value>(body).ok()
    };

    if let Some(error) = value.as_ref().and_then(|v| v.get("error")).filter(|e| !e.is_null()) {
        return Err(server_error(status, error, op));
    }

    if !(200..300).contains(&status) {
        return Err(ApiError::Server {
            status: Some(status),
            message: op.server_fallback().to_string(),
        });
    }

    Ok(value)
}

fn data(value: Option<Value>) -> Result<Value, ApiError> {
    match value {
        None => Err(ApiError::Decode("body is not JSON".to_string())),
        Some(mut value) => match value.get_mut("data").map(Value::take) {
            Some(Value::Null) | None => Err(ApiError::Decode("missing data".to_string())),
            Some(data) => Ok(data),
        },
    }
}

fn record(value: Value) -> Result<Issue, ApiError> {
    let record: IssueRecord =
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
    Issue::try_from(record)
}

pub fn decode_list(status: u16, body: &str) -> Result<Vec<Issue>, ApiError> {
    let data = data(check(status, body, Operation::List)?)?;
    match data {
        Value::Array(items) => items.into_iter().map(record).collect(),
        _ => Err(ApiError::Decode("expected a list of issues".to_string())),
    }
}

pub fn decode_issue(status: u16, body: &str, op: Operation) -> Result<Issue, ApiError> {
    record(data(check(status, body, op)?)?)
}

pub fn decode_auth(status: u16, body: &str, op: Operation) -> Result<AuthGrant, ApiError> {
    let value = check(status, body, op)?.ok_or_else(|| ApiError::Decode("body is not JSON".to_string()))?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// 204 and any other 2xx count as deleted.
pub fn decode_delete(status: u16, body: &str) -> Result<(), ApiError> {
    check(status, body, Operation::Delete).map(|_| ())
}
