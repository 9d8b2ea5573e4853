use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::envelope;
use crate::api::query::list_params;
use crate::api::{ApiError, AuthApi, AuthGrant, IssueApi, Operation};
use crate::models::{Filter, Issue, IssueDraft, IssuePatch};
use crate::session::TokenSource;

#[derive(Serialize)]
struct Payload<'p, T: Serialize> {
    data: &'p T,
}

/// Blocking HTTP client for the backend.
///
/// Holds no token of its own: every mutating call asks `tokens` at call time,
/// so a sign-in or sign-out between calls is honoured.
pub struct HttpClient<'a> {
    base: Url,
    http: Client,
    tokens: &'a dyn TokenSource,
}

impl<'a> HttpClient<'a> {
    pub fn new(base_url: &str, timeout: Duration, tokens: &'a dyn TokenSource) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("Invalid API URL '{}'", base_url))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            bail!("Invalid API URL '{}': expected an http(s) address", base_url);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("issuedesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpClient { base, http, tokens })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.tokens.bearer_token().ok_or(ApiError::Unauthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    fn send(&self, op: Operation, builder: RequestBuilder) -> Result<(u16, String), ApiError> {
        let request = builder.build().map_err(|e| {
            debug!(%op, error = %e, "could not build request");
            ApiError::Network(op)
        })?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.http.execute(request).map_err(|e| {
            debug!(%op, %method, %path, error = %e, "request failed");
            ApiError::Network(op)
        })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            debug!(%op, status, error = %e, "could not read response body");
            ApiError::Network(op)
        })?;

        info!(%op, %method, %path, status, "backend call");
        Ok((status, body))
    }
}

impl IssueApi for HttpClient<'_> {
    fn list(&self, filter: Filter, current_user_id: Option<&str>) -> Result<Vec<Issue>, ApiError> {
        let params = list_params(filter, current_user_id)?;
        let builder = self.request(Method::GET, self.endpoint(&["issues"])).query(&params);
        let (status, body) = self.send(Operation::List, builder)?;
        envelope::decode_list(status, &body)
    }

    fn get(&self, document_id: &str) -> Result<Issue, ApiError> {
        let builder = self.request(Method::GET, self.endpoint(&["issues", document_id]));
        let (status, body) = self.send(Operation::Get, builder)?;
        envelope::decode_issue(status, &body, Operation::Get)
    }

    fn create(&self, draft: &IssueDraft) -> Result<Issue, ApiError> {
        let builder = self
            .authorized(self.request(Method::POST, self.endpoint(&["issues"])))?
            .json(&Payload { data: draft });
        let (status, body) = self.send(Operation::Create, builder)?;
        envelope::decode_issue(status, &body, Operation::Create)
    }

    fn update(&self, document_id: &str, patch: &IssuePatch) -> Result<Issue, ApiError> {
        let op = match patch {
            IssuePatch::Counter { .. } => Operation::Vote,
            IssuePatch::Edit { .. } => Operation::Update,
        };
        let builder = self
            .authorized(self.request(Method::PUT, self.endpoint(&["issues", document_id])))?
            .json(&Payload { data: patch });
        let (status, body) = self.send(op, builder)?;
        envelope::decode_issue(status, &body, op)
    }

    fn delete(&self, document_id: &str) -> Result<(), ApiError> {
        let builder = self.authorized(self.request(Method::DELETE, self.endpoint(&["issues", document_id])))?;
        let (status, body) = self.send(Operation::Delete, builder)?;
        envelope::decode_delete(status, &body)
    }
}

impl AuthApi for HttpClient<'_> {
    fn login(&self, identifier: &str, password: &str) -> Result<AuthGrant, ApiError> {
        let builder = self
            .request(Method::POST, self.endpoint(&["auth", "local"]))
            .json(&json!({ "identifier": identifier, "password": password }));
        let (status, body) = self.send(Operation::Login, builder)?;
        envelope::decode_auth(status, &body, Operation::Login)
    }

    fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthGrant, ApiError> {
        let builder = self
            .request(Method::POST, self.endpoint(&["auth", "local", "register"]))
            .json(&json!({ "username": username, "email": email, "password": password }));
        let (status, body) = self.send(Operation::Register, builder)?;
        envelope::decode_auth(status, &body, Operation::Register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueStatus, User};
    use serde_json::Value;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    struct FixedToken(Option<&'static str>);

    impl TokenSource for FixedToken {
        fn bearer_token(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    static SIGNED_IN: FixedToken = FixedToken(Some("jwt-1"));
    static SIGNED_OUT: FixedToken = FixedToken(None);

    const ISSUE_BODY: &str = r#"{"data": {"id": 12, "documentId": "abc", "title": "Broken lamp",
        "description": "Street lamp is out", "issueStatus": "Open", "counter": 4, "userId": "5",
        "username": "sara", "createdAt": "2025-02-01T10:00:00.000Z"}}"#;

    struct Captured {
        head: String,
        body: String,
    }

    impl Captured {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<String> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case(name)
                    .then(|| value.trim().to_string())
            })
        }

        fn json(&self) -> Value {
            serde_json::from_str(&self.body).unwrap()
        }

        fn query_pairs(&self) -> Vec<(String, String)> {
            let target = self.request_line().split(' ').nth(1).unwrap();
            let url = Url::parse(&format!("http://stub{}", target)).unwrap();
            url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
        }
    }

    fn read_request(stream: &mut std::net::TcpStream) -> Captured {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let length = head
            .lines()
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);

        while buf.len() < header_end + length {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed before sending body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let body = String::from_utf8_lossy(&buf[header_end..header_end + length]).to_string();
        Captured { head, body }
    }

    /// Answers exactly one request with `response` and hands back what it saw.
    fn serve_once(response: String) -> (String, mpsc::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let captured = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            tx.send(captured).unwrap();
        });

        (format!("http://{}/api", addr), rx)
    }

    fn json_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    fn client<'a>(base: &str, tokens: &'a dyn TokenSource) -> HttpClient<'a> {
        HttpClient::new(base, Duration::from_secs(5), tokens).unwrap()
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(HttpClient::new("ftp://example.com", Duration::from_secs(1), &SIGNED_OUT).is_err());
        assert!(HttpClient::new("not a url", Duration::from_secs(1), &SIGNED_OUT).is_err());
    }

    #[test]
    fn test_list_open_sends_status_filter_and_sort() {
        let (base, seen) = serve_once(json_response("200 OK", r#"{"data": [], "meta": {}}"#));
        let issues = client(&base, &SIGNED_OUT)
            .list(Filter::Status(IssueStatus::Open), None)
            .unwrap();
        assert!(issues.is_empty());

        let request = seen.recv().unwrap();
        assert!(request.request_line().starts_with("GET /api/issues?"));
        let pairs = request.query_pairs();
        assert!(pairs.contains(&("sort[0]".to_string(), "createdAt:desc".to_string())));
        assert!(pairs.contains(&("filters[issueStatus][$eq]".to_string(), "Open".to_string())));
        // Reads are anonymous.
        assert!(request.header("authorization").is_none());
    }

    #[test]
    fn test_vote_update_sends_counter_with_bearer() {
        let (base, seen) = serve_once(json_response("200 OK", ISSUE_BODY));
        let issue = client(&base, &SIGNED_IN)
            .update("abc", &IssuePatch::Counter { counter: 4 })
            .unwrap();
        assert_eq!(issue.counter, 4);

        let request = seen.recv().unwrap();
        assert!(request.request_line().starts_with("PUT /api/issues/abc "));
        assert_eq!(request.header("authorization").as_deref(), Some("Bearer jwt-1"));
        assert_eq!(request.json(), serde_json::json!({ "data": { "counter": 4 } }));
    }

    #[test]
    fn test_create_wraps_draft_in_data() {
        let (base, seen) = serve_once(json_response("201 Created", ISSUE_BODY));
        let author = User { id: 5, username: "sara".to_string(), email: "sara@example.com".to_string() };
        let draft = IssueDraft::new("Broken lamp", "Street lamp is out", IssueStatus::Open, None, &author);
        client(&base, &SIGNED_IN).create(&draft).unwrap();

        let request = seen.recv().unwrap();
        assert!(request.request_line().starts_with("POST /api/issues "));
        let body = request.json();
        assert_eq!(body["data"]["counter"], 0);
        assert_eq!(body["data"]["userId"], "5");
        assert_eq!(body["data"]["issueStatus"], "Open");
    }

    #[test]
    fn test_mutations_need_a_token() {
        // No server: the call must fail before any request goes out.
        let api = client("http://127.0.0.1:9/api", &SIGNED_OUT);
        assert_eq!(api.delete("abc"), Err(ApiError::Unauthenticated));
        assert_eq!(
            api.update("abc", &IssuePatch::Counter { counter: 1 }).unwrap_err(),
            ApiError::Unauthenticated
        );
    }

    #[test]
    fn test_error_payload_surfaces_message() {
        let body = r#"{"data": null, "error": {"status": 404, "name": "NotFoundError", "message": "Not Found"}}"#;
        let (base, _seen) = serve_once(json_response("404 Not Found", body));
        let err = client(&base, &SIGNED_OUT).get("missing").unwrap_err();
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn test_delete_no_content() {
        let (base, seen) = serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string());
        client(&base, &SIGNED_IN).delete("abc").unwrap();
        let request = seen.recv().unwrap();
        assert!(request.request_line().starts_with("DELETE /api/issues/abc "));
    }

    #[test]
    fn test_connection_refused_is_generic_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}/api", addr), &SIGNED_OUT)
            .list(Filter::All, None)
            .unwrap_err();
        assert_eq!(err, ApiError::Network(Operation::List));
        assert_eq!(err.to_string(), "Failed to load issues");
    }

    #[test]
    fn test_login_posts_identifier() {
        let body = r#"{"jwt": "jwt-9", "user": {"id": 5, "username": "sara", "email": "sara@example.com"}}"#;
        let (base, seen) = serve_once(json_response("200 OK", body));
        let grant = client(&base, &SIGNED_OUT).login("sara@example.com", "pw").unwrap();
        assert_eq!(grant.jwt, "jwt-9");

        let request = seen.recv().unwrap();
        assert!(request.request_line().starts_with("POST /api/auth/local "));
        assert_eq!(request.json()["identifier"], "sara@example.com");
    }

    #[test]
    fn test_register_path() {
        let body = r#"{"jwt": "jwt-9", "user": {"id": 6, "username": "omar", "email": "omar@example.com"}}"#;
        let (base, seen) = serve_once(json_response("200 OK", body));
        client(&base, &SIGNED_OUT)
            .register("omar", "omar@example.com", "password1")
            .unwrap();
        let request = seen.recv().unwrap();
        assert!(request.request_line().starts_with("POST /api/auth/local/register "));
    }
}
