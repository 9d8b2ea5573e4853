#![no_main]

//! Fuzz target for backend response decoding.
//!
//! Arbitrary bodies and status codes must either decode or produce an
//! `ApiError`; they must never panic. A successful decode must also hold up
//! when rendered (multi-byte titles go through truncation).

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use issuedesk::api::envelope::{decode_auth, decode_delete, decode_issue, decode_list};
use issuedesk::api::{ApiError, Operation};
use issuedesk::display::{truncate, Palette};
use issuedesk::models::Theme;

#[derive(Arbitrary, Debug)]
struct ResponseInput {
    status: u16,
    body: String,
    /// Wrap `title` into an otherwise valid record instead of using `body`.
    structured: bool,
    title: String,
    counter: i64,
}

fuzz_target!(|input: ResponseInput| {
    let body = if input.structured {
        serde_json::json!({
            "data": [{
                "id": 1,
                "documentId": "fuzz",
                "title": input.title,
                "issueStatus": "Open",
                "counter": input.counter,
                "createdAt": "2025-01-01T00:00:00Z"
            }]
        })
        .to_string()
    } else {
        input.body.clone()
    };

    let palette = Palette::new(Theme::Dark, true);
    if let Ok(issues) = decode_list(input.status, &body) {
        assert!((200..300).contains(&input.status));
        for issue in issues {
            let _ = truncate(&issue.title, 40);
            let _ = palette.badge(issue.status);
        }
    }

    let _ = decode_issue(input.status, &input.body, Operation::Update);
    let _ = decode_auth(input.status, &input.body, Operation::Login);

    match decode_delete(input.status, &input.body) {
        Ok(()) => assert!((200..300).contains(&input.status)),
        Err(ApiError::Server { .. }) => {}
        Err(other) => panic!("delete decoding produced {:?}", other),
    }
});
