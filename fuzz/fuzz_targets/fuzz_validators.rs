#![no_main]

//! Fuzz target for the form validators.
//!
//! Any Unicode input must be classified without panicking, and the
//! registration rules must agree with their plain-language definition.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use issuedesk::models::IssueStatus;
use issuedesk::validate::{
    is_valid_email, validate_issue_edit, validate_login, validate_new_issue, validate_registration,
    MIN_PASSWORD_CHARS, MIN_USERNAME_CHARS,
};

#[derive(Arbitrary, Debug)]
struct FormInput {
    username: String,
    email: String,
    password: String,
    title: String,
    description: String,
    image_url: Option<String>,
    status: u8,
}

fuzz_target!(|input: FormInput| {
    let errors = validate_registration(&input.username, &input.email, &input.password);
    let expected_ok = input.username.chars().count() >= MIN_USERNAME_CHARS
        && is_valid_email(&input.email)
        && input.password.chars().count() >= MIN_PASSWORD_CHARS
        && input.password.chars().any(|c| c.is_ascii_digit());
    assert_eq!(errors.is_empty(), expected_ok);

    let errors = validate_login(&input.email, &input.password);
    assert_eq!(errors.is_empty(), is_valid_email(&input.email) && !input.password.is_empty());

    let status = match input.status % 4 {
        0 => None,
        n => Some(IssueStatus::ALL[(n - 1) as usize]),
    };
    let _ = validate_new_issue(&input.title, &input.description, status, input.image_url.as_deref());
    let _ = validate_issue_edit(&input.title, &input.description, input.image_url.as_deref());
});
