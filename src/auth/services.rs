use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::RegisterRequest;
use crate::auth::password::MIN_PASSWORD_LEN;
use crate::error::{AppError, FieldErrors};

pub const MIN_DISPLAY_NAME_LEN: usize = 2;
pub const MAX_DISPLAY_NAME_LEN: usize = 50;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize a registration payload in place and check every field.
pub(crate) fn validate_registration(payload: &mut RegisterRequest) -> Result<(), AppError> {
    payload.email = normalize_email(&payload.email);
    payload.display_name = payload.display_name.trim().to_string();

    let mut errs = FieldErrors::new();
    if !is_valid_email(&payload.email) {
        errs.add("email", "Invalid email");
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        errs.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    if !payload.password.chars().any(|c| c.is_ascii_alphabetic()) {
        errs.add("password", "Password must contain a letter");
    }
    if !payload.password.chars().any(|c| c.is_ascii_digit()) {
        errs.add("password", "Password must contain a number");
    }
    let name_len = payload.display_name.chars().count();
    if name_len < MIN_DISPLAY_NAME_LEN {
        errs.add(
            "displayName",
            format!("Display name must be at least {MIN_DISPLAY_NAME_LEN} characters"),
        );
    } else if name_len > MAX_DISPLAY_NAME_LEN {
        errs.add(
            "displayName",
            format!("Display name must be at most {MAX_DISPLAY_NAME_LEN} characters"),
        );
    }
    errs.into_result()
}
