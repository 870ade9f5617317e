//! Field checks shared by the login, checkout and upload forms.

use crate::error::ValidationErrors;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Digits with an optional leading `+`, separators allowed
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        && (7..=15).contains(&digits)
}

pub fn require(errors: &mut ValidationErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "required");
        false
    } else {
        true
    }
}

pub fn require_email(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if require(errors, field, value) && !is_valid_email(value) {
        errors.add(field, "not a valid email address");
    }
}

pub fn require_phone(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if require(errors, field, value) && !is_valid_phone(value) {
        errors.add(field, "not a valid phone number");
    }
}

/// Parses a strictly positive number, recording a field error otherwise
pub fn require_positive(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<f64> {
    if !require(errors, field, value) {
        return None;
    }
    match value.trim().replace(',', "").parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Some(n),
        _ => {
            errors.add(field, "must be a positive number");
            None
        }
    }
}
