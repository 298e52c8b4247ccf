//! Form checks. Each returns `None` when the value is valid, or the message to show next to the field.

use crate::limits::LIMITS;

pub fn check_required(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some("Required".to_owned())
    } else {
        None
    }
}

pub fn check_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("Required".to_owned());
    }
    if email.len() > LIMITS.max_email_length {
        return Some("Email is too long".to_owned());
    }
    if !email.is_ascii() || email.chars().any(|x| x.is_ascii_control() || x.is_ascii_whitespace()) {
        return Some("Must be a valid email".to_owned());
    }

    let Some((name, host)) = email.split_once('@') else {
        return Some("Must be a valid email".to_owned());
    };
    if host.contains('@') {
        return Some("Must be a valid email".to_owned());
    }

    for part in [name, host] {
        if part.is_empty() || part.starts_with('.') || part.ends_with('.') || part.contains("..") {
            return Some("Must be a valid email".to_owned());
        }
    }

    // A host needs at least one dot between non-empty labels.
    if !host.contains('.') {
        return Some("Must be a valid email".to_owned());
    }

    None
}

pub fn check_password(password: &str) -> Option<String> {
    if password.is_empty() {
        Some("Required".to_owned())
    } else if password.chars().count() < LIMITS.min_password_length {
        Some("Invalid Password!".to_owned())
    } else {
        None
    }
}

/// Scheduled dates are entered as `YYYY-MM-DD`.
pub fn check_scheduled_date(date: &str) -> Option<String> {
    if date.trim().is_empty() {
        return Some("Scheduled date is required".to_owned());
    }
    match chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(_) => None,
        Err(_) => Some("Scheduled date must look like YYYY-MM-DD".to_owned()),
    }
}
