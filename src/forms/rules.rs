// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Field rules shared by the auth forms.
//!
//! Each rule function reports only the first failing check so a field shows
//! one message at a time.

use std::borrow::Cow;
use validator::ValidationError;

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Minimum name length, in characters.
pub const NAME_MIN_LEN: usize = 2;

/// Requirements a registration password must meet, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
}

impl PasswordRule {
    pub const ALL: [PasswordRule; 4] = [
        PasswordRule::MinLength,
        PasswordRule::Uppercase,
        PasswordRule::Lowercase,
        PasswordRule::Digit,
    ];

    pub fn is_met(&self, password: &str) -> bool {
        match self {
            PasswordRule::MinLength => password.chars().count() >= PASSWORD_MIN_LEN,
            PasswordRule::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordRule::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "password_length",
            PasswordRule::Uppercase => "password_uppercase",
            PasswordRule::Lowercase => "password_lowercase",
            PasswordRule::Digit => "password_digit",
        }
    }

    /// Message shown when the rule is not met.
    pub fn message(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "Must be at least 8 characters",
            PasswordRule::Uppercase => "Must contain an uppercase letter",
            PasswordRule::Lowercase => "Must contain a lowercase letter",
            PasswordRule::Digit => "Must contain a number",
        }
    }

    /// Checklist label for the live strength indicator.
    pub fn label(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "8+ characters",
            PasswordRule::Uppercase => "One uppercase letter",
            PasswordRule::Lowercase => "One lowercase letter",
            PasswordRule::Digit => "One number",
        }
    }
}

/// Every rule `password` fails, in display order.
pub fn missing_password_rules(password: &str) -> Vec<PasswordRule> {
    PasswordRule::ALL
        .into_iter()
        .filter(|rule| !rule.is_met(password))
        .collect()
}

/// Live checklist: each rule with whether it is met.
pub fn password_checklist(password: &str) -> Vec<(PasswordRule, bool)> {
    PasswordRule::ALL
        .into_iter()
        .map(|rule| (rule, rule.is_met(password)))
        .collect()
}

/// Whether the server would accept `password`.
pub fn is_strong_password(password: &str) -> bool {
    missing_password_rules(password).is_empty()
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with text on both sides.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", "Name is required"));
    }
    if value.chars().count() < NAME_MIN_LEN {
        return Err(error("name_length", "Name must be at least 2 characters"));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", "Email is required"));
    }
    if !is_valid_email(value) {
        return Err(error("email", "Invalid email format"));
    }
    Ok(())
}

/// Login only requires a password to be present.
pub fn validate_login_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", "Password is required"));
    }
    Ok(())
}

/// Registration password: required, then the first missing strength rule.
pub fn validate_new_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", "Password is required"));
    }
    match missing_password_rules(value).first() {
        Some(rule) => Err(error(rule.code(), rule.message())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user@@example.com"));
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(validate_name("").unwrap_err().code, "required");
        assert_eq!(validate_name("J").unwrap_err().code, "name_length");
        assert!(validate_name("Jo").is_ok());
    }

    #[test]
    fn test_checklist_reports_each_rule() {
        let checklist = password_checklist("abc");
        assert_eq!(
            checklist,
            vec![
                (PasswordRule::MinLength, false),
                (PasswordRule::Uppercase, false),
                (PasswordRule::Lowercase, true),
                (PasswordRule::Digit, false),
            ]
        );
    }
}
