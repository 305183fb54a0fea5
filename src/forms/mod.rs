// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Client-side form state and validation.
//!
//! Validation errors stay inside the form: callers only see whether the form
//! is valid and the per-field messages to render.

pub mod rules;

use rules::{validate_email, validate_login_password, validate_name, validate_new_password};
use std::collections::{BTreeMap, BTreeSet};
use validator::{Validate, ValidationErrors};

pub use rules::{
    is_strong_password, missing_password_rules, password_checklist, PasswordRule,
};

/// A form whose fields can be set by name.
pub trait FormModel: Validate + Default + Clone {
    /// Field names, in display order.
    const FIELDS: &'static [&'static str];

    /// Set `field` to `value`; returns false for unknown fields.
    fn set_field(&mut self, field: &str, value: &str) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(custom(function = "validate_login_password"))]
    pub password: String,
}

impl FormModel for LoginForm {
    const FIELDS: &'static [&'static str] = &["email", "password"];

    fn set_field(&mut self, field: &str, value: &str) -> bool {
        match field {
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct RegisterForm {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(custom(function = "validate_new_password"))]
    pub password: String,
}

impl FormModel for RegisterForm {
    const FIELDS: &'static [&'static str] = &["name", "email", "password"];

    fn set_field(&mut self, field: &str, value: &str) -> bool {
        match field {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ForgotPasswordForm {
    #[validate(custom(function = "validate_email"))]
    pub email: String,
}

impl FormModel for ForgotPasswordForm {
    const FIELDS: &'static [&'static str] = &["email"];

    fn set_field(&mut self, field: &str, value: &str) -> bool {
        match field {
            "email" => self.email = value.to_string(),
            _ => return false,
        }
        true
    }
}

/// First message per field.
pub fn field_errors(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

/// Values, per-field errors and touched fields of one form.
#[derive(Debug, Clone)]
pub struct FormState<F: FormModel> {
    initial: F,
    values: F,
    errors: BTreeMap<String, String>,
    touched: BTreeSet<String>,
}

impl<F: FormModel> Default for FormState<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: FormModel> FormState<F> {
    pub fn new(initial: F) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
        }
    }

    pub fn values(&self) -> &F {
        &self.values
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Update a field; typing clears that field's error.
    pub fn handle_change(&mut self, field: &str, value: &str) {
        if self.values.set_field(field, value) {
            self.errors.remove(field);
        } else {
            tracing::debug!(field, "Ignoring change to unknown form field");
        }
    }

    /// Mark a field touched and validate just that field.
    pub fn handle_blur(&mut self, field: &str) {
        self.touched.insert(field.to_string());

        let message = match self.values.validate() {
            Ok(()) => None,
            Err(errors) => field_errors(&errors).remove(field),
        };

        match message {
            Some(message) => {
                self.errors.insert(field.to_string(), message);
            }
            None => {
                self.errors.remove(field);
            }
        }
    }

    /// Validate every field and mark all of them touched.
    pub fn validate_form(&mut self) -> bool {
        self.touched = F::FIELDS.iter().map(|f| f.to_string()).collect();
        self.errors = match self.values.validate() {
            Ok(()) => BTreeMap::new(),
            Err(errors) => field_errors(&errors),
        };
        self.errors.is_empty()
    }

    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_login_form_reports_required_fields() {
        let mut form = FormState::<LoginForm>::default();

        assert!(!form.validate_form());
        assert_eq!(form.error("email"), Some("Email is required"));
        assert_eq!(form.error("password"), Some("Password is required"));
        assert!(form.is_touched("email"));
        assert!(form.is_touched("password"));
    }

    #[test]
    fn test_change_clears_field_error() {
        let mut form = FormState::<LoginForm>::default();
        form.validate_form();

        form.handle_change("email", "user@example.com");

        assert_eq!(form.error("email"), None);
        assert_eq!(form.error("password"), Some("Password is required"));
    }

    #[test]
    fn test_blur_validates_only_that_field() {
        let mut form = FormState::<RegisterForm>::default();
        form.handle_change("email", "not-an-email");
        form.handle_blur("email");

        assert_eq!(form.error("email"), Some("Invalid email format"));
        assert_eq!(form.error("name"), None);
        assert!(!form.is_touched("name"));

        form.handle_change("email", "ok@example.com");
        form.handle_blur("email");
        assert_eq!(form.error("email"), None);
    }

    #[test]
    fn test_valid_register_form() {
        let mut form = FormState::<RegisterForm>::default();
        form.handle_change("name", "Ana Perez");
        form.handle_change("email", "ana@example.com");
        form.handle_change("password", "Password1");

        assert!(form.validate_form());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut form = FormState::new(ForgotPasswordForm {
            email: "start@example.com".to_string(),
        });
        form.handle_change("email", "");
        form.validate_form();

        form.reset();

        assert_eq!(form.values().email, "start@example.com");
        assert!(form.errors().is_empty());
        assert!(!form.is_touched("email"));
    }
}
