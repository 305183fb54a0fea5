// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Login, register and forgot-password flows.

use super::display_message;
use crate::forms::{
    password_checklist, FormState, ForgotPasswordForm, LoginForm, PasswordRule, RegisterForm,
};
use crate::models::RegisterRequest;
use crate::navigation::Route;
use crate::AppContext;

/// Login page state.
#[derive(Debug, Default)]
pub struct LoginPage {
    pub form: FormState<LoginForm>,
    /// Inline error from the last submit.
    pub error: Option<String>,
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, log in, and go to the dashboard.
    ///
    /// Returns the route navigated to, or `None` when the page stays put.
    pub async fn submit(&mut self, ctx: &AppContext) -> Option<Route> {
        self.error = None;
        if !self.form.validate_form() {
            return None;
        }

        let values = self.form.values().clone();
        match ctx.session.login(&values.email, &values.password).await {
            Ok(_) => {
                ctx.notifier.success("Welcome back!");
                ctx.navigator.navigate(Route::Dashboard);
                Some(Route::Dashboard)
            }
            Err(err) => {
                let message = display_message(&err, "Login failed");
                ctx.notifier.error(&message);
                self.error = Some(message);
                None
            }
        }
    }
}

/// Register page state.
#[derive(Debug, Default)]
pub struct RegisterPage {
    pub form: FormState<RegisterForm>,
    pub error: Option<String>,
}

impl RegisterPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live password strength indicators; empty until something is typed.
    pub fn password_checklist(&self) -> Vec<(PasswordRule, bool)> {
        let password = &self.form.values().password;
        if password.is_empty() {
            return Vec::new();
        }
        password_checklist(password)
    }

    /// Validate, register, and send the user to the login page.
    pub async fn submit(&mut self, ctx: &AppContext) -> Option<Route> {
        self.error = None;
        if !self.form.validate_form() {
            return None;
        }

        let values = self.form.values();
        let request = RegisterRequest {
            name: values.name.trim().to_string(),
            email: values.email.trim().to_string(),
            password: values.password.clone(),
            display_name: None,
            phone: None,
        };

        match ctx.session.register(&request).await {
            Ok(_) => {
                ctx.notifier
                    .success("Registration successful! You can now sign in");
                ctx.navigator.navigate(Route::Login);
                Some(Route::Login)
            }
            Err(err) => {
                let message = display_message(&err, "Registration failed");
                ctx.notifier.error(&message);
                self.error = Some(message);
                None
            }
        }
    }
}

/// Forgot-password page state. There is no reset endpoint yet, so a valid
/// submit only switches the page to its "check your inbox" state.
#[derive(Debug, Default)]
pub struct ForgotPasswordPage {
    pub form: FormState<ForgotPasswordForm>,
    pub submitted: bool,
}

impl ForgotPasswordPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self) -> bool {
        if !self.form.validate_form() {
            return false;
        }
        tracing::info!(email = %self.form.values().email, "Password reset requested");
        self.submitted = true;
        true
    }

    /// Address the instructions were sent to, once submitted.
    pub fn sent_to(&self) -> Option<&str> {
        self.submitted.then(|| self.form.values().email.as_str())
    }
}
