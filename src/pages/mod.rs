// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Page flows: what each page does on submit, where it navigates and which
//! toast it raises. Rendering is left to the UI layer.

pub mod auth;
pub mod dashboard;
pub mod gallery;

pub use auth::{ForgotPasswordPage, LoginPage, RegisterPage};
pub use dashboard::{DashboardPage, HomePage};
pub use gallery::GalleryView;

use crate::error::ClientError;

/// Message to show for a failed call, with a page-specific fallback.
fn display_message(err: &ClientError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
