// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Services module - backend-facing calls.

pub mod auth;
pub mod gallery;

pub use auth::AuthService;
pub use gallery::GalleryService;
