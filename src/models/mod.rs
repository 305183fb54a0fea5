// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Wire and session data models.

pub mod auth;
pub mod gallery;
pub mod user;

pub use auth::{
    LoginCredentials, LoginResponse, RefreshResponse, RegisterRequest, RegisterResponse,
};
pub use gallery::{GalleryPage, GalleryResponse, ImageRecord};
pub use user::{Session, User};
