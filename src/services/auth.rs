// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Backend-facing authentication calls.

use crate::error::Result;
use crate::http::client::{LOGIN_PATH, LOGOUT_PATH, REGISTER_PATH};
use crate::http::ApiClient;
use crate::models::{LoginCredentials, LoginResponse, RegisterRequest, RegisterResponse, User};
use serde::Deserialize;
use std::sync::Arc;

pub const ME_PATH: &str = "/auth/me";

/// Thin wrapper over the auth endpoints.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
}

#[derive(Debug, Deserialize)]
struct LogoutResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeResponse {
    Wrapped { user: User },
    Bare(User),
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Exchange credentials for an access token and the user profile.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse> {
        tracing::debug!(email = %credentials.email, "Logging in");
        self.api.post(LOGIN_PATH, credentials).await
    }

    /// Create an account. Does not log the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        tracing::debug!(email = %request.email, "Registering account");
        self.api.post(REGISTER_PATH, request).await
    }

    /// Tell the backend to drop the refresh cookie.
    pub async fn logout(&self) -> Result<()> {
        let response: Option<LogoutResponse> =
            self.api.post(LOGOUT_PATH, &serde_json::json!({})).await?;
        if let Some(response) = response {
            tracing::debug!(success = response.success, "Backend logout acknowledged");
        }
        Ok(())
    }

    /// Fetch the user behind the current access token.
    ///
    /// Goes through the refresh protocol, so an expired token is renewed
    /// transparently when the refresh cookie is still valid.
    pub async fn me(&self) -> Result<User> {
        let response: MeResponse = self.api.get(ME_PATH).await?;
        Ok(match response {
            MeResponse::Wrapped { user } => user,
            MeResponse::Bare(user) => user,
        })
    }
}
