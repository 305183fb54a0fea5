// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Mock API route handlers.

use super::error::{AppError, Result};
use super::middleware::AuthUser;
use super::tokens::{create_token, verify_token, TokenKind};
use super::{MockState, REFRESH_COOKIE};
use crate::forms::rules::{is_valid_email, missing_password_rules};
use crate::models::gallery::GalleryData;
use crate::models::{
    GalleryResponse, LoginCredentials, LoginResponse, RefreshResponse, RegisterRequest,
    RegisterResponse, User,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_PAGE_LIMIT: u32 = 12;
const MAX_PAGE_LIMIT: u32 = 100;

/// Routes that need no access token.
pub fn public() -> Router<Arc<MockState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/images/public", get(public_images))
}

/// Routes behind `require_auth`.
pub fn protected() -> Router<Arc<MockState>> {
    Router::new().route("/auth/me", get(me))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Sleep for the configured auth latency.
async fn simulate_latency(state: &MockState) {
    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }
}

fn refresh_cookie(state: &MockState, value: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies)
        .max_age(max_age)
        .build()
}

fn issue_access_token(state: &MockState, email: &str, epoch: u64) -> Result<String> {
    Ok(create_token(
        email,
        TokenKind::Access,
        epoch,
        state.next_token_id(),
        state.config.access_token_ttl,
        &state.config.jwt_signing_key,
    )?)
}

async fn login(
    State(state): State<Arc<MockState>>,
    jar: CookieJar,
    Json(credentials): Json<LoginCredentials>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    simulate_latency(&state).await;

    let user = state
        .authenticate(&credentials.email, &credentials.password)
        .ok_or_else(|| {
            tracing::info!(email = %credentials.email, "Rejected login");
            AppError::InvalidCredentials
        })?;

    let access_token = issue_access_token(&state, &user.email, state.access_epoch())?;
    let refresh_token = create_token(
        &user.email,
        TokenKind::Refresh,
        state.refresh_epoch(),
        state.next_token_id(),
        state.config.refresh_token_ttl,
        &state.config.jwt_signing_key,
    )?;

    let max_age = time::Duration::seconds(state.config.refresh_token_ttl.as_secs() as i64);
    let jar = jar.add(refresh_cookie(&state, refresh_token, max_age));

    tracing::info!(email = %user.email, "User logged in");
    Ok((jar, Json(LoginResponse { access_token, user })))
}

async fn register(
    State(state): State<Arc<MockState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    simulate_latency(&state).await;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if !is_valid_email(&request.email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    if let Some(rule) = missing_password_rules(&request.password).first() {
        return Err(AppError::WeakPassword(rule.message().to_string()));
    }

    let user = state
        .insert_user(
            name,
            &request.email,
            &request.password,
            request.display_name.as_deref(),
            request.phone.as_deref(),
        )
        .ok_or(AppError::EmailExists)?;

    tracing::info!(email = %user.email, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration successful".to_string(),
        }),
    ))
}

#[derive(Serialize)]
struct LogoutResponse {
    success: bool,
}

/// Always succeeds. Revokes the presented refresh token and expires the
/// cookie.
async fn logout(
    State(state): State<Arc<MockState>>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(cookie) = jar.get(REFRESH_COOKIE).filter(|c| !c.value().is_empty()) {
        state.revoke_refresh_token(cookie.value());
    }
    let jar = jar.add(refresh_cookie(&state, String::new(), time::Duration::ZERO));
    (jar, Json(LogoutResponse { success: true }))
}

async fn refresh(
    State(state): State<Arc<MockState>>,
    jar: CookieJar,
) -> Result<Json<RefreshResponse>> {
    state.count_refresh();

    let cookie = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty() && !state.is_revoked(v))
        .ok_or(AppError::InvalidRefreshToken)?;

    let claims = verify_token(&cookie, TokenKind::Refresh, &state.config.jwt_signing_key)
        .filter(|claims| claims.epoch == state.refresh_epoch())
        .ok_or(AppError::InvalidRefreshToken)?;

    let user = state
        .find_user(&claims.sub)
        .ok_or(AppError::InvalidRefreshToken)?;

    simulate_latency(&state).await;

    let epoch = if state.issues_stale_refreshes() {
        state.access_epoch().wrapping_sub(1)
    } else {
        state.access_epoch()
    };
    let access_token = issue_access_token(&state, &user.email, epoch)?;

    tracing::info!(email = %user.email, "Access token refreshed");
    Ok(Json(RefreshResponse {
        access_token: Some(access_token),
    }))
}

#[derive(Serialize)]
struct MeResponse {
    user: User,
}

async fn me(
    State(state): State<Arc<MockState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let user = state.find_user(&auth.email).ok_or(AppError::InvalidToken)?;
    Ok(Json(MeResponse { user }))
}

#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

async fn public_images(
    State(state): State<Arc<MockState>>,
    Query(query): Query<ImagesQuery>,
) -> Result<Json<GalleryResponse>> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

    if page < 1 {
        return Err(AppError::BadRequest("page must be at least 1".to_string()));
    }
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }

    let images = state.images();
    let offset = (page as usize - 1).saturating_mul(limit as usize);
    let data = images
        .iter()
        .skip(offset)
        .take(limit as usize)
        .cloned()
        .collect();

    Ok(Json(GalleryResponse {
        status: "success".to_string(),
        message: None,
        data: GalleryData {
            total: images.len() as u64,
            page,
            limit,
            data,
        },
    }))
}
