// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! In-process stand-in for the PixPro backend.
//!
//! Serves the auth endpoints (with a refresh token in an HTTP-only cookie)
//! and the public image listing, with knobs for expiring and revoking
//! tokens so the client's refresh protocol can be driven end to end.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod tokens;

use crate::config::ServerConfig;
use crate::models::{ImageRecord, User};
use axum::http::{header, Method};
use axum::{middleware as axum_middleware, Router};
use dashmap::{DashMap, DashSet};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "pixpro_refresh";

/// Images seeded into the public gallery by default.
pub const DEFAULT_IMAGE_COUNT: usize = 30;

/// Seeded demo account.
pub const DEMO_EMAIL: &str = "user@example.com";
pub const DEMO_PASSWORD: &str = "Password1";

#[derive(Debug, Clone)]
struct MockUser {
    id: String,
    name: String,
    email: String,
    display_name: Option<String>,
    phone: Option<String>,
    password_hash: String,
}

impl MockUser {
    fn to_user(&self) -> User {
        User {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Shared mock backend state.
pub struct MockState {
    pub config: ServerConfig,
    users: DashMap<String, MockUser>,
    next_user_id: AtomicUsize,
    next_token_id: AtomicU64,
    images: Vec<ImageRecord>,
    refresh_calls: AtomicUsize,
    access_epoch: AtomicU64,
    refresh_epoch: AtomicU64,
    revoked_refresh_tokens: DashSet<String>,
    stale_refreshes: AtomicBool,
    rejections: AtomicUsize,
    rejection_delay_ms: AtomicU64,
}

impl MockState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_image_count(config, DEFAULT_IMAGE_COUNT)
    }

    pub fn with_image_count(config: ServerConfig, image_count: usize) -> Self {
        let state = Self {
            config,
            users: DashMap::new(),
            next_user_id: AtomicUsize::new(1),
            next_token_id: AtomicU64::new(1),
            images: seed_images(image_count),
            refresh_calls: AtomicUsize::new(0),
            access_epoch: AtomicU64::new(0),
            refresh_epoch: AtomicU64::new(0),
            revoked_refresh_tokens: DashSet::new(),
            stale_refreshes: AtomicBool::new(false),
            rejections: AtomicUsize::new(0),
            rejection_delay_ms: AtomicU64::new(0),
        };

        state.insert_user("Demo User", DEMO_EMAIL, DEMO_PASSWORD, Some("Demo"), None);
        state.insert_user("Admin", "admin@pixpro.com", "AdminPass1", None, None);
        state.insert_user("Taken", "taken@example.com", "TakenPass1", None, None);
        state
    }

    // ─── Test knobs ──────────────────────────────────────────────────────────

    /// Number of `POST /auth/refresh` calls served so far.
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Invalidate every access token issued so far.
    pub fn expire_access_tokens(&self) {
        self.access_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Invalidate every refresh cookie issued so far.
    pub fn revoke_refresh_tokens(&self) {
        self.refresh_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Make refresh hand out access tokens that are already invalid.
    pub fn serve_stale_refreshes(&self, stale: bool) {
        self.stale_refreshes.store(stale, Ordering::SeqCst);
    }

    /// Hold back every bearer rejection after the first by `delay`.
    pub fn stagger_rejections(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.rejection_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    fn access_epoch(&self) -> u64 {
        self.access_epoch.load(Ordering::SeqCst)
    }

    fn refresh_epoch(&self) -> u64 {
        self.refresh_epoch.load(Ordering::SeqCst)
    }

    fn next_token_id(&self) -> u64 {
        self.next_token_id.fetch_add(1, Ordering::SeqCst)
    }

    fn count_refresh(&self) {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn revoke_refresh_token(&self, token: &str) {
        self.revoked_refresh_tokens.insert(token.to_string());
    }

    fn is_revoked(&self, token: &str) -> bool {
        self.revoked_refresh_tokens.contains(token)
    }

    fn issues_stale_refreshes(&self) -> bool {
        self.stale_refreshes.load(Ordering::SeqCst)
    }

    /// Delay owed by the next bearer rejection.
    fn next_rejection_delay(&self) -> Option<Duration> {
        let nth = self.rejections.fetch_add(1, Ordering::SeqCst);
        let millis = self.rejection_delay_ms.load(Ordering::SeqCst);
        (nth > 0 && millis > 0).then(|| Duration::from_millis(millis))
    }

    fn insert_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        display_name: Option<&str>,
        phone: Option<&str>,
    ) -> Option<User> {
        let key = normalize_email(email);
        match self.users.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
                let user = MockUser {
                    id: format!("user-{}", id),
                    name: name.to_string(),
                    email: key.clone(),
                    display_name: display_name.map(str::to_string),
                    phone: phone.map(str::to_string),
                    password_hash: hash_password(&key, password),
                };
                let public = user.to_user();
                slot.insert(user);
                Some(public)
            }
        }
    }

    fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        let key = normalize_email(email);
        let user = self.users.get(&key)?;
        let candidate = hash_password(&key, password);
        let matches: bool = candidate
            .as_bytes()
            .ct_eq(user.password_hash.as_bytes())
            .into();
        matches.then(|| user.to_user())
    }

    fn find_user(&self, email: &str) -> Option<User> {
        self.users
            .get(&normalize_email(email))
            .map(|user| user.to_user())
    }

    fn images(&self) -> &[ImageRecord] {
        &self.images
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Salted SHA-256 of the password, hex encoded. The email is the salt.
fn hash_password(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn seed_images(count: usize) -> Vec<ImageRecord> {
    (1..=count)
        .map(|n| {
            let file_name = format!("sample-{:02}.jpg", n);
            let url = format!("https://cdn.pixpro.app/public/{}", file_name);
            ImageRecord {
                id: format!("img-{}", n),
                signed_url: format!("{}?sig={}", url, hex::encode(Sha256::digest(url.as_bytes()))),
                url,
                file_name,
                mime_type: "image/jpeg".to_string(),
                size: 1_048_576 + n as u64 * 4096,
                user_id: "user-1".to_string(),
                project_id: (n % 2 == 0).then(|| "project-1".to_string()),
                tags: vec!["sample".to_string()],
            }
        })
        .collect()
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<MockState>) -> Router {
    // Allow the configured frontend plus local development origins
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    let protected_routes = routes::protected()
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(routes::public())
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(middleware::add_security_headers))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Bind and serve the mock API until the process exits.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(MockState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Mock API listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
