// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Session store: the single source of truth for who is logged in.

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, SessionEvents};
use crate::models::{LoginCredentials, RegisterRequest, RegisterResponse, Session, User};
use crate::navigation::{Navigator, Route};
use crate::services::AuthService;
use crate::session::storage::{SessionStorage, ACCESS_TOKEN_KEY, USER_KEY};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;

/// Holds the current session and publishes every change to subscribers.
///
/// The store hydrates synchronously from storage when built and trusts the
/// persisted token until an API call proves otherwise. It also observes the
/// API client's refresh protocol: a refreshed token is persisted and a
/// failed refresh clears the session and sends the user home.
pub struct SessionStore {
    auth: AuthService,
    api: Arc<ApiClient>,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Session>,
    // Orders token persistence against clearing the session.
    persist_lock: Mutex<()>,
}

impl SessionStore {
    /// Build the store, hydrate it from `storage`, and register it as the
    /// API client's session observer.
    pub fn new(
        api: Arc<ApiClient>,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(Session {
            user: None,
            is_loading: true,
        });

        let store = Arc::new(Self {
            auth: AuthService::new(api.clone()),
            api,
            storage,
            navigator,
            state,
            persist_lock: Mutex::new(()),
        });

        store.hydrate();

        let weak: Weak<SessionStore> = Arc::downgrade(&store);
        let events: Weak<dyn SessionEvents> = weak;
        store.api.set_event_handler(events);

        store
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receive every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Log in and persist the session.
    ///
    /// On failure the session stays unauthenticated and the normalized error
    /// is returned (`INVALID_CREDENTIALS` for wrong email or password).
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.set_loading(true);

        let credentials = LoginCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = match self.auth.login(&credentials).await {
            Ok(response) => response,
            Err(err) => {
                tracing::info!(code = err.code(), "Login failed");
                self.set_loading(false);
                return Err(err);
            }
        };

        if let Err(err) = self.persist(&response.access_token, &response.user) {
            self.forget_persisted();
            self.set_loading(false);
            return Err(err);
        }

        self.api.set_access_token(Some(response.access_token));
        self.state.send_modify(|session| {
            session.user = Some(response.user.clone());
            session.is_loading = false;
        });

        tracing::info!(email = %response.user.email, "Logged in");
        Ok(response.user)
    }

    /// Create an account. The new user is not logged in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.set_loading(true);
        let result = self.auth.register(request).await;
        self.set_loading(false);

        match &result {
            Ok(_) => tracing::info!(email = %request.email, "Account registered"),
            Err(err) => tracing::info!(code = err.code(), "Registration failed"),
        }
        result
    }

    /// Log out locally, then tell the backend.
    ///
    /// The local session is always cleared; a backend failure is logged and
    /// otherwise ignored.
    pub async fn logout(&self) {
        self.set_loading(true);
        self.clear_local();

        if let Err(err) = self.auth.logout().await {
            tracing::warn!(error = %err, "Backend logout failed, but local logout completed");
        }

        self.set_loading(false);
        tracing::info!("Logged out");
    }

    /// Re-validate the persisted token against the backend and refresh the
    /// stored user.
    pub async fn validate(&self) -> Result<User> {
        let user = self.auth.me().await?;

        if let Some(token) = self.api.access_token() {
            self.persist(&token, &user)?;
        }
        self.state.send_modify(|session| session.user = Some(user.clone()));
        Ok(user)
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    /// Restore the session from storage without contacting the backend.
    fn hydrate(&self) {
        let token = self.read_key(ACCESS_TOKEN_KEY);
        let user = self.read_key(USER_KEY).and_then(|raw| {
            serde_json::from_str::<User>(&raw)
                .map_err(|e| tracing::warn!(error = %e, "Ignoring unreadable stored user"))
                .ok()
        });

        let user = match (token, user) {
            (Some(token), Some(user)) => {
                self.api.set_access_token(Some(token));
                tracing::info!(email = %user.email, "Session restored from storage");
                Some(user)
            }
            _ => None,
        };

        self.state.send_replace(Session {
            user,
            is_loading: false,
        });
    }

    fn read_key(&self, key: &str) -> Option<String> {
        self.storage
            .get(key)
            .map_err(|e| tracing::warn!(key, error = %e, "Failed to read session storage"))
            .ok()
            .flatten()
    }

    fn persist(&self, token: &str, user: &User) -> Result<()> {
        let user_json =
            serde_json::to_string(user).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.storage.set(ACCESS_TOKEN_KEY, token)?;
        self.storage.set(USER_KEY, &user_json)?;
        Ok(())
    }

    fn forget_persisted(&self) {
        for key in [ACCESS_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to clear session storage");
            }
        }
    }

    fn clear_local(&self) {
        {
            let _guard = self.persist_guard();
            self.api.end_session();
            self.forget_persisted();
        }
        self.state.send_modify(|session| session.user = None);
    }

    fn persist_guard(&self) -> MutexGuard<'_, ()> {
        self.persist_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_if_modified(|session| {
            std::mem::replace(&mut session.is_loading, is_loading) != is_loading
        });
    }
}

impl SessionEvents for SessionStore {
    fn token_refreshed(&self, access_token: Option<&str>) {
        let Some(token) = access_token else {
            return;
        };
        let _guard = self.persist_guard();
        // The session may have ended after the token was installed.
        if self.api.access_token().as_deref() == Some(token) {
            if let Err(e) = self.storage.set(ACCESS_TOKEN_KEY, token) {
                tracing::warn!(error = %e, "Failed to persist refreshed token");
            }
        }
    }

    fn session_expired(&self, error: &ClientError) {
        tracing::info!(error = %error, "Session expired, returning to entry page");
        self.clear_local();
        self.navigator.navigate(Route::Home);
    }
}
