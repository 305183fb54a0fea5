// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! PixPro API client.
//!
//! Handles:
//! - Bearer token injection and the refresh cookie jar
//! - Transparent recovery from expired access tokens (single-flight refresh)
//! - Replaying requests that failed while a refresh was in flight
//! - Normalizing error bodies and transport failures into [`ClientError`]

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::http::single_flight::{Flight, SingleFlight};
use crate::models::RefreshResponse;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Requests to these endpoints never trigger a refresh on 401.
const REFRESH_BYPASS_PATHS: [&str; 4] = [REFRESH_PATH, LOGOUT_PATH, LOGIN_PATH, REGISTER_PATH];

const REFRESH_FLIGHT: &str = "refresh";

/// Observer for session-level outcomes of the refresh protocol.
pub trait SessionEvents: Send + Sync {
    /// A refresh succeeded. `access_token` is the new bearer token when the
    /// backend returned one in the body.
    fn token_refreshed(&self, access_token: Option<&str>);

    /// A refresh failed; the client no longer holds credentials.
    fn session_expired(&self, error: &ClientError);
}

/// A replayable request description.
///
/// Requests are rebuilt from this value on every dispatch so a replay after
/// a refresh carries the new access token.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    fn bypasses_refresh(&self) -> bool {
        REFRESH_BYPASS_PATHS
            .iter()
            .any(|path| self.path.contains(path))
    }
}

/// Bearer token plus the generation of the session it belongs to.
///
/// Ending a session bumps the generation, so a refresh that started under
/// an older generation can no longer install its token.
#[derive(Debug, Default)]
struct Credentials {
    access_token: Option<String>,
    generation: u64,
}

/// HTTP client for the PixPro backend with refresh coordination.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: RwLock<Credentials>,
    /// At most one refresh in flight; 401s during the window queue here.
    refresh_flights: SingleFlight<&'static str, Result<()>>,
    events: OnceLock<Weak<dyn SessionEvents>>,
}

impl ApiClient {
    /// Create a client for the base URL resolved from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, config.base_url())
    }

    /// Create a client against an explicit base URL.
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::info!(base_url = %base_url, "API client initialized");

        Ok(Self {
            http,
            base_url,
            credentials: RwLock::new(Credentials::default()),
            refresh_flights: SingleFlight::new(),
            events: OnceLock::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register the observer for refresh outcomes. Only the first call wins.
    pub fn set_event_handler(&self, handler: Weak<dyn SessionEvents>) {
        if self.events.set(handler).is_err() {
            tracing::warn!("Session event handler already registered, ignoring");
        }
    }

    fn credentials(&self) -> RwLockReadGuard<'_, Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn credentials_mut(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Install a token for the current session.
    pub fn set_access_token(&self, token: Option<String>) {
        self.credentials_mut().access_token = token;
    }

    pub fn access_token(&self) -> Option<String> {
        self.credentials().access_token.clone()
    }

    /// Drop the token and start a new session generation. A refresh still
    /// in flight will not install its result.
    pub fn end_session(&self) {
        let mut credentials = self.credentials_mut();
        credentials.access_token = None;
        credentials.generation += 1;
    }

    fn generation(&self) -> u64 {
        self.credentials().generation
    }

    /// Install a refreshed token unless the session ended meanwhile.
    fn install_refreshed(&self, token: Option<String>, generation: u64) -> bool {
        let mut credentials = self.credentials_mut();
        if credentials.generation != generation {
            return false;
        }
        if token.is_some() {
            credentials.access_token = token;
        }
        true
    }

    /// End the session after a failed refresh, unless it already ended.
    fn expire_generation(&self, generation: u64) -> bool {
        let mut credentials = self.credentials_mut();
        if credentials.generation != generation {
            return false;
        }
        credentials.access_token = None;
        credentials.generation += 1;
        true
    }

    /// Whether a refresh call is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.refresh_flights.is_in_flight(&REFRESH_FLIGHT)
    }

    // ─── Verb helpers ────────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(&ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.execute(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.execute(&ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.execute(&ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(&ApiRequest::delete(path)).await
    }

    // ─── Dispatch ────────────────────────────────────────────────────────────

    /// Send a request, recovering once from an expired access token.
    ///
    /// On 401:
    /// 1. Auth endpoints (refresh, logout, login, register) fail immediately
    /// 2. If the token changed since the request was sent, replay with the
    ///    new one; if the session ended meanwhile, fail as expired
    /// 3. Otherwise start or join the single in-flight refresh
    /// 4. On refresh success, replay the request once; a second 401 is final
    /// 5. On refresh failure, return the session-expired error
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let sent_with = self.access_token();
        let response = self.dispatch(request, sent_with.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.bypasses_refresh() {
            return Self::decode(response).await;
        }

        match self.access_token() {
            current if current == sent_with => {
                tracing::debug!(path = %request.path, "Unauthorized response, recovering session");
                self.recover_session(sent_with.as_deref()).await?;
            }
            Some(_) => {
                tracing::debug!(path = %request.path, "Token changed since dispatch, replaying");
            }
            None => {
                return Err(ClientError::SessionExpired(
                    "Session ended before the request completed".to_string(),
                ));
            }
        }

        let replay = self.dispatch(request, self.access_token().as_deref()).await?;
        Self::decode(replay).await
    }

    /// Build and send one attempt of `request` with `token`.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))
    }

    /// Start or join the refresh for this 401 window.
    ///
    /// `sent_with` is the token the rejected request carried.
    async fn recover_session(&self, sent_with: Option<&str>) -> Result<()> {
        match self.refresh_flights.start_or_join(REFRESH_FLIGHT) {
            Flight::Follower(outcome) => {
                tracing::debug!("Refresh already in flight, queueing request");
                outcome.await.unwrap_or_else(|_| {
                    Err(ClientError::SessionExpired(
                        "Session refresh was abandoned".to_string(),
                    ))
                })
            }
            Flight::Leader(leader) => {
                // A refresh or logout may have settled since the 401.
                let current = self.access_token();
                if current.as_deref() != sent_with {
                    let outcome = match current {
                        Some(_) => Ok(()),
                        None => Err(ClientError::SessionExpired(
                            "Session ended before the refresh started".to_string(),
                        )),
                    };
                    leader.drain(outcome.clone());
                    return outcome;
                }

                let generation = self.generation();
                let outcome = match self.refresh().await {
                    Ok(token) if self.install_refreshed(token.clone(), generation) => {
                        self.emit(|events| events.token_refreshed(token.as_deref()));
                        tracing::info!("Session refreshed");
                        Ok(())
                    }
                    Ok(_) => {
                        tracing::info!("Session ended during refresh, discarding refreshed token");
                        Err(ClientError::SessionExpired(
                            "Session ended during refresh".to_string(),
                        ))
                    }
                    Err(err) => {
                        let expired = ClientError::SessionExpired(err.to_string());
                        tracing::warn!(error = %err, "Session refresh failed");
                        if self.expire_generation(generation) {
                            self.emit(|events| events.session_expired(&expired));
                        }
                        Err(expired)
                    }
                };

                let released = leader.drain(outcome.clone());
                if released > 0 {
                    tracing::debug!(released, "Released queued requests");
                }
                outcome
            }
        }
    }

    /// Call the refresh endpoint. The refresh token travels in the cookie jar.
    async fn refresh(&self) -> Result<Option<String>> {
        tracing::info!("Access token rejected, refreshing session");
        let response = self
            .dispatch(&ApiRequest::post(REFRESH_PATH), None)
            .await?;
        let refreshed: RefreshResponse = Self::decode(response).await?;
        Ok(refreshed.access_token)
    }

    fn emit(&self, f: impl FnOnce(&dyn SessionEvents)) {
        if let Some(events) = self.events.get().and_then(Weak::upgrade) {
            f(&*events);
        }
    }

    /// Check status and parse the JSON body.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::from_response_body(status, &body);
            tracing::warn!(status = status.as_u16(), code = err.code(), message = %err, "API error");
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;

        // Empty bodies decode as JSON null so unit and Option targets work.
        let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

        serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_endpoints_bypass_refresh() {
        assert!(ApiRequest::post(REFRESH_PATH).bypasses_refresh());
        assert!(ApiRequest::post(LOGOUT_PATH).bypasses_refresh());
        assert!(ApiRequest::post(LOGIN_PATH).bypasses_refresh());
        assert!(ApiRequest::post(REGISTER_PATH).bypasses_refresh());
        assert!(!ApiRequest::get("/auth/me").bypasses_refresh());
        assert!(!ApiRequest::get("/images/public").bypasses_refresh());
    }

    #[test]
    fn test_request_builder_collects_query_and_body() {
        let request = ApiRequest::get("/images/public")
            .query("page", 2)
            .query("limit", 12);
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "12".to_string())
            ]
        );

        let request = ApiRequest::post(LOGIN_PATH)
            .json(&serde_json::json!({ "email": "user@example.com" }))
            .unwrap();
        assert_eq!(request.body.unwrap()["email"], "user@example.com");
    }

    #[tokio::test]
    async fn test_token_is_stored() {
        let client = ApiClient::new(&Config::test_default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
        assert!(client.access_token().is_none());

        client.set_access_token(Some("abc".to_string()));
        assert_eq!(client.access_token().as_deref(), Some("abc"));
        assert!(!client.is_refreshing());
    }

    #[test]
    fn test_ended_session_rejects_refreshed_token() {
        let client = ApiClient::new(&Config::test_default()).unwrap();
        client.set_access_token(Some("stale".to_string()));

        let generation = client.generation();
        client.end_session();

        assert!(!client.install_refreshed(Some("fresh".to_string()), generation));
        assert!(client.access_token().is_none());
        assert!(!client.expire_generation(generation));

        let current = client.generation();
        assert!(client.install_refreshed(Some("fresh".to_string()), current));
        assert_eq!(client.access_token().as_deref(), Some("fresh"));
    }
}
