// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Application configuration loaded from environment variables.
//!
//! The client resolves its API base URL from where it runs: a browser
//! pointed at a raw IPv4 address talks to that address directly, a browser
//! on a named deployment host uses the configured URL, and server-side code
//! talks to localhost.

use std::env;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout (connect + response).
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Items per gallery page.
const DEFAULT_GALLERY_PAGE_SIZE: u32 = 12;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Full API URL for named deployment hosts
    pub api_url: String,
    /// API port, used for IP-addressed and server-side hosts
    pub api_port: u16,
    /// Where the client runs
    pub client_host: ClientHost,
    /// Fixed transport timeout
    pub request_timeout: Duration,
    /// Gallery page size
    pub gallery_page_size: u32,
    /// Session file used by the CLI shell
    pub session_file: PathBuf,
}

/// Where the client is running, which decides the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientHost {
    /// Server-side rendering or a CLI on the API machine.
    Server,
    /// A browser-like client that loaded the site from `hostname`.
    Browser { hostname: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("PIXPRO_API_URL").ok_or(ConfigError::Missing("PIXPRO_API_URL"))?;
        let api_port = lookup("PIXPRO_API_PORT")
            .ok_or(ConfigError::Missing("PIXPRO_API_PORT"))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("PIXPRO_API_PORT"))?;

        let client_host = match lookup("PIXPRO_CLIENT_HOST") {
            Some(hostname) if !hostname.trim().is_empty() => ClientHost::Browser {
                hostname: hostname.trim().to_string(),
            },
            _ => ClientHost::Server,
        };

        let timeout_ms = lookup("PIXPRO_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let gallery_page_size = lookup("PIXPRO_GALLERY_PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_GALLERY_PAGE_SIZE);

        let session_file = lookup("PIXPRO_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".pixpro/session.json"));

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_port,
            client_host,
            request_timeout: Duration::from_millis(timeout_ms),
            gallery_page_size,
            session_file,
        })
    }

    /// Config pointing at an explicit base URL, for tests and the mock API.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_url: base_url.trim_end_matches('/').to_string(),
            client_host: ClientHost::Browser {
                hostname: "pixpro.local".to_string(),
            },
            ..Self::test_default()
        }
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_url: "http://localhost:3001/api".to_string(),
            api_port: 3001,
            client_host: ClientHost::Server,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            gallery_page_size: DEFAULT_GALLERY_PAGE_SIZE,
            session_file: PathBuf::from(".pixpro/session.json"),
        }
    }

    /// Resolve the base URL every request is issued against.
    pub fn base_url(&self) -> String {
        match &self.client_host {
            ClientHost::Browser { hostname } if is_ipv4(hostname) => {
                format!("http://{}:{}", hostname, self.api_port)
            }
            ClientHost::Browser { .. } => self.api_url.clone(),
            ClientHost::Server => format!("http://localhost:{}", self.api_port),
        }
    }
}

fn is_ipv4(hostname: &str) -> bool {
    hostname.parse::<Ipv4Addr>().is_ok()
}

/// Mock backend configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// JWT signing key for access and refresh tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Artificial latency on auth endpoints
    pub latency: Duration,
    /// Serve cookies with the `Secure` attribute
    pub secure_cookies: bool,
}

impl ServerConfig {
    /// Load mock backend configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::test_default();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.access_token_ttl),
            refresh_token_ttl: defaults.refresh_token_ttl,
            latency: env::var("MOCK_LATENCY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(700)),
            secure_cookies: env::var("FRONTEND_URL")
                .map(|url| url.starts_with("https://"))
                .unwrap_or(false),
        })
    }

    /// Default mock backend config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 0,
            frontend_url: "http://localhost:3000".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            latency: Duration::ZERO,
            secure_cookies: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
