// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! JWT access and refresh tokens.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (normalized email)
    pub sub: String,
    pub kind: TokenKind,
    /// Generation counter; bumping the server's counter revokes older tokens
    pub epoch: u64,
    /// Unique token id
    pub jti: u64,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Create a signed token.
pub fn create_token(
    subject: &str,
    kind: TokenKind,
    epoch: u64,
    jti: u64,
    ttl: Duration,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: subject.to_string(),
        kind,
        epoch,
        jti,
        iat: now,
        exp: now + ttl.as_secs() as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify signature, expiry and kind.
pub fn verify_token(token: &str, kind: TokenKind, signing_key: &[u8]) -> Option<Claims> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
        .filter(|claims| claims.kind == kind)
}
