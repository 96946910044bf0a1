// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the bearer token on a WebSocket upgrade to a user identity.
//! Session/token validation is an external identity provider's job; this
//! crate only defines the seam the daemon's connection accept path calls.

use async_trait::async_trait;
use doc_core::UserId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The resolved caller: a known user, or anonymous (permitted only for
/// curated example documents — §4.8's authorization rule).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(UserId),
    Anonymous,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    Expired,
    #[error("token malformed or signature invalid")]
    Invalid,
}

#[async_trait]
pub trait AuthResolver: Send + Sync + 'static {
    /// `token` is `None` when the client connected without an `Authorization`
    /// header; callers still get `Ok(Principal::Anonymous)` so that only the
    /// document-ownership check (not the handshake) enforces access.
    async fn resolve(&self, token: Option<&str>) -> Result<Principal, AuthError>;
}

/// `JWT_SECRET` / `JWT_EXPIRATION_HOURS` from §6's configuration table —
/// kept local to this module rather than folded into `doc_core::Config`
/// since nothing outside the auth collaborator ever reads them.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn from_env() -> Option<Self> {
        let secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty())?;
        let expiration_hours =
            std::env::var("JWT_EXPIRATION_HOURS").ok().and_then(|v| v.parse().ok()).unwrap_or(24);
        Some(Self { secret, expiration_hours })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: u64,
}

/// Resolves a bearer token as an HS256 JWT carrying a user id in `sub`.
/// Session minting (the `encode` side) belongs to the HTTP login surface,
/// out of this core's scope (§6); this resolver only ever verifies.
pub struct JwtAuthResolver {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthResolver {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl AuthResolver for JwtAuthResolver {
    async fn resolve(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let Some(token) = token else {
            return Ok(Principal::Anonymous);
        };
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            }
        })?;
        let user_id = UserId::parse(&data.claims.sub).map_err(|_| AuthError::Invalid)?;
        Ok(Principal::User(user_id))
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Maps opaque bearer tokens to a fixed user id; any other non-empty
    /// token is treated as invalid, `None`/empty as anonymous.
    #[derive(Default)]
    pub struct FakeAuthResolver {
        tokens: Mutex<HashMap<String, UserId>>,
    }

    impl FakeAuthResolver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn register(&self, token: impl Into<String>, user_id: UserId) {
            self.tokens.lock().insert(token.into(), user_id);
        }
    }

    #[async_trait]
    impl AuthResolver for FakeAuthResolver {
        async fn resolve(&self, token: Option<&str>) -> Result<Principal, AuthError> {
            match token {
                None => Ok(Principal::Anonymous),
                Some(t) => match self.tokens.lock().get(t) {
                    Some(id) => Ok(Principal::User(*id)),
                    None => Err(AuthError::Invalid),
                },
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAuthResolver;

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
