// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client secret lookup capability.
//!
//! The gate resolves an issuer's shared secret through [`SecretLookup`]. Each
//! deployment provides exactly one implementation (see
//! [`crate::store::InMemorySecretStore`]).

use async_trait::async_trait;

/// Shared secret registered for a client application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecretRecord {
    /// Issuer identifier the client puts in `iss`.
    pub issuer: String,
    /// HMAC secret. `None` means the client exists but is not authorised.
    pub secret: Option<Vec<u8>>,
    /// Audience this client must target. Falls back to the platform audience.
    pub audience: Option<String>,
}

impl ClientSecretRecord {
    pub fn new(issuer: impl Into<String>, secret: Option<Vec<u8>>) -> Self {
        Self {
            issuer: issuer.into(),
            secret,
            audience: None,
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

/// Infrastructure failure while resolving a secret.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    #[error("secret lookup timed out")]
    TimedOut,
}

/// Resolves client secrets by issuer.
///
/// `Ok(None)` means the issuer is unknown. `Err` means the lookup itself
/// could not be performed and is reported to callers as an outage, not as
/// a rejection of the client.
#[async_trait]
pub trait SecretLookup: Send + Sync {
    async fn lookup(&self, issuer: &str) -> Result<Option<ClientSecretRecord>, LookupError>;
}
