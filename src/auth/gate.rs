// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token validation.
//!
//! ## Checks (in order, first failure wins)
//!
//! 1. `Authorization` header present
//! 2. Header shaped `Bearer <token>`
//! 3. Token decodes as a compact token
//! 4. `iss` present and well formed
//! 5. Issuer resolves through the [`SecretLookup`]
//! 6. Client has a secret
//! 7. HS256 signature matches the normalised secret
//! 8. `aud` matches
//! 9. `exp` not in the past

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;

use super::claims::{CompactToken, IssuerFormat};
use super::error::GateError;
use super::lookup::{LookupError, SecretLookup};
use super::secret::verify_hs256;

/// Scheme prefix, including the single separating space.
const BEARER_PREFIX: &str = "Bearer ";

/// The only accepted signing algorithm.
const HS256: &str = "HS256";

/// Default upper bound for one secret lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Gate configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Audience every token must carry unless the client record overrides it.
    pub expected_audience: String,
    /// Shape of issuer identifiers in this deployment.
    pub issuer_format: IssuerFormat,
    /// Timeout applied to each secret lookup.
    pub lookup_timeout: Duration,
}

impl GateConfig {
    pub fn new(expected_audience: impl Into<String>) -> Self {
        Self {
            expected_audience: expected_audience.into(),
            issuer_format: IssuerFormat::Any,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_issuer_format(mut self, format: IssuerFormat) -> Self {
        self.issuer_format = format;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}

/// Validates client bearer tokens against registered secrets.
#[derive(Clone)]
pub struct BearerGate {
    config: GateConfig,
    secrets: Arc<dyn SecretLookup>,
}

impl BearerGate {
    pub fn new(config: GateConfig, secrets: Arc<dyn SecretLookup>) -> Self {
        Self { config, secrets }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Validate an `Authorization` header and return the verified issuer.
    pub async fn authenticate(&self, header: Option<&HeaderValue>) -> Result<String, GateError> {
        self.authenticate_at(header, chrono::Utc::now().timestamp())
            .await
    }

    /// Same as [`authenticate`](Self::authenticate) with an explicit clock
    /// (Unix seconds) for the expiry check.
    pub async fn authenticate_at(
        &self,
        header: Option<&HeaderValue>,
        now: i64,
    ) -> Result<String, GateError> {
        let header = header.ok_or(GateError::MissingAuthHeader)?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(GateError::MalformedAuthHeader)?;

        let token = CompactToken::parse(token).ok_or(GateError::InvalidToken)?;
        let claims = token.claims();

        let issuer = claims
            .iss
            .as_deref()
            .and_then(|iss| self.config.issuer_format.normalise(iss))
            .ok_or(GateError::InvalidIssuer)?;

        let record = match tokio::time::timeout(
            self.config.lookup_timeout,
            self.secrets.lookup(&issuer),
        )
        .await
        .unwrap_or(Err(LookupError::TimedOut))
        {
            Ok(Some(record)) => record,
            Ok(None) => return Err(GateError::UnknownIssuer),
            Err(e) => {
                tracing::warn!(issuer = %issuer, error = %e, "Client secret lookup failed");
                return Err(GateError::ServiceUnavailable);
            }
        };

        let secret = record.secret.as_deref().ok_or(GateError::NoSecret)?;

        if token.algorithm() != Some(HS256)
            || !verify_hs256(secret, token.signing_input(), token.signature())
        {
            return Err(GateError::InvalidSignature);
        }

        let expected_audience = record
            .audience
            .as_deref()
            .unwrap_or(&self.config.expected_audience);
        if claims.aud.as_deref() != Some(expected_audience) {
            return Err(GateError::InvalidAudience);
        }

        if claims.is_expired_at(now) {
            return Err(GateError::TokenExpired);
        }

        Ok(issuer)
    }
}
