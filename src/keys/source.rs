// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Well-known public key documents and the sources that serve them.
//!
//! ## Security
//!
//! - Key sets are only trusted from the configured endpoint
//! - Every request carries a timeout

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default HTTP timeout for one key set fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One published RSA signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownKey {
    /// Key ID
    pub kid: String,
    /// Key type (`RSA`)
    pub kty: String,
    /// Intended use (`sig`)
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Algorithm (`RS256`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Modulus (base64url)
    pub n: String,
    /// Exponent (base64url)
    pub e: String,
    /// Publication epoch or version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ed: Option<i64>,
}

impl WellKnownKey {
    /// An `RS256` signing key.
    pub fn rsa(kid: impl Into<String>, n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            kty: "RSA".to_string(),
            key_use: Some("sig".to_string()),
            alg: Some("RS256".to_string()),
            n: n.into(),
            e: e.into(),
            ed: None,
        }
    }
}

/// Body of the well-known keys endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownKeySet {
    #[serde(default)]
    pub keys: Vec<WellKnownKey>,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyFetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to key endpoint failed: {0}")]
    Transport(String),

    #[error("HTTP {0} from key endpoint")]
    Status(u16),

    #[error("invalid key set document: {0}")]
    Decode(String),
}

/// Where the key cache gets its key sets from.
///
/// `Ok(None)` stands for a `null` or empty document.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> Result<Option<WellKnownKeySet>, KeyFetchError>;
}

/// Fetches key sets over HTTPS.
#[derive(Clone)]
pub struct HttpKeySetSource {
    url: String,
    client: reqwest::Client,
}

impl HttpKeySetSource {
    /// Create a source for `url` with a per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, KeyFetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeyFetchError::Client(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<Option<WellKnownKeySet>, KeyFetchError> {
        tracing::debug!(url = %self.url, "Fetching well-known keys");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| KeyFetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeyFetchError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| KeyFetchError::Transport(e.to_string()))?;

        parse_key_set(&body)
    }
}

/// Decode a key set document. Blank bodies and `null` decode to `None`.
pub fn parse_key_set(body: &[u8]) -> Result<Option<WellKnownKeySet>, KeyFetchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map_err(|e| KeyFetchError::Decode(e.to_string()))
}
