// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rotating public key cache.
//!
//! ## Freshness
//!
//! - Within `ttl` of the last successful fetch every lookup, hit or miss, is
//!   answered from memory
//! - After that, the origin is queried at most once per
//!   `min_refresh_interval`, so lookups for unknown key ids cannot hammer it
//!
//! ## Rotation
//!
//! Entries are never removed or replaced by a refresh. A payload signed with
//! a key that the origin has since rotated out still verifies for the life of
//! the cache, and every lookup of a `kid` returns the same `Arc`.
//!
//! Fetch failures are logged and reported as `None`, never as errors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{crypto, Algorithm, DecodingKey};
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::source::{KeySetSource, WellKnownKey};

/// Default key cache TTL (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default minimum spacing between origin fetches (1 minute).
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCacheConfig {
    /// How long a successful fetch is trusted.
    pub ttl: Duration,
    /// Minimum time between two fetches.
    pub min_refresh_interval: Duration,
}

impl Default for KeyCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyCacheError {
    #[error("key id must not be empty")]
    EmptyKeyId,
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidKeyError {
    #[error("unsupported key type {0:?}")]
    UnsupportedKeyType(String),

    #[error("unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("key is not a signing key (use = {0:?})")]
    NotForSigning(String),

    #[error("invalid RSA components: {0}")]
    Components(String),
}

/// A published key together with the verifier built from it.
pub struct KeyCacheEntry {
    key: WellKnownKey,
    verifier: DecodingKey,
    algorithm: Algorithm,
}

impl KeyCacheEntry {
    /// Build the verifier for an RSA key.
    pub fn new(key: WellKnownKey) -> Result<Self, InvalidKeyError> {
        if key.kty != "RSA" {
            return Err(InvalidKeyError::UnsupportedKeyType(key.kty));
        }
        if let Some(key_use) = key.key_use.as_deref().filter(|u| *u != "sig") {
            return Err(InvalidKeyError::NotForSigning(key_use.to_string()));
        }

        let algorithm = match key.alg.as_deref() {
            None | Some("RS256") => Algorithm::RS256,
            Some("RS384") => Algorithm::RS384,
            Some("RS512") => Algorithm::RS512,
            Some("PS256") => Algorithm::PS256,
            Some("PS384") => Algorithm::PS384,
            Some("PS512") => Algorithm::PS512,
            Some(other) => return Err(InvalidKeyError::UnsupportedAlgorithm(other.to_string())),
        };

        let verifier = DecodingKey::from_rsa_components(&key.n, &key.e)
            .map_err(|e| InvalidKeyError::Components(e.to_string()))?;

        Ok(Self {
            key,
            verifier,
            algorithm,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key.kid
    }

    pub fn key(&self) -> &WellKnownKey {
        &self.key
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Check a base64url signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &str) -> bool {
        crypto::verify(signature, message, &self.verifier, self.algorithm).unwrap_or(false)
    }
}

impl fmt::Debug for KeyCacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCacheEntry")
            .field("kid", &self.key.kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct CacheState {
    last_fetch: Option<Instant>,
    entries: HashMap<String, Arc<KeyCacheEntry>>,
}

enum Freshness {
    Fresh,
    Throttled,
    Due,
}

/// Public key cache in front of a [`KeySetSource`].
pub struct KeyCache {
    config: KeyCacheConfig,
    source: Arc<dyn KeySetSource>,
    state: RwLock<CacheState>,
}

impl KeyCache {
    pub fn new(source: Arc<dyn KeySetSource>, config: KeyCacheConfig) -> Self {
        Self {
            config,
            source,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &KeyCacheConfig {
        &self.config
    }

    /// Look up the key for `key_id`, refreshing from the origin when due.
    ///
    /// Returns `Ok(None)` when the key is unknown or the origin could not be
    /// reached; callers must treat that as "cannot verify right now".
    pub async fn get_key(&self, key_id: &str) -> Result<Option<Arc<KeyCacheEntry>>, KeyCacheError> {
        if key_id.is_empty() {
            return Err(KeyCacheError::EmptyKeyId);
        }

        {
            let state = self.state.read().await;
            match self.freshness(&state) {
                Freshness::Fresh | Freshness::Throttled => {
                    return Ok(state.entries.get(key_id).cloned());
                }
                Freshness::Due => {}
            }
        }

        if !self.refresh().await {
            return Ok(None);
        }

        Ok(self.state.read().await.entries.get(key_id).cloned())
    }

    /// Fetch from the origin if due and report whether any key is cached.
    pub async fn warm(&self) -> bool {
        let due = matches!(self.freshness(&*self.state.read().await), Freshness::Due);
        if due {
            self.refresh().await;
        }
        !self.state.read().await.entries.is_empty()
    }

    /// Whether the last successful fetch is within the TTL.
    pub async fn is_fresh(&self) -> bool {
        matches!(self.freshness(&*self.state.read().await), Freshness::Fresh)
    }

    /// Key ids currently cached, sorted.
    pub async fn cached_key_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.read().await.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop every entry and forget the last fetch time.
    pub async fn clear(&self) {
        *self.state.write().await = CacheState::default();
    }

    fn freshness(&self, state: &CacheState) -> Freshness {
        let Some(last_fetch) = state.last_fetch else {
            return Freshness::Due;
        };
        let age = last_fetch.elapsed();
        if age < self.config.ttl {
            Freshness::Fresh
        } else if age < self.config.min_refresh_interval {
            Freshness::Throttled
        } else {
            Freshness::Due
        }
    }

    /// Fetch the origin's key set and merge it in. Returns `false` when the
    /// fetch itself failed.
    ///
    /// The lock is not held across the fetch; two callers racing past the
    /// freshness check may both fetch, and the merge keeps whichever entry
    /// landed first.
    async fn refresh(&self) -> bool {
        let fetched = match self.source.fetch().await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch well-known keys");
                return false;
            }
        };

        let keys = fetched.map(|set| set.keys).unwrap_or_default();

        let mut state = self.state.write().await;
        state.last_fetch = Some(Instant::now());

        if keys.is_empty() {
            tracing::warn!("Well-known keys endpoint returned no keys");
            return true;
        }

        for key in keys {
            if state.entries.contains_key(&key.kid) {
                continue;
            }
            let kid = key.kid.clone();
            match KeyCacheEntry::new(key) {
                Ok(entry) => {
                    tracing::debug!(kid = %kid, "Cached well-known key");
                    state.entries.insert(kid, Arc::new(entry));
                }
                Err(e) => {
                    tracing::warn!(kid = %kid, error = %e, "Skipping unusable well-known key");
                }
            }
        }

        true
    }
}
