// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory client secret store.
//!
//! Backs [`SecretLookup`] for single-node deployments and tests. Secrets are
//! HMAC-normalised on insert so the stored form is exactly the key used for
//! verification.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::auth::claims::IssuerFormat;
use crate::auth::lookup::{ClientSecretRecord, LookupError, SecretLookup};
use crate::auth::secret::normalise_hmac_key;

/// One client as written in a secrets file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientSecretEntry {
    issuer: String,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    audience: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read secrets file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid secrets file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("issuer {0:?} is not valid for the configured issuer format")]
    InvalidIssuer(String),
}

#[derive(Default)]
pub struct InMemorySecretStore {
    format: IssuerFormat,
    clients: RwLock<HashMap<String, ClientSecretRecord>>,
}

impl InMemorySecretStore {
    pub fn new(format: IssuerFormat) -> Self {
        Self {
            format,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Load clients from a JSON array of `{issuer, secret?, audience?}`.
    pub async fn from_file(path: &Path, format: IssuerFormat) -> Result<Self, StoreError> {
        let raw = tokio::fs::read(path).await?;
        let entries: Vec<ClientSecretEntry> = serde_json::from_slice(&raw)?;

        let store = Self::new(format);
        for entry in entries {
            let record = ClientSecretRecord {
                issuer: entry.issuer,
                secret: entry.secret.map(String::into_bytes),
                audience: entry.audience,
            };
            store.insert(record).await?;
        }
        Ok(store)
    }

    /// Register or rotate a client. The secret is normalised before storage.
    pub async fn insert(&self, mut record: ClientSecretRecord) -> Result<(), StoreError> {
        let issuer = self
            .format
            .normalise(&record.issuer)
            .ok_or_else(|| StoreError::InvalidIssuer(record.issuer.clone()))?;

        record.secret = record.secret.as_deref().map(normalise_hmac_key);
        record.issuer = issuer.clone();

        self.clients.write().await.insert(issuer, record);
        Ok(())
    }

    pub async fn remove(&self, issuer: &str) -> bool {
        match self.format.normalise(issuer) {
            Some(issuer) => self.clients.write().await.remove(&issuer).is_some(),
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }
}

#[async_trait]
impl SecretLookup for InMemorySecretStore {
    async fn lookup(&self, issuer: &str) -> Result<Option<ClientSecretRecord>, LookupError> {
        let Some(issuer) = self.format.normalise(issuer) else {
            return Ok(None);
        };
        Ok(self.clients.read().await.get(&issuer).cloned())
    }
}
