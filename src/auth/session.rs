// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped client session.

use std::sync::{Arc, OnceLock};

/// Write-once slot holding the verified issuer of the current request.
///
/// Lives in the request extensions. Clones share the same slot, so a
/// handler that received a clone sees the identity the gate attached.
#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    issuer: Arc<OnceLock<String>>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the verified issuer. Returns `false` if one was already set,
    /// in which case the existing value is kept.
    pub fn attach(&self, issuer: impl Into<String>) -> bool {
        self.issuer.set(issuer.into()).is_ok()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.get().map(String::as_str)
    }

    pub fn is_authenticated(&self) -> bool {
        self.issuer.get().is_some()
    }
}
