// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::BearerGate;
use crate::callback::CallbackVerifier;
use crate::keys::KeyCache;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<BearerGate>,
    /// Absent when no keys URL is configured.
    pub key_cache: Option<Arc<KeyCache>>,
}

impl AppState {
    pub fn new(gate: BearerGate) -> Self {
        Self {
            gate: Arc::new(gate),
            key_cache: None,
        }
    }

    pub fn with_key_cache(mut self, key_cache: Arc<KeyCache>) -> Self {
        self.key_cache = Some(key_cache);
        self
    }

    pub fn callback_verifier(&self) -> Option<CallbackVerifier> {
        self.key_cache.clone().map(CallbackVerifier::new)
    }
}
