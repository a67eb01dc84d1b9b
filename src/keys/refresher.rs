// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Refresher
//!
//! Background task that keeps the [`KeyCache`] warm so the first callback
//! after a quiet period does not pay for the origin round trip.
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::cache::KeyCache;

/// Periodically refreshes a [`KeyCache`] once its entries go stale.
pub struct KeyRefresher {
    cache: Arc<KeyCache>,
    interval: Duration,
}

impl KeyRefresher {
    /// Refresh at the cache's TTL, but never faster than its throttle allows.
    pub fn new(cache: Arc<KeyCache>) -> Self {
        let config = cache.config();
        let interval = config.ttl.max(config.min_refresh_interval);
        Self { cache, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(refresher.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Key refresher starting");

        loop {
            if !self.cache.warm().await {
                warn!("No callback signing keys available");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Key refresher shutting down");
                    return;
                }
            }
        }
    }
}
