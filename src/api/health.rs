// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub service: String,
    /// Callback signing keys. Only present when a keys URL is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeysCheck>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysCheck {
    /// "ok", "stale" (served from cache past the TTL) or "unavailable".
    pub status: String,
    pub key_ids: Vec<String>,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn check_keys(state: &AppState) -> Option<KeysCheck> {
    let cache = state.key_cache.as_ref()?;

    let status = if !cache.warm().await {
        "unavailable"
    } else if cache.is_fresh().await {
        "ok"
    } else {
        "stale"
    };

    Some(KeysCheck {
        status: status.to_string(),
        key_ids: cache.cached_key_ids().await,
    })
}

/// Health check endpoint handler.
///
/// Returns 503 when the callback keys cannot be loaded at all.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let keys = check_keys(&state).await;
    let all_ok = keys.as_ref().map(|k| k.status != "unavailable").unwrap_or(true);

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            keys,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler. Does not check dependencies.
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
