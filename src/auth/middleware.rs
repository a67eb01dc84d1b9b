// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer gate middleware for Axum.
//!
//! ```rust,ignore
//! let gate = Arc::new(BearerGate::new(GateConfig::new("platform-api"), secrets));
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(gate, bearer_gate));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::GateError;
use super::gate::BearerGate;
use super::session::ClientSession;

/// Reject the request or attach the verified issuer and continue.
pub async fn bearer_gate(
    State(gate): State<Arc<BearerGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let issuer = match gate.authenticate(request.headers().get(AUTHORIZATION)).await {
        Ok(issuer) => issuer,
        Err(e) => {
            tracing::debug!(
                reason = e.reason(),
                status = e.status_code().as_u16(),
                path = %request.uri().path(),
                "Rejected client request"
            );
            return e.into_response();
        }
    };

    let session = request
        .extensions()
        .get::<ClientSession>()
        .cloned()
        .unwrap_or_default();
    if !session.attach(issuer.as_str()) && session.issuer() != Some(issuer.as_str()) {
        tracing::warn!(
            path = %request.uri().path(),
            "Client session already carried a different identity"
        );
        return GateError::IdentityConflict.into_response();
    }
    request.extensions_mut().insert(session);

    next.run(request).await
}
