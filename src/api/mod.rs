// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::bearer_gate;
use crate::state::AppState;

pub mod callback;
pub mod client;
pub mod health;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/client", get(client::current_client))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            bearer_gate,
        ));

    let v1_routes = Router::new()
        .merge(protected)
        .route("/callback/verify", post(callback::verify_callback))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
