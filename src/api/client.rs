// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;
use serde::Serialize;

use crate::auth::AuthenticatedClient;

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub success: bool,
    pub issuer: String,
}

/// Echo the issuer the gate verified for this request.
pub async fn current_client(AuthenticatedClient(issuer): AuthenticatedClient) -> Json<ClientResponse> {
    Json(ClientResponse {
        success: true,
        issuer,
    })
}
