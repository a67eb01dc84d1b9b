// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::callback::{CallbackData, CallbackPayloadType, SignedCallbackPayload};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCallbackResponse {
    pub success: bool,
    pub payload_type: CallbackPayloadType,
    pub data: CallbackData,
}

/// Verify a signed callback and return the decoded record.
pub async fn verify_callback(
    State(state): State<AppState>,
    body: Result<Json<SignedCallbackPayload>, JsonRejection>,
) -> Result<Json<VerifiedCallbackResponse>, ApiError> {
    let verifier = state
        .callback_verifier()
        .ok_or_else(|| ApiError::unavailable("callback verification is not configured"))?;
    let Json(envelope) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let data = verifier.verify(&envelope).await?;
    tracing::debug!(
        kid = %envelope.key_id,
        payload_type = ?envelope.payload_type,
        request_id = %data.request_id(),
        "Verified callback"
    );

    Ok(Json(VerifiedCallbackResponse {
        success: true,
        payload_type: data.payload_type(),
        data,
    }))
}
