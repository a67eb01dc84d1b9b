// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Callback records handed back by the organisation selector.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator carried next to the signed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackPayloadType {
    Error,
    SignOut,
    Cancel,
    Selection,
}

/// The selector failed; `code` is an HTTP-style status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ErrorCallback {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub code: u16,
}

/// The user signed out instead of choosing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignOutCallback {
    pub request_id: Uuid,
    pub user_id: Uuid,
}

/// The user backed out of the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelCallback {
    pub request_id: Uuid,
    pub user_id: Uuid,
}

/// The user picked an organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectionCallback {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub organisation_id: Uuid,
    pub organisation_name: String,
}

/// A callback record of any type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallbackData {
    Error(ErrorCallback),
    SignOut(SignOutCallback),
    Cancel(CancelCallback),
    Selection(SelectionCallback),
}

impl CallbackData {
    pub fn payload_type(&self) -> CallbackPayloadType {
        match self {
            CallbackData::Error(_) => CallbackPayloadType::Error,
            CallbackData::SignOut(_) => CallbackPayloadType::SignOut,
            CallbackData::Cancel(_) => CallbackPayloadType::Cancel,
            CallbackData::Selection(_) => CallbackPayloadType::Selection,
        }
    }

    pub fn request_id(&self) -> Uuid {
        match self {
            CallbackData::Error(c) => c.request_id,
            CallbackData::SignOut(c) => c.request_id,
            CallbackData::Cancel(c) => c.request_id,
            CallbackData::Selection(c) => c.request_id,
        }
    }

    /// JSON encoding of the record alone, without the discriminator.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a record whose type is already known from `payload_type`.
    ///
    /// Fails if the JSON does not have exactly the fields of that type.
    pub fn from_json(
        payload_type: CallbackPayloadType,
        json: &[u8],
    ) -> Result<Self, serde_json::Error> {
        Ok(match payload_type {
            CallbackPayloadType::Error => CallbackData::Error(serde_json::from_slice(json)?),
            CallbackPayloadType::SignOut => CallbackData::SignOut(serde_json::from_slice(json)?),
            CallbackPayloadType::Cancel => CallbackData::Cancel(serde_json::from_slice(json)?),
            CallbackPayloadType::Selection => {
                CallbackData::Selection(serde_json::from_slice(json)?)
            }
        })
    }
}

/// What the producer sends and the consumer verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedCallbackPayload {
    /// Standard base64 of the record's UTF-8 JSON.
    pub payload_base64: String,
    /// Base64url signature over the JSON bytes (not over the base64 text).
    pub signature: String,
    /// `kid` of the signing key.
    pub key_id: String,
    pub payload_type: CallbackPayloadType,
}
