// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer gate rejections.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Content type of every gate rejection body.
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

const NOT_AUTHORIZED: &str = "Your client is not authorized to use this api";

/// Why the gate refused a request.
///
/// 401 variants are problems with the authentication material itself (or an
/// outage); 403 variants mean the caller was identified but is not trusted.
/// [`GateError::IdentityConflict`] is a server-side fault and maps to 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No `Authorization` header.
    MissingAuthHeader,
    /// Header is not `Bearer <token>`.
    MalformedAuthHeader,
    /// Token is not a decodable compact token.
    InvalidToken,
    /// `iss` missing, empty or not a valid issuer identifier.
    InvalidIssuer,
    /// The secret lookup could not be performed.
    ServiceUnavailable,
    /// No client is registered for `iss`.
    UnknownIssuer,
    /// The client has no secret configured.
    NoSecret,
    /// HMAC signature (or declared algorithm) does not match.
    InvalidSignature,
    /// `aud` does not match the expected audience.
    InvalidAudience,
    /// `exp` is in the past.
    TokenExpired,
    /// The request already carried a different identity than the verified one.
    IdentityConflict,
}

#[derive(Serialize)]
struct GateErrorBody<'a> {
    success: bool,
    message: &'a str,
}

impl GateError {
    /// Message returned to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            GateError::MissingAuthHeader => "Missing Authorization header",
            GateError::MalformedAuthHeader => {
                "Malformed Authorization header. Should be bearer {token}"
            }
            GateError::InvalidToken => "Invalid token provided",
            GateError::InvalidIssuer => "Missing or invalid iss claim",
            GateError::ServiceUnavailable => "Service unavailable",
            GateError::UnknownIssuer => "Unknown issuer",
            GateError::NoSecret | GateError::InvalidSignature | GateError::InvalidAudience => {
                NOT_AUTHORIZED
            }
            GateError::TokenExpired => "jwt expired",
            GateError::IdentityConflict => "Internal server error",
        }
    }

    /// Short code used in logs; never sent to the caller.
    pub fn reason(&self) -> &'static str {
        match self {
            GateError::MissingAuthHeader => "missing_auth_header",
            GateError::MalformedAuthHeader => "malformed_auth_header",
            GateError::InvalidToken => "invalid_token",
            GateError::InvalidIssuer => "invalid_issuer",
            GateError::ServiceUnavailable => "service_unavailable",
            GateError::UnknownIssuer => "unknown_issuer",
            GateError::NoSecret => "no_secret",
            GateError::InvalidSignature => "invalid_signature",
            GateError::InvalidAudience => "invalid_audience",
            GateError::TokenExpired => "token_expired",
            GateError::IdentityConflict => "identity_conflict",
        }
    }

    /// HTTP status code for this rejection.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::MissingAuthHeader
            | GateError::MalformedAuthHeader
            | GateError::InvalidToken
            | GateError::ServiceUnavailable => StatusCode::UNAUTHORIZED,
            GateError::InvalidIssuer
            | GateError::UnknownIssuer
            | GateError::NoSecret
            | GateError::InvalidSignature
            | GateError::InvalidAudience
            | GateError::TokenExpired => StatusCode::FORBIDDEN,
            GateError::IdentityConflict => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for GateError {}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = serde_json::to_vec(&GateErrorBody {
            success: false,
            message: self.message(),
        })
        .unwrap_or_default();

        (
            self.status_code(),
            [(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
            body,
        )
            .into_response()
    }
}
