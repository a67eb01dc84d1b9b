// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the verified client.
//!
//! These only read the [`ClientSession`] written by the
//! [`bearer_gate`](super::middleware::bearer_gate) middleware; they never
//! validate tokens themselves.
//!
//! ```rust,ignore
//! async fn my_handler(AuthenticatedClient(issuer): AuthenticatedClient) -> impl IntoResponse {
//!     // issuer is the verified `iss` claim
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{ClientSession, GateError};

/// Verified issuer of the current request.
///
/// Rejects with 401 when the route is not behind the gate, so a missing
/// layer fails closed.
pub struct AuthenticatedClient(pub String);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedClient {
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClientSession>()
            .and_then(ClientSession::issuer)
            .map(|issuer| AuthenticatedClient(issuer.to_string()))
            .ok_or(GateError::MissingAuthHeader)
    }
}

/// Verified issuer if the gate ran and succeeded, `None` otherwise.
pub struct OptionalClient(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalClient {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthenticatedClient::from_request_parts(parts, state).await {
            Ok(AuthenticatedClient(issuer)) => Ok(OptionalClient(Some(issuer))),
            Err(_) => Ok(OptionalClient(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn requires_session() {
        let mut parts = parts();
        let result = AuthenticatedClient::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(GateError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn empty_session_is_rejected() {
        let mut parts = parts();
        parts.extensions.insert(ClientSession::new());
        let result = AuthenticatedClient::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn reads_attached_issuer() {
        let mut parts = parts();
        let session = ClientSession::new();
        session.attach("client-a");
        parts.extensions.insert(session);

        let AuthenticatedClient(issuer) = AuthenticatedClient::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(issuer, "client-a");

        let OptionalClient(optional) = OptionalClient::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(optional.as_deref(), Some("client-a"));
    }

    #[tokio::test]
    async fn optional_client_is_none_without_session() {
        let mut parts = parts();
        let OptionalClient(optional) = OptionalClient::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(optional.is_none());
    }
}
