// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Consumer side: verify a signed callback before trusting it.

use std::sync::Arc;

use base64ct::{Base64, Encoding};

use super::payload::{CallbackData, SignedCallbackPayload};
use crate::keys::{KeyCache, KeyCacheError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("callback carries no key id")]
    MissingKeyId,

    /// The key could not be resolved right now. Not proof of forgery; the
    /// payload may verify once the key endpoint is reachable.
    #[error("signing key {0:?} is not currently available")]
    KeyUnavailable(String),

    #[error("callback payload is not valid base64")]
    InvalidEncoding,

    #[error("callback signature is invalid")]
    InvalidSignature,

    #[error("callback payload does not match its declared type: {0}")]
    InvalidPayload(String),
}

/// Verifies callbacks against the producer's published keys.
#[derive(Clone)]
pub struct CallbackVerifier {
    keys: Arc<KeyCache>,
}

impl CallbackVerifier {
    pub fn new(keys: Arc<KeyCache>) -> Self {
        Self { keys }
    }

    /// Verify and decode a callback.
    ///
    /// The payload is only parsed after its signature has been checked.
    pub async fn verify(&self, callback: &SignedCallbackPayload) -> Result<CallbackData, VerifyError> {
        let key = self
            .keys
            .get_key(&callback.key_id)
            .await
            .map_err(|e| match e {
                KeyCacheError::EmptyKeyId => VerifyError::MissingKeyId,
            })?
            .ok_or_else(|| VerifyError::KeyUnavailable(callback.key_id.clone()))?;

        let json =
            Base64::decode_vec(&callback.payload_base64).map_err(|_| VerifyError::InvalidEncoding)?;

        if !key.verify(&json, &callback.signature) {
            tracing::warn!(
                kid = %callback.key_id,
                payload_type = ?callback.payload_type,
                "Rejected callback with invalid signature"
            );
            return Err(VerifyError::InvalidSignature);
        }

        CallbackData::from_json(callback.payload_type, &json)
            .map_err(|e| VerifyError::InvalidPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::payload::{CallbackPayloadType, SelectionCallback, SignOutCallback};
    use crate::callback::signer::{CallbackProducer, PayloadSigner, RsaPemSigner};
    use crate::keys::cache::tests::{key_a, key_b, Origin, StubSource, KEY_A_PEM, KEY_B_PEM};
    use crate::keys::{KeyCacheConfig, WellKnownKeySet};
    use std::time::Duration;
    use uuid::Uuid;

    fn signer() -> Arc<dyn PayloadSigner> {
        Arc::new(
            RsaPemSigner::new()
                .with_key("k1", KEY_A_PEM.as_bytes())
                .unwrap()
                .with_key("k2", KEY_B_PEM.as_bytes())
                .unwrap(),
        )
    }

    fn selection() -> CallbackData {
        CallbackData::Selection(SelectionCallback {
            request_id: Uuid::from_u128(10),
            user_id: Uuid::from_u128(11),
            organisation_id: Uuid::from_u128(12),
            organisation_name: "Northwind".to_string(),
        })
    }

    fn verifier_for(source: Arc<StubSource>) -> CallbackVerifier {
        CallbackVerifier::new(Arc::new(KeyCache::new(source, KeyCacheConfig::default())))
    }

    #[tokio::test]
    async fn verifies_and_decodes() {
        let producer = CallbackProducer::new(signer(), "k1");
        let verifier = verifier_for(StubSource::serving(vec![key_a("k1")]));

        let envelope = producer.produce(&selection()).unwrap();
        assert_eq!(verifier.verify(&envelope).await, Ok(selection()));
    }

    #[tokio::test]
    async fn tampered_payload_is_rejected() {
        let producer = CallbackProducer::new(signer(), "k1");
        let verifier = verifier_for(StubSource::serving(vec![key_a("k1")]));

        let mut envelope = producer.produce(&selection()).unwrap();
        let forged = CallbackData::Selection(SelectionCallback {
            request_id: Uuid::from_u128(10),
            user_id: Uuid::from_u128(11),
            organisation_id: Uuid::from_u128(12),
            organisation_name: "Evil Corp".to_string(),
        });
        envelope.payload_base64 = Base64::encode_string(&forged.to_json().unwrap());

        assert_eq!(
            verifier.verify(&envelope).await,
            Err(VerifyError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn signature_from_another_key_is_rejected() {
        let producer = CallbackProducer::new(signer(), "k2");
        // The consumer knows "k2" as key A's public half.
        let verifier = verifier_for(StubSource::serving(vec![key_a("k2")]));

        let envelope = producer.produce(&selection()).unwrap();
        assert_eq!(
            verifier.verify(&envelope).await,
            Err(VerifyError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn unknown_key_is_unavailable_not_invalid() {
        let producer = CallbackProducer::new(signer(), "k2");
        let verifier = verifier_for(StubSource::serving(vec![key_a("k1")]));

        let envelope = producer.produce(&selection()).unwrap();
        assert_eq!(
            verifier.verify(&envelope).await,
            Err(VerifyError::KeyUnavailable("k2".to_string()))
        );

        let down = verifier_for(StubSource::new(Origin::Down));
        assert_eq!(
            down.verify(&envelope).await,
            Err(VerifyError::KeyUnavailable("k2".to_string()))
        );
    }

    #[tokio::test]
    async fn envelope_shape_errors() {
        let producer = CallbackProducer::new(signer(), "k1");
        let verifier = verifier_for(StubSource::serving(vec![key_a("k1")]));
        let envelope = producer.produce(&selection()).unwrap();

        let mut no_kid = envelope.clone();
        no_kid.key_id.clear();
        assert_eq!(verifier.verify(&no_kid).await, Err(VerifyError::MissingKeyId));

        let mut garbled = envelope.clone();
        garbled.payload_base64 = "***".to_string();
        assert_eq!(
            verifier.verify(&garbled).await,
            Err(VerifyError::InvalidEncoding)
        );

        let mut relabelled = envelope.clone();
        relabelled.payload_type = CallbackPayloadType::SignOut;
        assert!(matches!(
            verifier.verify(&relabelled).await,
            Err(VerifyError::InvalidPayload(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn payload_signed_before_rotation_still_verifies() {
        let signer = signer();
        let mut producer = CallbackProducer::new(signer, "k1");
        let source = StubSource::serving(vec![key_a("k1")]);
        let verifier = verifier_for(source.clone());

        let before_rotation = producer.produce(&selection()).unwrap();
        assert!(verifier.verify(&before_rotation).await.is_ok());

        // Producer rotates to k2 and stops publishing k1.
        producer.rotate("k2");
        source.set(Origin::Keys(Some(WellKnownKeySet {
            keys: vec![key_b("k2")],
        })));
        tokio::time::advance(Duration::from_secs(301)).await;

        let sign_out = CallbackData::SignOut(SignOutCallback {
            request_id: Uuid::from_u128(20),
            user_id: Uuid::from_u128(21),
        });
        let after_rotation = producer.produce(&sign_out).unwrap();

        assert_eq!(verifier.verify(&after_rotation).await, Ok(sign_out));
        assert_eq!(verifier.verify(&before_rotation).await, Ok(selection()));
    }
}
