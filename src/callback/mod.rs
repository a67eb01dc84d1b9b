// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signed Callbacks
//!
//! The organisation selector hands the user's decision back to the calling
//! application through a browser redirect, so the calling application cannot
//! trust the transport. Instead the selector signs the decision.
//!
//! ## Flow
//!
//! 1. Producer serialises a [`CallbackData`] record to JSON
//! 2. Producer signs the JSON bytes with its active RSA key (`RS256`)
//! 3. Producer sends `{payloadBase64, signature, keyId, payloadType}`
//! 4. Consumer resolves `keyId` through the [`KeyCache`](crate::keys::KeyCache)
//! 5. Consumer verifies the signature over the decoded JSON bytes and only
//!    then decodes the record named by `payloadType`
//!
//! An unresolvable key is [`VerifyError::KeyUnavailable`], which is not the
//! same as a bad signature.

pub mod payload;
pub mod signer;
pub mod verifier;

pub use payload::{
    CallbackData, CallbackPayloadType, CancelCallback, ErrorCallback, SelectionCallback,
    SignOutCallback, SignedCallbackPayload,
};
pub use signer::{CallbackProducer, PayloadSigner, RsaPemSigner, SigningError};
pub use verifier::{CallbackVerifier, VerifyError};
