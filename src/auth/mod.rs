// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Bearer Authentication
//!
//! Registered client applications call the API with an HS256 compact token
//! signed with their shared secret.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. Gate decodes the token and reads `iss`
//! 3. Secret for `iss` is resolved through a [`SecretLookup`]
//! 4. Signature, `aud` and `exp` are verified
//! 5. The issuer is attached to the request's [`ClientSession`]
//!
//! ## Security
//!
//! - Secrets shorter than 32 bytes are zero-padded before use as HMAC keys
//! - Signature comparison is constant time
//! - Lookup outages are reported as 401 "Service unavailable", never as a
//!   rejection of the client

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod lookup;
pub mod middleware;
pub mod secret;
pub mod session;

pub use claims::{CompactToken, IssuerFormat, ParseIssuerFormatError, TokenClaims};
pub use error::GateError;
pub use extractor::{AuthenticatedClient, OptionalClient};
pub use gate::{BearerGate, GateConfig};
pub use lookup::{ClientSecretRecord, LookupError, SecretLookup};
pub use middleware::bearer_gate;
pub use secret::normalise_hmac_key;
pub use session::ClientSession;
