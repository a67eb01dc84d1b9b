// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trust Gate - Client Authentication & Signed Callback Verification
//!
//! Authenticates registered client applications by HMAC-signed bearer
//! tokens and verifies RSA-signed callbacks from the organisation selector
//! against its rotating, published public keys.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token gate, middleware and extractors
//! - `callback` - Signed callback envelopes, producer and verifier
//! - `keys` - Rotating public key cache and key set sources
//! - `store` - In-memory client secret store

pub mod api;
pub mod auth;
pub mod callback;
pub mod config;
pub mod error;
pub mod keys;
pub mod state;
pub mod store;
