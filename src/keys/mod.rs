// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public signing keys published by the callback producer.
//!
//! [`KeyCache`] keeps a rotation-safe local copy of the producer's
//! well-known keys, fetched through a [`KeySetSource`]. [`KeyRefresher`]
//! keeps it warm in the background.

pub mod cache;
pub mod refresher;
pub mod source;

pub use cache::{KeyCache, KeyCacheConfig, KeyCacheEntry, KeyCacheError};
pub use refresher::KeyRefresher;
pub use source::{HttpKeySetSource, KeyFetchError, KeySetSource, WellKnownKey, WellKnownKeySet};
