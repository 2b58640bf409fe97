// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant secret vault.
//!
//! Two layers:
//! - [`cipher`] turns UTF-8 strings into self-contained encrypted blobs
//!   (AES-256-GCM under one server-wide key) and back.
//! - [`service`] adds persistence and lifecycle on top: upsert with version
//!   tracking, soft expiry at read time, metadata projections, and a
//!   resumable re-encryption sweep.
//!
//! Plaintext only ever exists in memory, wrapped in
//! [`parley_common_secret::SecretString`]; the database holds opaque
//! `base64(nonce ‖ ciphertext ‖ tag)` strings.

pub mod cipher;
pub mod error;
pub mod service;

pub use cipher::SecretCipher;
pub use error::{SecretsError, SecretsResult};
pub use service::{SecretMetadata, SecretsService, StoreSecretOptions};
