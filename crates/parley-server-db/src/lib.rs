// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Parley server.
//!
//! SQLite via sqlx: pool construction, startup migrations, and the tenant
//! secret repository. Timestamps are stored as RFC 3339 TEXT, ids as uuid
//! TEXT, matching the rest of the server schema.

pub mod error;
pub mod pool;
pub mod secret;
pub mod testing;
pub mod types;

pub use error::DbError;
pub use pool::{create_pool, run_migrations};
pub use secret::{SecretMetadataRecord, SecretRecord, SecretRepository, UpsertSecretParams};
pub use types::TenantId;
