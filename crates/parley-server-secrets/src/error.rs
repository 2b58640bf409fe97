// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the secret vault.

use thiserror::Error;

/// Result type alias for vault operations.
pub type SecretsResult<T> = Result<T, SecretsError>;

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum SecretsError {
	/// No encryption key configured in an environment that requires one.
	#[error("encryption key not configured")]
	KeyNotConfigured,

	#[error("encryption failed: {0}")]
	Encryption(String),

	/// Covers malformed blobs and authentication failures alike. The message
	/// never identifies which part of the blob mismatched.
	#[error("decryption failed: {0}")]
	Decryption(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("database error: {0}")]
	Database(#[from] parley_server_db::DbError),
}

impl SecretsError {
	/// Returns true if this error should be logged at error level.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			SecretsError::Database(_) | SecretsError::KeyNotConfigured
		)
	}
}
