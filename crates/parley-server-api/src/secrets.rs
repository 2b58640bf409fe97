// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store (create or replace) a secret value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreSecretRequest {
	/// The plaintext credential. Encrypted before it touches storage; never
	/// echoed back.
	pub value: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub expires_at: Option<DateTime<Utc>>,
}

/// Secret metadata. Deliberately excludes both the value and its ciphertext.
#[derive(Debug, Serialize, ToSchema)]
pub struct SecretMetadataResponse {
	pub key: String,
	pub description: Option<String>,
	pub expires_at: Option<DateTime<Utc>>,
	pub rotated_at: Option<DateTime<Utc>>,
	pub version: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListSecretsResponse {
	pub secrets: Vec<SecretMetadataResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RotateSecretsResponse {
	/// Number of secrets successfully re-encrypted. May be lower than the
	/// tenant's secret count when individual rows fail.
	pub rotated: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SecretSuccessResponse {
	pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SecretErrorResponse {
	pub error: String,
	pub message: String,
}
