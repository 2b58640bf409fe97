// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared validation utilities for API handlers.

use parley_server_db::TenantId;

/// Error type for ID parsing failures.
#[derive(Debug, Clone)]
pub struct IdParseError {
	pub error: String,
	pub message: String,
}

impl IdParseError {
	pub fn invalid_tenant_id(message: impl Into<String>) -> Self {
		Self {
			error: "invalid_id".to_string(),
			message: message.into(),
		}
	}
}

/// Parse a string as a TenantId.
pub fn parse_tenant_id(id_str: &str, error_message: &str) -> Result<TenantId, IdParseError> {
	id_str
		.parse::<TenantId>()
		.map_err(|_| IdParseError::invalid_tenant_id(error_message))
}

/// Validate a secret key name.
///
/// Keys are logical credential names like `whatsapp_access_token`: 1-128
/// characters drawn from `[A-Za-z0-9_.-]`.
pub fn validate_secret_key(key: &str) -> bool {
	!key.is_empty()
		&& key.len() <= 128
		&& key
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_tenant_id() {
		let valid = "550e8400-e29b-41d4-a716-446655440000";
		assert!(parse_tenant_id(valid, "Invalid tenant ID").is_ok());

		let result = parse_tenant_id("not-a-uuid", "Invalid tenant ID");
		assert!(result.is_err());
		assert_eq!(result.unwrap_err().error, "invalid_id");
	}

	#[test]
	fn test_validate_secret_key() {
		assert!(validate_secret_key("whatsapp_access_token"));
		assert!(validate_secret_key("stripe.api-key"));
		assert!(validate_secret_key("K1"));

		assert!(!validate_secret_key(""));
		assert!(!validate_secret_key("has space"));
		assert!(!validate_secret_key("emoji🔑"));
		assert!(!validate_secret_key(&"x".repeat(129)));
	}
}
