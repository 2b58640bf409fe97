// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret wrapper type that prevents accidental logging of sensitive values.
//!
//! [`SecretString`] holds a credential, token, or signing secret. Its `Debug`
//! and `Display` impls print `[REDACTED]`, the inner buffer is zeroed on
//! drop, and the value can only be read through an explicit [`expose`] call
//! at the use site.
//!
//! [`expose`]: SecretString::expose

use zeroize::Zeroize;

/// A string that must never appear in logs, error messages, or serialized
/// output.
///
/// Deliberately not `Clone`: duplicating a secret is an explicit act via
/// `SecretString::new(secret.expose().clone())`.
pub struct SecretString(String);

impl SecretString {
	/// Wrap a sensitive value.
	pub fn new(value: String) -> Self {
		Self(value)
	}

	/// Access the underlying value.
	///
	/// Call this as close as possible to the point of use; never store the
	/// exposed reference in a longer-lived structure.
	pub fn expose(&self) -> &String {
		&self.0
	}

	/// Length of the underlying value in bytes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the underlying value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl std::fmt::Debug for SecretString {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("SecretString([REDACTED])")
	}
}

impl std::fmt::Display for SecretString {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl Drop for SecretString {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

// Deserialize only. Serializing a secret back out is always a bug, so no
// Serialize impl exists.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expose_returns_inner_value() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(secret.expose(), "hunter2");
		assert_eq!(secret.len(), 7);
		assert!(!secret.is_empty());
	}

	#[test]
	fn debug_is_redacted() {
		let secret = SecretString::new("super-secret-value".to_string());
		let debug = format!("{:?}", secret);
		assert!(!debug.contains("super-secret-value"));
		assert!(debug.contains("[REDACTED]"));
	}

	#[test]
	fn display_is_redacted() {
		let secret = SecretString::new("super-secret-value".to_string());
		assert_eq!(format!("{}", secret), "[REDACTED]");
	}

	#[cfg(feature = "serde")]
	#[test]
	fn deserializes_from_json_string() {
		let secret: SecretString = serde_json::from_str("\"tok_123\"").unwrap();
		assert_eq!(secret.expose(), "tok_123");
	}

	#[test]
	fn empty_secret() {
		let secret = SecretString::new(String::new());
		assert!(secret.is_empty());
		assert_eq!(secret.len(), 0);
	}
}
