// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vault encryption key configuration.

use parley_common_secret::SecretString;
use serde::Deserialize;

/// Encryption configuration (runtime, fully resolved).
///
/// `key` is the operator-supplied master secret (`ENCRYPTION_KEY`). The
/// SHA-256 derivation to an AES key happens in the secrets crate; this layer
/// only carries the raw material. Required in production - `load_config`
/// refuses to start without it there.
#[derive(Debug, Default)]
pub struct EncryptionConfig {
	pub key: Option<SecretString>,
}

/// Encryption configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncryptionConfigLayer {
	#[serde(default)]
	pub key: Option<String>,
}

impl EncryptionConfigLayer {
	pub fn merge(&mut self, other: EncryptionConfigLayer) {
		if other.key.is_some() {
			self.key = other.key;
		}
	}

	pub fn finalize(self) -> EncryptionConfig {
		EncryptionConfig {
			key: self.key.map(SecretString::new),
		}
	}
}
