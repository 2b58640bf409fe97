// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value encryption for the secret vault.
//!
//! One server-wide AES-256-GCM key, derived by hashing the operator-supplied
//! `ENCRYPTION_KEY` with SHA-256. The digest step is deterministic key
//! derivation, not a salted KDF - acceptable only because the source secret
//! is high-entropy, operator-controlled material.
//!
//! Blob wire format, round-trip stable:
//! `base64( nonce[16] ‖ ciphertext[N] ‖ tag[16] )`. GCM does not pad, so N
//! equals the plaintext length. The AEAD layer emits `ciphertext ‖ tag` as
//! one buffer; only the nonce is framed explicitly.

use aes_gcm::{
	aead::{consts::U16, Aead, KeyInit, OsRng},
	aes::Aes256,
	AesGcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use parley_common_secret::SecretString;
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{SecretsError, SecretsResult};

/// AES-256-GCM with the 16-byte nonce the blob format fixes at the head.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Size of encryption keys in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 16;

/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Fallback master secret for non-production environments without a
/// configured key. UNSAFE by construction: every dev deployment shares it.
/// Production startup refuses to use it.
const DEV_FALLBACK_KEY: &str = "parley-dev-only-insecure-encryption-key";

/// Encrypts and decrypts vault values under the server-wide key.
///
/// Holds only derived key material; no teardown needed.
#[derive(Clone)]
pub struct SecretCipher {
	cipher: Aes256Gcm16,
}

impl SecretCipher {
	/// Derive the AES-256 key from an operator-supplied master secret.
	pub fn from_master_secret(master_secret: &str) -> Self {
		let digest = Sha256::digest(master_secret.as_bytes());
		let key = Key::<Aes256Gcm16>::from_slice(digest.as_slice());
		Self {
			cipher: Aes256Gcm16::new(key),
		}
	}

	/// Build the cipher from configuration.
	///
	/// A missing key is fatal in production. Non-production environments
	/// fall back to [`DEV_FALLBACK_KEY`] so local workflows stay unblocked.
	pub fn from_config(key: Option<&SecretString>, production: bool) -> SecretsResult<Self> {
		match key {
			Some(secret) => Ok(Self::from_master_secret(secret.expose())),
			None if production => Err(SecretsError::KeyNotConfigured),
			None => {
				tracing::warn!(
					"no encryption key configured; falling back to the built-in dev key - \
					 NEVER run production this way"
				);
				Ok(Self::from_master_secret(DEV_FALLBACK_KEY))
			}
		}
	}

	/// Encrypt a UTF-8 string into an opaque blob.
	///
	/// A fresh random nonce is drawn per call; encrypting the same value
	/// twice yields different blobs.
	pub fn encrypt(&self, plaintext: &str) -> SecretsResult<String> {
		let mut nonce_bytes = [0u8; NONCE_SIZE];
		OsRng.fill_bytes(&mut nonce_bytes);
		let nonce = Nonce::<U16>::from_slice(&nonce_bytes);

		let mut sealed = self
			.cipher
			.encrypt(nonce, plaintext.as_bytes())
			.map_err(|e| SecretsError::Encryption(format!("value encryption failed: {e}")))?;

		let mut framed = Vec::with_capacity(NONCE_SIZE + sealed.len());
		framed.extend_from_slice(&nonce_bytes);
		framed.append(&mut sealed);
		Ok(BASE64.encode(framed))
	}

	/// Decrypt a blob produced by [`encrypt`](Self::encrypt).
	///
	/// Any failure - malformed encoding, truncated frame, tag mismatch -
	/// surfaces as the same generic [`SecretsError::Decryption`]; callers
	/// must not attempt partial recovery.
	pub fn decrypt(&self, blob: &str) -> SecretsResult<Zeroizing<String>> {
		let framed = BASE64
			.decode(blob)
			.map_err(|_| SecretsError::Decryption("malformed blob".to_string()))?;

		if framed.len() < NONCE_SIZE + TAG_SIZE {
			return Err(SecretsError::Decryption("malformed blob".to_string()));
		}

		let (nonce_bytes, sealed) = framed.split_at(NONCE_SIZE);
		let nonce = Nonce::<U16>::from_slice(nonce_bytes);

		let plaintext = Zeroizing::new(
			self
				.cipher
				.decrypt(nonce, sealed)
				.map_err(|_| SecretsError::Decryption("authentication failed".to_string()))?,
		);

		String::from_utf8(plaintext.to_vec())
			.map(Zeroizing::new)
			.map_err(|_| SecretsError::Decryption("authentication failed".to_string()))
	}

	/// JSON-serialize a value, then encrypt it.
	pub fn encrypt_object<T: Serialize>(&self, value: &T) -> SecretsResult<String> {
		let json = serde_json::to_string(value)?;
		self.encrypt(&json)
	}

	/// Decrypt a blob, then JSON-parse the plaintext.
	///
	/// A parse failure is a distinct [`SecretsError::Serialization`]; it
	/// cannot occur for blobs this cipher wrote via
	/// [`encrypt_object`](Self::encrypt_object).
	pub fn decrypt_object<T: DeserializeOwned>(&self, blob: &str) -> SecretsResult<T> {
		let json = self.decrypt(blob)?;
		Ok(serde_json::from_str(&json)?)
	}
}

impl std::fmt::Debug for SecretCipher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("SecretCipher([REDACTED])")
	}
}

/// Generate a random 256-bit master key, base64-encoded.
///
/// Operator utility for provisioning a new deployment's `ENCRYPTION_KEY`;
/// not used on request paths.
pub fn generate_key() -> String {
	let mut key = Zeroizing::new([0u8; KEY_SIZE]);
	OsRng.fill_bytes(key.as_mut());
	BASE64.encode(key.as_ref())
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn prop_roundtrip(plaintext in proptest::string::string_regex(".{0,512}").unwrap()) {
			let c = SecretCipher::from_master_secret("prop-master");
			let blob = c.encrypt(&plaintext).unwrap();
			let decrypted = c.decrypt(&blob).unwrap();
			prop_assert_eq!(decrypted.as_str(), plaintext.as_str());
		}

		#[test]
		fn prop_two_encryptions_differ(plaintext in proptest::string::string_regex(".{1,256}").unwrap()) {
			let c = SecretCipher::from_master_secret("prop-master");
			let blob1 = c.encrypt(&plaintext).unwrap();
			let blob2 = c.encrypt(&plaintext).unwrap();
			prop_assert_ne!(blob1, blob2);
		}

		#[test]
		fn prop_single_byte_tamper_fails(
			plaintext in proptest::string::string_regex(".{1,256}").unwrap(),
			tamper_idx in 0usize..1024usize,
		) {
			let c = SecretCipher::from_master_secret("prop-master");
			let blob = c.encrypt(&plaintext).unwrap();

			// Flip one byte anywhere in the decoded frame: nonce, ciphertext
			// or tag. Decryption must fail, never return a wrong value.
			let mut framed = BASE64.decode(&blob).unwrap();
			let idx = tamper_idx % framed.len();
			framed[idx] ^= 0xFF;
			let tampered = BASE64.encode(framed);

			prop_assert!(c.decrypt(&tampered).is_err());
		}
	}
}
