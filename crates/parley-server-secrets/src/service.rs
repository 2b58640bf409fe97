// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret lifecycle on top of the cipher and repository.
//!
//! Store/replace is a single atomic upsert keyed on `(tenant_id, key)`:
//! version 1 on first write, `version + 1` and a fresh `rotated_at` on every
//! replacement. Reads apply soft expiry - an expired row answers as absent
//! without being deleted. Plaintext crosses this boundary only as
//! [`SecretString`] out of [`get_secret`](SecretsService::get_secret); every
//! other operation returns metadata.

use chrono::{DateTime, Utc};
use parley_common_secret::SecretString;
use parley_server_db::{
	SecretMetadataRecord, SecretRecord, SecretRepository, TenantId, UpsertSecretParams,
};

use crate::cipher::SecretCipher;
use crate::error::SecretsResult;

/// Secret metadata as exposed to admin surfaces. Never carries the value.
#[derive(Debug, Clone)]
pub struct SecretMetadata {
	pub key: String,
	pub description: Option<String>,
	pub expires_at: Option<DateTime<Utc>>,
	pub rotated_at: Option<DateTime<Utc>>,
	pub version: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<SecretMetadataRecord> for SecretMetadata {
	fn from(record: SecretMetadataRecord) -> Self {
		Self {
			key: record.key,
			description: record.description,
			expires_at: record.expires_at,
			rotated_at: record.rotated_at,
			version: record.version,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

impl From<SecretRecord> for SecretMetadata {
	fn from(record: SecretRecord) -> Self {
		Self {
			key: record.key,
			description: record.description,
			expires_at: record.expires_at,
			rotated_at: record.rotated_at,
			version: record.version,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

/// Optional attributes for [`SecretsService::store_secret`].
///
/// Both fields are written as given: `None` clears a previously set
/// description or expiry.
#[derive(Debug, Clone, Default)]
pub struct StoreSecretOptions {
	pub description: Option<String>,
	pub expires_at: Option<DateTime<Utc>>,
}

/// Tenant secret vault service.
#[derive(Clone)]
pub struct SecretsService {
	repo: SecretRepository,
	cipher: SecretCipher,
}

impl SecretsService {
	pub fn new(repo: SecretRepository, cipher: SecretCipher) -> Self {
		Self { repo, cipher }
	}

	/// Encrypt and persist a secret value.
	///
	/// Creates the row at version 1, or replaces the ciphertext of an
	/// existing `(tenant, key)` row, bumping its version and stamping
	/// `rotated_at`. Returns metadata only - the caller never gets plaintext
	/// (or ciphertext) back from a write.
	#[tracing::instrument(skip(self, value, options), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn store_secret(
		&self,
		tenant_id: &TenantId,
		key: &str,
		value: &SecretString,
		options: StoreSecretOptions,
	) -> SecretsResult<SecretMetadata> {
		let encrypted_value = self.cipher.encrypt(value.expose())?;

		let record = self
			.repo
			.upsert_secret(&UpsertSecretParams {
				tenant_id: *tenant_id,
				key: key.to_string(),
				encrypted_value,
				description: options.description,
				expires_at: options.expires_at,
			})
			.await?;

		tracing::info!(
			tenant_id = %tenant_id,
			key = %key,
			version = record.version,
			"secret stored"
		);
		Ok(record.into())
	}

	/// Decrypt and return a secret value.
	///
	/// Absent (not an error) when no row exists or when `expires_at` has
	/// passed - soft expiry is a read-time check, the row is not deleted.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn get_secret(
		&self,
		tenant_id: &TenantId,
		key: &str,
	) -> SecretsResult<Option<SecretString>> {
		let record = match self.repo.get_secret(tenant_id, key).await? {
			Some(record) => record,
			None => return Ok(None),
		};

		if is_expired(&record, Utc::now()) {
			tracing::debug!(tenant_id = %tenant_id, key = %key, "secret expired, treating as absent");
			return Ok(None);
		}

		let plaintext = self.cipher.decrypt(&record.encrypted_value)?;
		Ok(Some(SecretString::new(plaintext.as_str().to_owned())))
	}

	/// Get a secret's metadata without touching its value.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn get_secret_metadata(
		&self,
		tenant_id: &TenantId,
		key: &str,
	) -> SecretsResult<Option<SecretMetadata>> {
		let record = self.repo.get_secret_metadata(tenant_id, key).await?;
		Ok(record.map(SecretMetadata::from))
	}

	/// List secret metadata for a tenant.
	///
	/// Expired rows are included: operators need to see them to clean up.
	/// Only value reads treat expiry as absence.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id))]
	pub async fn list_secrets(&self, tenant_id: &TenantId) -> SecretsResult<Vec<SecretMetadata>> {
		let records = self.repo.list_secret_metadata(tenant_id).await?;
		Ok(records.into_iter().map(SecretMetadata::from).collect())
	}

	/// Re-encrypt every secret for a tenant under the current key.
	///
	/// Each row gets a fresh nonce even when the key is unchanged. Per-row
	/// failures (e.g. a corrupted blob) are logged and skipped; one bad row
	/// must not abort the batch. Not atomic across the set - already-rotated
	/// rows stay rotated, which makes the sweep safely resumable.
	///
	/// # Returns
	/// The number of rows successfully rotated.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id))]
	pub async fn rotate_all_secrets(&self, tenant_id: &TenantId) -> SecretsResult<usize> {
		let records = self.repo.list_secrets_with_values(tenant_id).await?;
		let total = records.len();
		let mut rotated = 0usize;

		for record in records {
			match self.rotate_one(&record).await {
				Ok(()) => rotated += 1,
				Err(e) => {
					tracing::warn!(
						tenant_id = %tenant_id,
						key = %record.key,
						error = %e,
						"skipping secret during rotation"
					);
				}
			}
		}

		tracing::info!(tenant_id = %tenant_id, rotated, total, "secret rotation sweep finished");
		Ok(rotated)
	}

	async fn rotate_one(&self, record: &SecretRecord) -> SecretsResult<()> {
		let plaintext = self.cipher.decrypt(&record.encrypted_value)?;
		let reencrypted = self.cipher.encrypt(&plaintext)?;
		self.repo.replace_ciphertext(&record.id, &reencrypted).await?;
		Ok(())
	}

	/// Delete a secret by key.
	///
	/// # Returns
	/// `true` if a row was deleted.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn delete_secret(&self, tenant_id: &TenantId, key: &str) -> SecretsResult<bool> {
		Ok(self.repo.delete_secret(tenant_id, key).await?)
	}

	/// Check whether a secret row exists, expired or not.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn has_secret(&self, tenant_id: &TenantId, key: &str) -> SecretsResult<bool> {
		Ok(self.repo.has_secret(tenant_id, key).await?)
	}
}

fn is_expired(record: &SecretRecord, now: DateTime<Utc>) -> bool {
	matches!(record.expires_at, Some(expires_at) if expires_at <= now)
}

#[cfg(test)]
mod tests {
	use super::*;
	use parley_server_db::testing::create_secrets_test_pool;
	use sqlx::SqlitePool;
	use uuid::Uuid;

	async fn service() -> (SecretsService, SqlitePool) {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool.clone());
		let cipher = SecretCipher::from_master_secret("service-test-master");
		(SecretsService::new(repo, cipher), pool)
	}

	fn tenant() -> TenantId {
		TenantId::new(Uuid::new_v4())
	}

	fn value(v: &str) -> SecretString {
		SecretString::new(v.to_string())
	}

	#[tokio::test]
	async fn store_then_get_roundtrips_plaintext() {
		let (service, _pool) = service().await;
		let tenant = tenant();

		let meta = service
			.store_secret(
				&tenant,
				"whatsapp_access_token",
				&value("EAAG-token"),
				StoreSecretOptions::default(),
			)
			.await
			.unwrap();
		assert_eq!(meta.version, 1);

		let secret = service
			.get_secret(&tenant, "whatsapp_access_token")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(secret.expose(), "EAAG-token");
	}

	#[tokio::test]
	async fn stored_blob_is_not_plaintext() {
		let (service, pool) = service().await;
		let tenant = tenant();

		service
			.store_secret(
				&tenant,
				"api_key",
				&value("plaintext-credential"),
				StoreSecretOptions::default(),
			)
			.await
			.unwrap();

		let repo = SecretRepository::new(pool);
		let record = repo.get_secret(&tenant, "api_key").await.unwrap().unwrap();
		assert!(!record.encrypted_value.contains("plaintext-credential"));
	}

	#[tokio::test]
	async fn second_store_bumps_version_and_rotated_at() {
		let (service, _pool) = service().await;
		let tenant = tenant();

		let first = service
			.store_secret(&tenant, "api_key", &value("v1"), StoreSecretOptions::default())
			.await
			.unwrap();
		assert_eq!(first.version, 1);
		assert!(first.rotated_at.is_none());

		let second = service
			.store_secret(&tenant, "api_key", &value("v2"), StoreSecretOptions::default())
			.await
			.unwrap();
		assert_eq!(second.version, 2);
		assert!(second.rotated_at.is_some());

		let secret = service.get_secret(&tenant, "api_key").await.unwrap().unwrap();
		assert_eq!(secret.expose(), "v2");
	}

	#[tokio::test]
	async fn missing_secret_is_absent_not_error() {
		let (service, _pool) = service().await;
		assert!(service
			.get_secret(&tenant(), "nothing_here")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn expired_secret_reads_as_absent_but_row_remains() {
		let (service, _pool) = service().await;
		let tenant = tenant();

		service
			.store_secret(
				&tenant,
				"short_lived",
				&value("gone"),
				StoreSecretOptions {
					description: None,
					expires_at: Some(Utc::now() - chrono::Duration::minutes(1)),
				},
			)
			.await
			.unwrap();

		assert!(service
			.get_secret(&tenant, "short_lived")
			.await
			.unwrap()
			.is_none());
		// Soft expiry: the row is still there.
		assert!(service.has_secret(&tenant, "short_lived").await.unwrap());
		assert!(service
			.get_secret_metadata(&tenant, "short_lived")
			.await
			.unwrap()
			.is_some());
	}

	#[tokio::test]
	async fn unexpired_secret_still_readable() {
		let (service, _pool) = service().await;
		let tenant = tenant();

		service
			.store_secret(
				&tenant,
				"still_valid",
				&value("here"),
				StoreSecretOptions {
					description: None,
					expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
				},
			)
			.await
			.unwrap();

		let secret = service.get_secret(&tenant, "still_valid").await.unwrap().unwrap();
		assert_eq!(secret.expose(), "here");
	}

	#[tokio::test]
	async fn list_secrets_returns_metadata_only() {
		let (service, _pool) = service().await;
		let tenant = tenant();

		service
			.store_secret(
				&tenant,
				"key_a",
				&value("a"),
				StoreSecretOptions {
					description: Some("first".to_string()),
					expires_at: None,
				},
			)
			.await
			.unwrap();
		service
			.store_secret(&tenant, "key_b", &value("b"), StoreSecretOptions::default())
			.await
			.unwrap();

		let listed = service.list_secrets(&tenant).await.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].key, "key_a");
		assert_eq!(listed[0].description.as_deref(), Some("first"));
		assert_eq!(listed[1].key, "key_b");
	}

	#[tokio::test]
	async fn rotation_rewraps_and_bumps_versions() {
		let (service, pool) = service().await;
		let tenant = tenant();

		service
			.store_secret(&tenant, "key_a", &value("alpha"), StoreSecretOptions::default())
			.await
			.unwrap();
		service
			.store_secret(&tenant, "key_b", &value("beta"), StoreSecretOptions::default())
			.await
			.unwrap();

		let repo = SecretRepository::new(pool);
		let before = repo.get_secret(&tenant, "key_a").await.unwrap().unwrap();

		let rotated = service.rotate_all_secrets(&tenant).await.unwrap();
		assert_eq!(rotated, 2);

		let after = repo.get_secret(&tenant, "key_a").await.unwrap().unwrap();
		// Fresh nonce: ciphertext changed even though key and value did not.
		assert_ne!(after.encrypted_value, before.encrypted_value);
		assert_eq!(after.version, before.version + 1);
		assert!(after.rotated_at.is_some());

		// Values survive the sweep.
		let a = service.get_secret(&tenant, "key_a").await.unwrap().unwrap();
		assert_eq!(a.expose(), "alpha");
		let b = service.get_secret(&tenant, "key_b").await.unwrap().unwrap();
		assert_eq!(b.expose(), "beta");
	}

	#[tokio::test]
	async fn rotation_skips_corrupted_row_and_reports_rest() {
		let (service, pool) = service().await;
		let tenant = tenant();

		service
			.store_secret(&tenant, "good_1", &value("one"), StoreSecretOptions::default())
			.await
			.unwrap();
		service
			.store_secret(&tenant, "bad", &value("two"), StoreSecretOptions::default())
			.await
			.unwrap();
		service
			.store_secret(&tenant, "good_2", &value("three"), StoreSecretOptions::default())
			.await
			.unwrap();

		// Corrupt one row's ciphertext behind the service's back.
		sqlx::query("UPDATE tenant_secrets SET encrypted_value = ? WHERE tenant_id = ? AND key = ?")
			.bind("not-a-valid-blob")
			.bind(tenant.to_string())
			.bind("bad")
			.execute(&pool)
			.await
			.unwrap();

		let rotated = service.rotate_all_secrets(&tenant).await.unwrap();
		assert_eq!(rotated, 2);

		// The corrupted row is untouched.
		let repo = SecretRepository::new(pool);
		let bad = repo.get_secret(&tenant, "bad").await.unwrap().unwrap();
		assert_eq!(bad.encrypted_value, "not-a-valid-blob");
		assert_eq!(bad.version, 1);
	}

	#[tokio::test]
	async fn delete_secret_reports_outcome() {
		let (service, _pool) = service().await;
		let tenant = tenant();

		service
			.store_secret(&tenant, "api_key", &value("v"), StoreSecretOptions::default())
			.await
			.unwrap();

		assert!(service.delete_secret(&tenant, "api_key").await.unwrap());
		assert!(!service.delete_secret(&tenant, "api_key").await.unwrap());
		assert!(service.get_secret(&tenant, "api_key").await.unwrap().is_none());
	}
}
