// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant secret repository.
//!
//! One row per `(tenant_id, key)`. Values arrive here already encrypted;
//! this layer never sees plaintext. Metadata queries deliberately exclude
//! the `encrypted_value` column so admin surfaces cannot transit ciphertext.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;
use crate::types::TenantId;

/// A full secret row, ciphertext included.
#[derive(Debug, Clone)]
pub struct SecretRecord {
	pub id: String,
	pub tenant_id: TenantId,
	pub key: String,
	pub encrypted_value: String,
	pub description: Option<String>,
	pub expires_at: Option<DateTime<Utc>>,
	pub rotated_at: Option<DateTime<Utc>>,
	pub version: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A secret row without its ciphertext.
#[derive(Debug, Clone)]
pub struct SecretMetadataRecord {
	pub id: String,
	pub tenant_id: TenantId,
	pub key: String,
	pub description: Option<String>,
	pub expires_at: Option<DateTime<Utc>>,
	pub rotated_at: Option<DateTime<Utc>>,
	pub version: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Parameters for [`SecretRepository::upsert_secret`].
#[derive(Debug, Clone)]
pub struct UpsertSecretParams {
	pub tenant_id: TenantId,
	pub key: String,
	pub encrypted_value: String,
	/// Always written: `None` clears an existing description.
	pub description: Option<String>,
	/// Always written: `None` clears an existing expiry.
	pub expires_at: Option<DateTime<Utc>>,
}

/// Repository for tenant secret database operations.
#[derive(Clone)]
pub struct SecretRepository {
	pool: SqlitePool,
}

impl SecretRepository {
	/// Create a new secret repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert or replace a secret in a single statement.
	///
	/// The unique `(tenant_id, key)` constraint makes this safe under
	/// concurrent writers: first write inserts at version 1, every
	/// subsequent write replaces the ciphertext, bumps `version` by one and
	/// stamps `rotated_at`.
	///
	/// # Returns
	/// The persisted row (ciphertext, never plaintext).
	#[tracing::instrument(skip(self, params), fields(tenant_id = %params.tenant_id, key = %params.key))]
	pub async fn upsert_secret(&self, params: &UpsertSecretParams) -> Result<SecretRecord, DbError> {
		let id = Uuid::new_v4().to_string();
		let now = Utc::now().to_rfc3339();

		let row = sqlx::query(
			r#"
			INSERT INTO tenant_secrets (
				id, tenant_id, key, encrypted_value, description, expires_at,
				rotated_at, version, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, NULL, 1, ?, ?)
			ON CONFLICT (tenant_id, key) DO UPDATE SET
				encrypted_value = excluded.encrypted_value,
				description = excluded.description,
				expires_at = excluded.expires_at,
				rotated_at = excluded.updated_at,
				version = tenant_secrets.version + 1,
				updated_at = excluded.updated_at
			RETURNING id, tenant_id, key, encrypted_value, description, expires_at,
			          rotated_at, version, created_at, updated_at
			"#,
		)
		.bind(&id)
		.bind(params.tenant_id.to_string())
		.bind(&params.key)
		.bind(&params.encrypted_value)
		.bind(&params.description)
		.bind(params.expires_at.map(|t| t.to_rfc3339()))
		.bind(&now)
		.bind(&now)
		.fetch_one(&self.pool)
		.await?;

		let record = parse_secret_row(&row)?;
		tracing::debug!(
			tenant_id = %record.tenant_id,
			key = %record.key,
			version = record.version,
			"secret upserted"
		);
		Ok(record)
	}

	/// Get a secret row (ciphertext included) by tenant and key.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn get_secret(
		&self,
		tenant_id: &TenantId,
		key: &str,
	) -> Result<Option<SecretRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, tenant_id, key, encrypted_value, description, expires_at,
			       rotated_at, version, created_at, updated_at
			FROM tenant_secrets
			WHERE tenant_id = ? AND key = ?
			"#,
		)
		.bind(tenant_id.to_string())
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(parse_secret_row(&row)?)),
			None => Ok(None),
		}
	}

	/// Get secret metadata by tenant and key, without the ciphertext.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn get_secret_metadata(
		&self,
		tenant_id: &TenantId,
		key: &str,
	) -> Result<Option<SecretMetadataRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, tenant_id, key, description, expires_at,
			       rotated_at, version, created_at, updated_at
			FROM tenant_secrets
			WHERE tenant_id = ? AND key = ?
			"#,
		)
		.bind(tenant_id.to_string())
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(parse_metadata_row(&row)?)),
			None => Ok(None),
		}
	}

	/// List secret metadata for a tenant, without ciphertext, ordered by key.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id))]
	pub async fn list_secret_metadata(
		&self,
		tenant_id: &TenantId,
	) -> Result<Vec<SecretMetadataRecord>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, tenant_id, key, description, expires_at,
			       rotated_at, version, created_at, updated_at
			FROM tenant_secrets
			WHERE tenant_id = ?
			ORDER BY key
			"#,
		)
		.bind(tenant_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let mut records = Vec::with_capacity(rows.len());
		for row in rows {
			records.push(parse_metadata_row(&row)?);
		}
		tracing::debug!(tenant_id = %tenant_id, count = records.len(), "listed secret metadata");
		Ok(records)
	}

	/// List full secret rows for a tenant. Rotation sweep input only.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id))]
	pub async fn list_secrets_with_values(
		&self,
		tenant_id: &TenantId,
	) -> Result<Vec<SecretRecord>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, tenant_id, key, encrypted_value, description, expires_at,
			       rotated_at, version, created_at, updated_at
			FROM tenant_secrets
			WHERE tenant_id = ?
			ORDER BY key
			"#,
		)
		.bind(tenant_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let mut records = Vec::with_capacity(rows.len());
		for row in rows {
			records.push(parse_secret_row(&row)?);
		}
		Ok(records)
	}

	/// Replace a secret's ciphertext in place, bumping its version.
	///
	/// Used by the rotation sweep after re-encryption.
	#[tracing::instrument(skip(self, encrypted_value), fields(secret_id = %id))]
	pub async fn replace_ciphertext(&self, id: &str, encrypted_value: &str) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();

		let result = sqlx::query(
			r#"
			UPDATE tenant_secrets
			SET encrypted_value = ?, version = version + 1, rotated_at = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(encrypted_value)
		.bind(&now)
		.bind(&now)
		.bind(id)
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("secret {id}")));
		}

		tracing::debug!(secret_id = %id, "secret ciphertext replaced");
		Ok(())
	}

	/// Delete a secret by tenant and key.
	///
	/// # Returns
	/// `true` if a row was deleted, `false` if none existed.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn delete_secret(&self, tenant_id: &TenantId, key: &str) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM tenant_secrets WHERE tenant_id = ? AND key = ?")
			.bind(tenant_id.to_string())
			.bind(key)
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::info!(tenant_id = %tenant_id, key = %key, "secret deleted");
		}
		Ok(deleted)
	}

	/// Check whether a secret row exists for tenant and key.
	#[tracing::instrument(skip(self), fields(tenant_id = %tenant_id, key = %key))]
	pub async fn has_secret(&self, tenant_id: &TenantId, key: &str) -> Result<bool, DbError> {
		let row = sqlx::query("SELECT 1 FROM tenant_secrets WHERE tenant_id = ? AND key = ?")
			.bind(tenant_id.to_string())
			.bind(key)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.is_some())
	}
}

fn parse_secret_row(row: &sqlx::sqlite::SqliteRow) -> Result<SecretRecord, DbError> {
	Ok(SecretRecord {
		id: row.try_get("id")?,
		tenant_id: parse_tenant_id(&row.try_get::<String, _>("tenant_id")?)?,
		key: row.try_get("key")?,
		encrypted_value: row.try_get("encrypted_value")?,
		description: row.try_get("description")?,
		expires_at: parse_optional_timestamp(row.try_get("expires_at")?)?,
		rotated_at: parse_optional_timestamp(row.try_get("rotated_at")?)?,
		version: row.try_get("version")?,
		created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
		updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
	})
}

fn parse_metadata_row(row: &sqlx::sqlite::SqliteRow) -> Result<SecretMetadataRecord, DbError> {
	Ok(SecretMetadataRecord {
		id: row.try_get("id")?,
		tenant_id: parse_tenant_id(&row.try_get::<String, _>("tenant_id")?)?,
		key: row.try_get("key")?,
		description: row.try_get("description")?,
		expires_at: parse_optional_timestamp(row.try_get("expires_at")?)?,
		rotated_at: parse_optional_timestamp(row.try_get("rotated_at")?)?,
		version: row.try_get("version")?,
		created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
		updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
	})
}

fn parse_tenant_id(raw: &str) -> Result<TenantId, DbError> {
	raw.parse::<TenantId>()
		.map_err(|_| DbError::Internal(format!("invalid tenant id in database: {raw}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|t| t.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("invalid timestamp in database: {e}")))
}

fn parse_optional_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>, DbError> {
	match raw {
		Some(s) => parse_timestamp(&s).map(Some),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_secrets_test_pool;
	use uuid::Uuid;

	fn tenant() -> TenantId {
		TenantId::new(Uuid::new_v4())
	}

	fn params(tenant_id: TenantId, key: &str, blob: &str) -> UpsertSecretParams {
		UpsertSecretParams {
			tenant_id,
			key: key.to_string(),
			encrypted_value: blob.to_string(),
			description: None,
			expires_at: None,
		}
	}

	#[tokio::test]
	async fn upsert_creates_at_version_one() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);
		let tenant = tenant();

		let record = repo
			.upsert_secret(&params(tenant, "whatsapp_access_token", "blob-1"))
			.await
			.unwrap();

		assert_eq!(record.version, 1);
		assert_eq!(record.encrypted_value, "blob-1");
		assert!(record.rotated_at.is_none());
	}

	#[tokio::test]
	async fn upsert_replaces_and_bumps_version() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);
		let tenant = tenant();

		let first = repo
			.upsert_secret(&params(tenant, "api_key", "blob-1"))
			.await
			.unwrap();
		let second = repo
			.upsert_secret(&params(tenant, "api_key", "blob-2"))
			.await
			.unwrap();

		assert_eq!(second.version, first.version + 1);
		assert_eq!(second.encrypted_value, "blob-2");
		assert_eq!(second.id, first.id, "row identity survives replacement");
		assert!(second.rotated_at.is_some());
		assert_eq!(second.created_at, first.created_at);
	}

	#[tokio::test]
	async fn upsert_is_tenant_scoped() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);
		let tenant_a = tenant();
		let tenant_b = tenant();

		repo.upsert_secret(&params(tenant_a, "api_key", "blob-a"))
			.await
			.unwrap();
		let b = repo
			.upsert_secret(&params(tenant_b, "api_key", "blob-b"))
			.await
			.unwrap();

		// Same key under a different tenant is a fresh row at version 1.
		assert_eq!(b.version, 1);
		let a = repo.get_secret(&tenant_a, "api_key").await.unwrap().unwrap();
		assert_eq!(a.encrypted_value, "blob-a");
	}

	#[tokio::test]
	async fn metadata_projection_has_no_ciphertext() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);
		let tenant = tenant();

		let mut p = params(tenant, "stripe_api_key", "blob-1");
		p.description = Some("Stripe restricted key".to_string());
		repo.upsert_secret(&p).await.unwrap();

		let listed = repo.list_secret_metadata(&tenant).await.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].key, "stripe_api_key");
		assert_eq!(listed[0].description.as_deref(), Some("Stripe restricted key"));

		let single = repo
			.get_secret_metadata(&tenant, "stripe_api_key")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(single.version, 1);
	}

	#[tokio::test]
	async fn replace_ciphertext_bumps_version_and_rotated_at() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);
		let tenant = tenant();

		let record = repo
			.upsert_secret(&params(tenant, "api_key", "blob-1"))
			.await
			.unwrap();
		repo.replace_ciphertext(&record.id, "blob-2").await.unwrap();

		let updated = repo.get_secret(&tenant, "api_key").await.unwrap().unwrap();
		assert_eq!(updated.version, 2);
		assert_eq!(updated.encrypted_value, "blob-2");
		assert!(updated.rotated_at.is_some());
	}

	#[tokio::test]
	async fn replace_ciphertext_missing_row_is_not_found() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);

		let result = repo.replace_ciphertext("missing-id", "blob").await;
		assert!(matches!(result, Err(DbError::NotFound(_))));
	}

	#[tokio::test]
	async fn delete_and_has_secret() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);
		let tenant = tenant();

		repo.upsert_secret(&params(tenant, "api_key", "blob"))
			.await
			.unwrap();
		assert!(repo.has_secret(&tenant, "api_key").await.unwrap());

		assert!(repo.delete_secret(&tenant, "api_key").await.unwrap());
		assert!(!repo.has_secret(&tenant, "api_key").await.unwrap());
		assert!(!repo.delete_secret(&tenant, "api_key").await.unwrap());
	}

	#[tokio::test]
	async fn expiry_roundtrips_through_storage() {
		let pool = create_secrets_test_pool().await;
		let repo = SecretRepository::new(pool);
		let tenant = tenant();

		let expires = Utc::now() + chrono::Duration::hours(6);
		let mut p = params(tenant, "short_lived", "blob");
		p.expires_at = Some(expires);
		repo.upsert_secret(&p).await.unwrap();

		let record = repo.get_secret(&tenant, "short_lived").await.unwrap().unwrap();
		let stored = record.expires_at.unwrap();
		assert!((stored - expires).num_seconds().abs() < 1);
	}
}
