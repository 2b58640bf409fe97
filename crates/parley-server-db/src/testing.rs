// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

pub async fn create_tenant_secrets_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS tenant_secrets (
			id TEXT PRIMARY KEY,
			tenant_id TEXT NOT NULL,
			key TEXT NOT NULL,
			encrypted_value TEXT NOT NULL,
			description TEXT,
			expires_at TEXT,
			rotated_at TEXT,
			version INTEGER NOT NULL DEFAULT 1,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL,
			UNIQUE (tenant_id, key)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_secrets_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_tenant_secrets_table(&pool).await;
	pool
}
