// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use axum::{
	routing::{get, post, put},
	Router,
};
use parley_common_secret::SecretString;
use parley_server_config::{ServerConfig, WebhooksConfig};
use parley_server_db::SecretRepository;
use parley_server_secrets::{SecretCipher, SecretsService, SecretsResult};
use parley_server_webhooks::WebhookProvider;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::routes;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub secrets_service: Arc<SecretsService>,
	pub webhooks: Arc<WebhooksConfig>,
}

impl AppState {
	/// Resolve the configured shared secret for a provider, if any.
	pub fn provider_secret(&self, provider: WebhookProvider) -> Option<&SecretString> {
		match provider {
			WebhookProvider::Meta => self.webhooks.meta_app_secret.as_ref(),
			WebhookProvider::Shopify => self.webhooks.shopify_webhook_secret.as_ref(),
			WebhookProvider::Stripe => self.webhooks.stripe_webhook_secret.as_ref(),
			WebhookProvider::WooCommerce => self.webhooks.woocommerce_webhook_secret.as_ref(),
		}
	}
}

/// Build application state from configuration.
///
/// Fails when the encryption key is missing in production - the vault must
/// not silently fall back to the dev key there.
pub fn create_app_state(pool: SqlitePool, config: ServerConfig) -> SecretsResult<AppState> {
	let cipher = SecretCipher::from_config(
		config.encryption.key.as_ref(),
		config.environment.is_production(),
	)?;
	let repo = SecretRepository::new(pool.clone());
	let secrets_service = Arc::new(SecretsService::new(repo, cipher));

	Ok(AppState {
		pool,
		secrets_service,
		webhooks: Arc::new(config.webhooks),
	})
}

/// Assemble the router.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route(
			"/api/tenants/{tenant_id}/secrets",
			get(routes::secrets::list_tenant_secrets),
		)
		.route(
			"/api/tenants/{tenant_id}/secrets/rotate",
			post(routes::secrets::rotate_tenant_secrets),
		)
		.route(
			"/api/tenants/{tenant_id}/secrets/{key}",
			put(routes::secrets::store_tenant_secret)
				.get(routes::secrets::get_tenant_secret)
				.delete(routes::secrets::delete_tenant_secret),
		)
		.route("/webhooks/{provider}", post(routes::webhooks::ingest_webhook))
		.with_state(state)
}
