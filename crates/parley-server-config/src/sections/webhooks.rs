// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Webhook provider secrets and enforcement policy.

use parley_common_secret::SecretString;
use serde::Deserialize;

/// Default Stripe replay window in seconds.
pub const DEFAULT_STRIPE_TOLERANCE_SECS: i64 = 300;

/// Webhook configuration (runtime, fully resolved).
///
/// Each provider secret is optional. What happens when one is absent is
/// governed by `allow_unverified`: false (the default) rejects inbound
/// webhooks for unconfigured providers, true lets them through with a
/// warning. The permissive mode exists for local/staging environments and
/// must never be the production posture.
#[derive(Debug)]
pub struct WebhooksConfig {
	pub meta_app_secret: Option<SecretString>,
	pub shopify_webhook_secret: Option<SecretString>,
	pub stripe_webhook_secret: Option<SecretString>,
	pub woocommerce_webhook_secret: Option<SecretString>,
	pub allow_unverified: bool,
	pub stripe_tolerance_secs: i64,
}

impl Default for WebhooksConfig {
	fn default() -> Self {
		Self {
			meta_app_secret: None,
			shopify_webhook_secret: None,
			stripe_webhook_secret: None,
			woocommerce_webhook_secret: None,
			allow_unverified: false,
			stripe_tolerance_secs: DEFAULT_STRIPE_TOLERANCE_SECS,
		}
	}
}

/// Webhook configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhooksConfigLayer {
	#[serde(default)]
	pub meta_app_secret: Option<String>,
	#[serde(default)]
	pub shopify_webhook_secret: Option<String>,
	#[serde(default)]
	pub stripe_webhook_secret: Option<String>,
	#[serde(default)]
	pub woocommerce_webhook_secret: Option<String>,
	#[serde(default)]
	pub allow_unverified: Option<bool>,
	#[serde(default)]
	pub stripe_tolerance_secs: Option<i64>,
}

impl WebhooksConfigLayer {
	pub fn merge(&mut self, other: WebhooksConfigLayer) {
		if other.meta_app_secret.is_some() {
			self.meta_app_secret = other.meta_app_secret;
		}
		if other.shopify_webhook_secret.is_some() {
			self.shopify_webhook_secret = other.shopify_webhook_secret;
		}
		if other.stripe_webhook_secret.is_some() {
			self.stripe_webhook_secret = other.stripe_webhook_secret;
		}
		if other.woocommerce_webhook_secret.is_some() {
			self.woocommerce_webhook_secret = other.woocommerce_webhook_secret;
		}
		if other.allow_unverified.is_some() {
			self.allow_unverified = other.allow_unverified;
		}
		if other.stripe_tolerance_secs.is_some() {
			self.stripe_tolerance_secs = other.stripe_tolerance_secs;
		}
	}

	pub fn finalize(self) -> WebhooksConfig {
		WebhooksConfig {
			meta_app_secret: self.meta_app_secret.map(SecretString::new),
			shopify_webhook_secret: self.shopify_webhook_secret.map(SecretString::new),
			stripe_webhook_secret: self.stripe_webhook_secret.map(SecretString::new),
			woocommerce_webhook_secret: self.woocommerce_webhook_secret.map(SecretString::new),
			allow_unverified: self.allow_unverified.unwrap_or(false),
			stripe_tolerance_secs: self
				.stripe_tolerance_secs
				.unwrap_or(DEFAULT_STRIPE_TOLERANCE_SECS),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_closed() {
		let config = WebhooksConfigLayer::default().finalize();
		assert!(config.meta_app_secret.is_none());
		assert!(!config.allow_unverified);
		assert_eq!(config.stripe_tolerance_secs, 300);
	}

	#[test]
	fn test_merge_keeps_higher_precedence() {
		let mut base = WebhooksConfigLayer {
			meta_app_secret: Some("from-file".to_string()),
			allow_unverified: Some(false),
			..Default::default()
		};
		base.merge(WebhooksConfigLayer {
			meta_app_secret: Some("from-env".to_string()),
			stripe_tolerance_secs: Some(600),
			..Default::default()
		});

		let config = base.finalize();
		assert_eq!(config.meta_app_secret.unwrap().expose(), "from-env");
		assert!(!config.allow_unverified);
		assert_eq!(config.stripe_tolerance_secs, 600);
	}
}
