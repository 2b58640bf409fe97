// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// External providers whose webhooks this server accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookProvider {
	Meta,
	Shopify,
	Stripe,
	WooCommerce,
}

impl WebhookProvider {
	pub fn as_str(&self) -> &'static str {
		match self {
			WebhookProvider::Meta => "meta",
			WebhookProvider::Shopify => "shopify",
			WebhookProvider::Stripe => "stripe",
			WebhookProvider::WooCommerce => "woocommerce",
		}
	}

	/// Header carrying this provider's signature.
	pub fn signature_header(&self) -> &'static str {
		match self {
			WebhookProvider::Meta => "x-hub-signature-256",
			WebhookProvider::Shopify => "x-shopify-hmac-sha256",
			WebhookProvider::Stripe => "stripe-signature",
			WebhookProvider::WooCommerce => "x-wc-webhook-signature",
		}
	}

	pub fn all() -> [WebhookProvider; 4] {
		[
			WebhookProvider::Meta,
			WebhookProvider::Shopify,
			WebhookProvider::Stripe,
			WebhookProvider::WooCommerce,
		]
	}
}

impl std::fmt::Display for WebhookProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for WebhookProvider {
	type Err = ();
	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"meta" => Ok(WebhookProvider::Meta),
			"shopify" => Ok(WebhookProvider::Shopify),
			"stripe" => Ok(WebhookProvider::Stripe),
			"woocommerce" => Ok(WebhookProvider::WooCommerce),
			_ => Err(()),
		}
	}
}
