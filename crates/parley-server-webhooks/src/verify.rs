// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-provider signature verification.
//!
//! All functions take the raw, unparsed request body - never a reserialized
//! JSON document, which could differ byte-for-byte from what the provider
//! signed. Comparison is constant-time throughout.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::WebhookVerifyError;
use crate::provider::WebhookProvider;

/// Stripe rejects events whose `t=` is older than this many seconds.
pub const STRIPE_DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify a Meta (Graph API) webhook signature.
///
/// Header format: `sha256=<hex HMAC-SHA256 of the raw body>`.
pub fn verify_meta(
	secret: &str,
	signature_header: &str,
	body: &[u8],
) -> Result<(), WebhookVerifyError> {
	const PREFIX: &str = "sha256=";

	if !signature_header.starts_with(PREFIX) {
		warn!("invalid meta webhook signature format: missing 'sha256=' prefix");
		return Err(WebhookVerifyError::MalformedHeader(
			"expected 'sha256=' prefix".to_string(),
		));
	}

	let expected_hex = &signature_header[PREFIX.len()..];

	if parley_common_webhook::verify_hmac_sha256(secret.as_bytes(), body, expected_hex) {
		debug!("meta webhook signature verified");
		Ok(())
	} else {
		warn!("meta webhook signature verification failed");
		Err(WebhookVerifyError::SignatureMismatch)
	}
}

/// Verify a Shopify webhook signature.
///
/// Header carries the base64 HMAC-SHA256 of the raw body.
pub fn verify_shopify(
	secret: &str,
	signature_header: &str,
	body: &[u8],
) -> Result<(), WebhookVerifyError> {
	if parley_common_webhook::verify_hmac_sha256_base64(secret.as_bytes(), body, signature_header) {
		debug!("shopify webhook signature verified");
		Ok(())
	} else {
		warn!("shopify webhook signature verification failed");
		Err(WebhookVerifyError::SignatureMismatch)
	}
}

/// Verify a WooCommerce webhook signature.
///
/// Same scheme as Shopify: base64 HMAC-SHA256 of the raw body. The
/// missing-header leniency WooCommerce deliveries sometimes need is policy,
/// handled at the HTTP layer - a header that is present must verify.
pub fn verify_woocommerce(
	secret: &str,
	signature_header: &str,
	body: &[u8],
) -> Result<(), WebhookVerifyError> {
	if parley_common_webhook::verify_hmac_sha256_base64(secret.as_bytes(), body, signature_header) {
		debug!("woocommerce webhook signature verified");
		Ok(())
	} else {
		warn!("woocommerce webhook signature verification failed");
		Err(WebhookVerifyError::SignatureMismatch)
	}
}

/// Parsed `stripe-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeSignatureHeader {
	/// Unix seconds at which Stripe produced the signature.
	pub timestamp: i64,
	/// One or more `v1=` hex signatures (multiple appear during endpoint
	/// secret rolls).
	pub v1_signatures: Vec<String>,
}

/// Parse a `stripe-signature` header of the form
/// `t=<unix-seconds>,v1=<hex>[,v1=<hex>...]`.
///
/// Unknown schemes (e.g. `v0=`) are ignored; a missing `t=` or missing `v1=`
/// is malformed.
pub fn parse_stripe_header(header: &str) -> Result<StripeSignatureHeader, WebhookVerifyError> {
	let mut timestamp: Option<i64> = None;
	let mut v1_signatures = Vec::new();

	for part in header.split(',') {
		let Some((scheme, value)) = part.trim().split_once('=') else {
			return Err(WebhookVerifyError::MalformedHeader(
				"expected 'key=value' pairs".to_string(),
			));
		};

		match scheme {
			"t" => {
				let ts = value.parse::<i64>().map_err(|_| {
					WebhookVerifyError::MalformedHeader("non-numeric timestamp".to_string())
				})?;
				timestamp = Some(ts);
			}
			"v1" => v1_signatures.push(value.to_string()),
			_ => {}
		}
	}

	let timestamp = timestamp.ok_or_else(|| {
		WebhookVerifyError::MalformedHeader("missing 't=' element".to_string())
	})?;

	if v1_signatures.is_empty() {
		return Err(WebhookVerifyError::MalformedHeader(
			"missing 'v1=' element".to_string(),
		));
	}

	Ok(StripeSignatureHeader {
		timestamp,
		v1_signatures,
	})
}

/// Verify a Stripe webhook signature.
///
/// Stripe signs `"{timestamp}.{raw body}"` rather than the body alone, and
/// a stale timestamp is rejected before any HMAC work - replayed captures
/// fail even with a correct signature.
pub fn verify_stripe(
	secret: &str,
	signature_header: &str,
	body: &[u8],
	now: DateTime<Utc>,
	tolerance_secs: i64,
) -> Result<(), WebhookVerifyError> {
	let parsed = parse_stripe_header(signature_header)?;

	let age_secs = now.timestamp() - parsed.timestamp;
	if age_secs > tolerance_secs {
		warn!(age_secs, tolerance_secs, "stripe webhook timestamp outside tolerance");
		return Err(WebhookVerifyError::StaleTimestamp {
			age_secs,
			tolerance_secs,
		});
	}

	let mut signed_payload = Vec::with_capacity(body.len() + 16);
	signed_payload.extend_from_slice(parsed.timestamp.to_string().as_bytes());
	signed_payload.push(b'.');
	signed_payload.extend_from_slice(body);

	let verified = parsed.v1_signatures.iter().any(|candidate| {
		parley_common_webhook::verify_hmac_sha256(secret.as_bytes(), &signed_payload, candidate)
	});

	if verified {
		debug!("stripe webhook signature verified");
		Ok(())
	} else {
		warn!("stripe webhook signature verification failed");
		Err(WebhookVerifyError::SignatureMismatch)
	}
}

/// Dispatch verification for a provider.
///
/// `now` and `tolerance_secs` only matter for Stripe; passing them here
/// keeps the function pure and testable against fixed clocks.
pub fn verify_signature(
	provider: WebhookProvider,
	secret: &str,
	signature_header: &str,
	body: &[u8],
	now: DateTime<Utc>,
	tolerance_secs: i64,
) -> Result<(), WebhookVerifyError> {
	match provider {
		WebhookProvider::Meta => verify_meta(secret, signature_header, body),
		WebhookProvider::Shopify => verify_shopify(secret, signature_header, body),
		WebhookProvider::Stripe => {
			verify_stripe(secret, signature_header, body, now, tolerance_secs)
		}
		WebhookProvider::WooCommerce => verify_woocommerce(secret, signature_header, body),
	}
}
