// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inbound webhook signature verification.
//!
//! Each supported provider signs the raw request body with HMAC-SHA256 over
//! a shared secret, but transmits the signature differently:
//!
//! | provider    | header                   | encoding          |
//! |-------------|--------------------------|-------------------|
//! | meta        | `x-hub-signature-256`    | `sha256=` + hex   |
//! | shopify     | `x-shopify-hmac-sha256`  | base64            |
//! | stripe      | `stripe-signature`       | `t=<ts>,v1=<hex>` |
//! | woocommerce | `x-wc-webhook-signature` | base64            |
//!
//! Stripe additionally signs `"{timestamp}.{body}"` and gets a replay window
//! check. Verification is a pure function of (provider, secret, header, raw
//! body); enforcement policy - what to do when a secret or header is absent -
//! belongs to the HTTP layer.

pub mod error;
pub mod provider;
pub mod verify;

pub use error::WebhookVerifyError;
pub use provider::WebhookProvider;
pub use verify::{
	parse_stripe_header, verify_meta, verify_shopify, verify_signature, verify_stripe,
	verify_woocommerce, StripeSignatureHeader, STRIPE_DEFAULT_TOLERANCE_SECS,
};
