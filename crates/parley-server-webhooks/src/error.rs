// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Why an inbound webhook failed verification.
///
/// Every variant maps to an authorization rejection at the HTTP layer; the
/// distinctions exist for logging, not for the caller's response body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookVerifyError {
	#[error("missing signature header")]
	MissingSignature,

	#[error("malformed signature header: {0}")]
	MalformedHeader(String),

	#[error("signature mismatch")]
	SignatureMismatch,

	#[error("stale timestamp: {age_secs}s old exceeds {tolerance_secs}s tolerance")]
	StaleTimestamp { age_secs: i64, tolerance_secs: i64 },
}
