// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inbound webhook ingest, gated on provider signatures.
//!
//! The body is taken as raw bytes so the HMAC covers exactly what the
//! provider signed; JSON parsing happens only after verification. The
//! enforcement policy is fail-closed: a missing provider secret - or
//! WooCommerce's occasional missing signature header - passes only when
//! `ALLOW_UNVERIFIED_WEBHOOKS` was explicitly enabled, and always with a
//! warning.

use axum::{
	body::Bytes,
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	Json,
};
use chrono::Utc;
use parley_server_webhooks::{verify_signature, WebhookProvider};

pub use parley_server_api::webhooks::*;

use crate::{
	api::AppState,
	api_response::{not_found, unauthorized},
	impl_api_error_response,
};

impl_api_error_response!(WebhookErrorResponse);

fn accepted(provider: WebhookProvider, body_len: usize, verified: bool) -> axum::response::Response {
	tracing::info!(provider = %provider, bytes = body_len, verified, "webhook accepted");
	(StatusCode::OK, Json(WebhookAckResponse { received: true })).into_response()
}

#[utoipa::path(
    post,
    path = "/webhooks/{provider}",
    params(
        ("provider" = String, Path, description = "Provider tag: meta, shopify, stripe or woocommerce")
    ),
    request_body = Vec<u8>,
    responses(
        (status = 200, description = "Webhook accepted", body = WebhookAckResponse),
        (status = 401, description = "Signature verification failed", body = WebhookErrorResponse),
        (status = 404, description = "Unknown provider", body = WebhookErrorResponse)
    ),
    tag = "webhooks"
)]
#[tracing::instrument(skip(state, headers, body), fields(%provider))]
pub async fn ingest_webhook(
	State(state): State<AppState>,
	Path(provider): Path<String>,
	headers: HeaderMap,
	body: Bytes,
) -> impl IntoResponse {
	let provider = match provider.parse::<WebhookProvider>() {
		Ok(p) => p,
		Err(()) => {
			return not_found::<WebhookErrorResponse>("Unknown webhook provider").into_response();
		}
	};

	let allow_unverified = state.webhooks.allow_unverified;

	// Header first: a provider that signs its deliveries and sent nothing is
	// rejected before any secret handling. WooCommerce omits the header on
	// some delivery paths, so it alone gets the allow-unverified escape.
	let signature_header = headers
		.get(provider.signature_header())
		.and_then(|v| v.to_str().ok());

	let signature_header = match signature_header {
		Some(value) => value,
		None => {
			if provider == WebhookProvider::WooCommerce && allow_unverified {
				tracing::warn!(
					provider = %provider,
					"accepting woocommerce webhook without signature header (allow_unverified)"
				);
				return accepted(provider, body.len(), false);
			}
			tracing::warn!(provider = %provider, "webhook rejected: missing signature header");
			return unauthorized::<WebhookErrorResponse>(
				"missing_signature",
				"Signature header is required",
			)
			.into_response();
		}
	};

	let secret = match state.provider_secret(provider) {
		Some(secret) => secret,
		None => {
			if allow_unverified {
				tracing::warn!(
					provider = %provider,
					"accepting unverified webhook: no secret configured (allow_unverified)"
				);
				return accepted(provider, body.len(), false);
			}
			tracing::warn!(provider = %provider, "webhook rejected: no secret configured");
			return unauthorized::<WebhookErrorResponse>(
				"verification_unavailable",
				"Webhook verification is not configured for this provider",
			)
			.into_response();
		}
	};

	match verify_signature(
		provider,
		secret.expose(),
		signature_header,
		&body,
		Utc::now(),
		state.webhooks.stripe_tolerance_secs,
	) {
		Ok(()) => accepted(provider, body.len(), true),
		Err(e) => {
			tracing::warn!(provider = %provider, error = %e, "webhook signature rejected");
			unauthorized::<WebhookErrorResponse>("invalid_signature", "Signature verification failed")
				.into_response()
		}
	}
}
