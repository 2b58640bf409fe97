// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;
use utoipa::ToSchema;

/// Acknowledgement returned to a provider after a verified delivery.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAckResponse {
	pub received: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookErrorResponse {
	pub error: String,
	pub message: String,
}
