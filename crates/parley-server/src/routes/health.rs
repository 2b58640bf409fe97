// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
	pub status: &'static str,
	pub database: &'static str,
	pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "System is unhealthy", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - Liveness plus a database ping.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let database_ok = sqlx::query("SELECT 1")
		.fetch_one(&state.pool)
		.await
		.is_ok();

	let (http_status, status, database) = if database_ok {
		(StatusCode::OK, "healthy", "ok")
	} else {
		(StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "unreachable")
	};

	(
		http_status,
		Json(HealthResponse {
			status,
			database,
			timestamp: chrono::Utc::now().to_rfc3339(),
		}),
	)
}
