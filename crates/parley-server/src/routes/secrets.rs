// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secrets management HTTP handlers.
//!
//! Tenant-scoped secret endpoints. These return metadata only - neither
//! plaintext values nor ciphertext ever transit this API. Decrypted values
//! are available exclusively to in-process callers via
//! `SecretsService::get_secret`.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use parley_common_secret::SecretString;
use parley_server_secrets::{SecretMetadata, StoreSecretOptions};

pub use parley_server_api::secrets::*;

use crate::{
	api::AppState,
	api_response::{bad_request, id_parse_error, internal_error, not_found},
	impl_api_error_response,
	validation::{parse_tenant_id, validate_secret_key},
};

impl_api_error_response!(SecretErrorResponse);

fn metadata_response(meta: SecretMetadata) -> SecretMetadataResponse {
	SecretMetadataResponse {
		key: meta.key,
		description: meta.description,
		expires_at: meta.expires_at,
		rotated_at: meta.rotated_at,
		version: meta.version,
		created_at: meta.created_at,
		updated_at: meta.updated_at,
	}
}

#[utoipa::path(
    get,
    path = "/api/tenants/{tenant_id}/secrets",
    params(
        ("tenant_id" = String, Path, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "List of secrets", body = ListSecretsResponse),
        (status = 400, description = "Invalid tenant ID", body = SecretErrorResponse)
    ),
    tag = "secrets"
)]
#[tracing::instrument(skip(state), fields(%tenant_id))]
pub async fn list_tenant_secrets(
	State(state): State<AppState>,
	Path(tenant_id): Path<String>,
) -> impl IntoResponse {
	let tenant_id = match parse_tenant_id(&tenant_id, "Invalid tenant ID") {
		Ok(id) => id,
		Err(e) => return id_parse_error::<SecretErrorResponse>(e).into_response(),
	};

	match state.secrets_service.list_secrets(&tenant_id).await {
		Ok(secrets) => {
			let secrets = secrets.into_iter().map(metadata_response).collect();
			(StatusCode::OK, Json(ListSecretsResponse { secrets })).into_response()
		}
		Err(e) => {
			tracing::error!(error = %e, "Failed to list tenant secrets");
			internal_error::<SecretErrorResponse>("Failed to list secrets").into_response()
		}
	}
}

#[utoipa::path(
    put,
    path = "/api/tenants/{tenant_id}/secrets/{key}",
    params(
        ("tenant_id" = String, Path, description = "Tenant ID"),
        ("key" = String, Path, description = "Secret key name")
    ),
    request_body = StoreSecretRequest,
    responses(
        (status = 200, description = "Secret stored", body = SecretMetadataResponse),
        (status = 400, description = "Invalid request", body = SecretErrorResponse)
    ),
    tag = "secrets"
)]
#[tracing::instrument(skip(state, payload), fields(%tenant_id, %key))]
pub async fn store_tenant_secret(
	State(state): State<AppState>,
	Path((tenant_id, key)): Path<(String, String)>,
	Json(payload): Json<StoreSecretRequest>,
) -> impl IntoResponse {
	let tenant_id = match parse_tenant_id(&tenant_id, "Invalid tenant ID") {
		Ok(id) => id,
		Err(e) => return id_parse_error::<SecretErrorResponse>(e).into_response(),
	};

	if !validate_secret_key(&key) {
		return bad_request::<SecretErrorResponse>(
			"invalid_key",
			"Secret keys are 1-128 characters of [A-Za-z0-9_.-]",
		)
		.into_response();
	}

	let value = SecretString::new(payload.value);
	let options = StoreSecretOptions {
		description: payload.description,
		expires_at: payload.expires_at,
	};

	match state
		.secrets_service
		.store_secret(&tenant_id, &key, &value, options)
		.await
	{
		Ok(meta) => (StatusCode::OK, Json(metadata_response(meta))).into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to store tenant secret");
			internal_error::<SecretErrorResponse>("Failed to store secret").into_response()
		}
	}
}

#[utoipa::path(
    get,
    path = "/api/tenants/{tenant_id}/secrets/{key}",
    params(
        ("tenant_id" = String, Path, description = "Tenant ID"),
        ("key" = String, Path, description = "Secret key name")
    ),
    responses(
        (status = 200, description = "Secret metadata", body = SecretMetadataResponse),
        (status = 404, description = "Secret not found", body = SecretErrorResponse)
    ),
    tag = "secrets"
)]
#[tracing::instrument(skip(state), fields(%tenant_id, %key))]
pub async fn get_tenant_secret(
	State(state): State<AppState>,
	Path((tenant_id, key)): Path<(String, String)>,
) -> impl IntoResponse {
	let tenant_id = match parse_tenant_id(&tenant_id, "Invalid tenant ID") {
		Ok(id) => id,
		Err(e) => return id_parse_error::<SecretErrorResponse>(e).into_response(),
	};

	match state
		.secrets_service
		.get_secret_metadata(&tenant_id, &key)
		.await
	{
		Ok(Some(meta)) => (StatusCode::OK, Json(metadata_response(meta))).into_response(),
		Ok(None) => not_found::<SecretErrorResponse>("Secret not found").into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to get tenant secret");
			internal_error::<SecretErrorResponse>("Failed to get secret").into_response()
		}
	}
}

#[utoipa::path(
    delete,
    path = "/api/tenants/{tenant_id}/secrets/{key}",
    params(
        ("tenant_id" = String, Path, description = "Tenant ID"),
        ("key" = String, Path, description = "Secret key name")
    ),
    responses(
        (status = 200, description = "Secret deleted", body = SecretSuccessResponse),
        (status = 404, description = "Secret not found", body = SecretErrorResponse)
    ),
    tag = "secrets"
)]
#[tracing::instrument(skip(state), fields(%tenant_id, %key))]
pub async fn delete_tenant_secret(
	State(state): State<AppState>,
	Path((tenant_id, key)): Path<(String, String)>,
) -> impl IntoResponse {
	let tenant_id = match parse_tenant_id(&tenant_id, "Invalid tenant ID") {
		Ok(id) => id,
		Err(e) => return id_parse_error::<SecretErrorResponse>(e).into_response(),
	};

	match state.secrets_service.delete_secret(&tenant_id, &key).await {
		Ok(true) => (
			StatusCode::OK,
			Json(SecretSuccessResponse {
				message: "Secret deleted".to_string(),
			}),
		)
			.into_response(),
		Ok(false) => not_found::<SecretErrorResponse>("Secret not found").into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to delete tenant secret");
			internal_error::<SecretErrorResponse>("Failed to delete secret").into_response()
		}
	}
}

#[utoipa::path(
    post,
    path = "/api/tenants/{tenant_id}/secrets/rotate",
    params(
        ("tenant_id" = String, Path, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Rotation sweep finished", body = RotateSecretsResponse),
        (status = 400, description = "Invalid tenant ID", body = SecretErrorResponse)
    ),
    tag = "secrets"
)]
#[tracing::instrument(skip(state), fields(%tenant_id))]
pub async fn rotate_tenant_secrets(
	State(state): State<AppState>,
	Path(tenant_id): Path<String>,
) -> impl IntoResponse {
	let tenant_id = match parse_tenant_id(&tenant_id, "Invalid tenant ID") {
		Ok(id) => id,
		Err(e) => return id_parse_error::<SecretErrorResponse>(e).into_response(),
	};

	match state.secrets_service.rotate_all_secrets(&tenant_id).await {
		Ok(rotated) => (StatusCode::OK, Json(RotateSecretsResponse { rotated })).into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to rotate tenant secrets");
			internal_error::<SecretErrorResponse>("Failed to rotate secrets").into_response()
		}
	}
}
