// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parley engagement platform server.
//!
//! This crate provides the HTTP surface over the tenant secret vault and
//! the signature-gated webhook ingest endpoints, backed by SQLite.

pub mod api;
pub mod api_response;
pub mod routes;
pub mod validation;

pub use api::{create_app_state, create_router, AppState};
pub use parley_server_config::ServerConfig;
