// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parley engagement platform server binary.

use clap::{Parser, Subcommand};
use parley_server::{create_app_state, create_router};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parley server - HTTP server for the engagement platform core.
#[derive(Parser, Debug)]
#[command(
	name = "parley-server",
	about = "Parley engagement platform server",
	version
)]
struct Args {
	/// Subcommands for parley-server (e.g., `generate-key`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
	/// Generate a fresh base64-encoded 256-bit ENCRYPTION_KEY
	GenerateKey,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Parse CLI arguments
	let args = Args::parse();

	// Handle subcommands that should not start the server
	match args.command {
		Some(Command::Version) => {
			println!("parley-server {}", env!("CARGO_PKG_VERSION"));
			return Ok(());
		}
		Some(Command::GenerateKey) => {
			println!("{}", parley_server_secrets::cipher::generate_key());
			return Ok(());
		}
		None => {}
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Load configuration
	let config = parley_server_config::load_config()?;

	// Setup tracing
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting parley-server"
	);

	// Create database pool and run migrations
	let pool = parley_server_db::create_pool(&config.database.url).await?;
	parley_server_db::run_migrations(&pool).await?;

	let addr = config.socket_addr();
	let state = create_app_state(pool, config)?;

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	// Start server
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	// Run server with graceful shutdown
	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
