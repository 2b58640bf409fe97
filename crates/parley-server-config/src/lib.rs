// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Parley server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Secret-valued fields wrapped in [`parley_common_secret::SecretString`]
//!
//! # Usage
//!
//! ```ignore
//! use parley_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}:{}", config.http.host, config.http.port);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
	Production,
	Staging,
	#[default]
	Development,
}

impl Environment {
	pub fn is_production(&self) -> bool {
		matches!(self, Environment::Production)
	}

	fn parse(raw: Option<&str>) -> Self {
		match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
			Some("production") | Some("prod") => Environment::Production,
			Some("staging") => Environment::Staging,
			_ => Environment::Development,
		}
	}
}

/// Fully resolved server configuration.
#[derive(Debug, Default)]
pub struct ServerConfig {
	pub environment: Environment,
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub encryption: EncryptionConfig,
	pub webhooks: WebhooksConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables
/// 2. Config file (`/etc/parley/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let environment = Environment::parse(layer.environment.as_deref());
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let encryption = layer.encryption.unwrap_or_default().finalize();
	let webhooks = layer.webhooks.unwrap_or_default().finalize();

	let config = ServerConfig {
		environment,
		http,
		database,
		logging,
		encryption,
		webhooks,
	};

	validate_config(&config)?;

	info!(
		environment = ?config.environment,
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		encryption_key_configured = config.encryption.key.is_some(),
		allow_unverified_webhooks = config.webhooks.allow_unverified,
		"configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	// Production must never start without a real encryption key: the vault
	// would silently fall back to the shared dev key.
	if config.environment.is_production() && config.encryption.key.is_none() {
		return Err(ConfigError::MissingKey {
			key: "ENCRYPTION_KEY".to_string(),
		});
	}

	if config.webhooks.stripe_tolerance_secs <= 0 {
		return Err(ConfigError::InvalidValue {
			key: "STRIPE_WEBHOOK_TOLERANCE_SECS".to_string(),
			message: "tolerance must be positive".to_string(),
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_environment_parsing() {
		assert_eq!(Environment::parse(Some("production")), Environment::Production);
		assert_eq!(Environment::parse(Some("PROD")), Environment::Production);
		assert_eq!(Environment::parse(Some("staging")), Environment::Staging);
		assert_eq!(Environment::parse(Some("development")), Environment::Development);
		assert_eq!(Environment::parse(None), Environment::Development);
		assert_eq!(Environment::parse(Some("weird")), Environment::Development);
	}

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.environment, Environment::Development);
		assert_eq!(config.socket_addr(), "127.0.0.1:8080");
		assert!(config.encryption.key.is_none());
		assert!(!config.webhooks.allow_unverified);
	}

	#[test]
	fn test_production_without_key_fails() {
		let layer = ServerConfigLayer {
			environment: Some("production".to_string()),
			..Default::default()
		};
		let result = finalize(layer);
		assert!(matches!(result, Err(ConfigError::MissingKey { .. })));
	}

	#[test]
	fn test_production_with_key_succeeds() {
		let layer = ServerConfigLayer {
			environment: Some("production".to_string()),
			encryption: Some(sections::EncryptionConfigLayer {
				key: Some("high-entropy-operator-secret".to_string()),
			}),
			..Default::default()
		};
		let config = finalize(layer).unwrap();
		assert!(config.environment.is_production());
		assert!(config.encryption.key.is_some());
	}

	#[test]
	fn test_nonpositive_tolerance_rejected() {
		let layer = ServerConfigLayer {
			webhooks: Some(sections::WebhooksConfigLayer {
				stripe_tolerance_secs: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(
			finalize(layer),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
