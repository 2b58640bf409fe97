// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod database;
mod encryption;
mod http;
mod logging;
mod webhooks;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use encryption::{EncryptionConfig, EncryptionConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use webhooks::{WebhooksConfig, WebhooksConfigLayer, DEFAULT_STRIPE_TOLERANCE_SECS};
