// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tenant ID (for multi-tenant isolation).
///
/// Tenants are provisioned by the onboarding subsystem; this layer treats
/// the id as an opaque scope key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TenantId(pub Uuid);

impl TenantId {
	pub fn new(id: Uuid) -> Self {
		Self(id)
	}

	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl fmt::Display for TenantId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for TenantId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_and_parse_roundtrip() {
		let id = TenantId::new(Uuid::new_v4());
		let parsed: TenantId = id.to_string().parse().unwrap();
		assert_eq!(id, parsed);
	}

	#[test]
	fn rejects_invalid_uuid() {
		assert!("not-a-uuid".parse::<TenantId>().is_err());
	}
}
