// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum UserRole {
    Founder,
    Employee,
    Investor,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Founder => "founder",
            Self::Employee => "employee",
            Self::Investor => "investor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Wallet {
    /// `0x` + 40 hex characters.
    pub address: String,
    /// `0x1234…abcd` form for display.
    pub short_address: String,
    pub provider: String,
}

/// The whole persistence layer of the original demo: one serialized blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSession {
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<Wallet>,
    pub role: UserRole,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
}
