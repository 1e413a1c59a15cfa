// SPDX-License-Identifier: Apache-2.0

use crate::ids::SecurityId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SecurityType {
    Common,
    Preferred,
    Option,
    Warrant,
    Safe,
    Rsu,
}

impl SecurityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Preferred => "preferred",
            Self::Option => "option",
            Self::Warrant => "warrant",
            Self::Safe => "safe",
            Self::Rsu => "rsu",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Common => "Common Stock",
            Self::Preferred => "Preferred Stock",
            Self::Option => "Stock Option",
            Self::Warrant => "Warrant",
            Self::Safe => "SAFE",
            Self::Rsu => "RSU",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Security {
    pub id: SecurityId,
    #[serde(rename = "type")]
    pub kind: SecurityType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_class: Option<String>,
    /// Cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par_value_cents: Option<u64>,
    /// Vote multiplier, e.g. 1 or 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_rights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidation_preference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_ratio: Option<f64>,
    /// Cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_share_cents: Option<u64>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_types_have_wire_and_display_names() {
        assert_eq!(SecurityType::Safe.as_str(), "safe");
        assert_eq!(SecurityType::Safe.display_name(), "SAFE");
        assert_eq!(SecurityType::Preferred.display_name(), "Preferred Stock");
    }
}
