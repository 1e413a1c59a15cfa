// SPDX-License-Identifier: Apache-2.0

use crate::ids::CompanyId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StablecoinBalance {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Smallest unit of the token.
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    /// Cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_value_cents: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Treasury {
    pub company_id: CompanyId,
    pub usd_cents: u64,
    pub stablecoins: Vec<StablecoinBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runway_days: Option<u32>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}
