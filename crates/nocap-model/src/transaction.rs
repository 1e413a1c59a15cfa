// SPDX-License-Identifier: Apache-2.0

use crate::ids::{GrantId, SecurityId, StakeholderId, TransactionId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TransactionType {
    Issuance,
    Transfer,
    Exercise,
    Cancellation,
    Conversion,
    Redemption,
}

impl TransactionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issuance => "issuance",
            Self::Transfer => "transfer",
            Self::Exercise => "exercise",
            Self::Cancellation => "cancellation",
            Self::Conversion => "conversion",
            Self::Redemption => "redemption",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_stakeholder_id: Option<StakeholderId>,
    pub to_stakeholder_id: StakeholderId,
    pub security_id: SecurityId,
    pub quantity: u64,
    /// Cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_share_cents: Option<u64>,
    /// Cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_value_cents: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_id: Option<GrantId>,
    #[serde(with = "time::serde::rfc3339")]
    pub transaction_date: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
}
