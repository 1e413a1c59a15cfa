// SPDX-License-Identifier: Apache-2.0

use crate::ids::{CapTableId, CompanyId, SecurityId, StakeholderId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapTableEntry {
    pub stakeholder_id: StakeholderId,
    pub security_id: SecurityId,
    pub shares: u64,
    /// Computed from share counts; never authoritative.
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diluted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapTable {
    pub id: CapTableId,
    pub company_id: CompanyId,
    #[serde(with = "time::serde::rfc3339")]
    pub as_of_date: OffsetDateTime,
    pub entries: Vec<CapTableEntry>,
    pub total_shares: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_diluted_shares: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_pool_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treasury_shares: Option<u64>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
}

impl CapTable {
    /// Sum of shares across raw entries (not the stored total).
    #[must_use]
    pub fn entry_share_sum(&self) -> u64 {
        self.entries.iter().map(|e| e.shares).sum()
    }

    /// Entries held by one stakeholder.
    #[must_use]
    pub fn entries_for(&self, stakeholder: &StakeholderId) -> Vec<&CapTableEntry> {
        self.entries
            .iter()
            .filter(|e| &e.stakeholder_id == stakeholder)
            .collect()
    }
}
