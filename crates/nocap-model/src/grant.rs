// SPDX-License-Identifier: Apache-2.0

use crate::ids::{CompanyId, GrantId, ScheduleId, SecurityId, StakeholderId};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum GrantStatus {
    Active,
    Cancelled,
    Expired,
    Exercised,
}

impl GrantStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Exercised => "exercised",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum VestingInterval {
    Monthly,
    Quarterly,
    Yearly,
}

impl VestingInterval {
    /// Interval length in whole months.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VestingSchedule {
    pub id: ScheduleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cliff_months: u32,
    pub duration_months: u32,
    pub vesting_interval: VestingInterval,
    /// Percentage of the grant that vests at the cliff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliff_percent: Option<u32>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    pub id: GrantId,
    pub stakeholder_id: StakeholderId,
    pub security_id: SecurityId,
    pub company_id: CompanyId,
    pub quantity: u64,
    /// Cents, for options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike_price_cents: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_schedule_id: Option<ScheduleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vest_start: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliff_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vest_end: Option<Date>,
    pub vested_quantity: u64,
    #[serde(default)]
    pub exercised_quantity: u64,
    pub status: GrantStatus,
    pub grant_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Date>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Grant {
    /// The date linear vesting is measured from.
    #[must_use]
    pub fn vest_start_or_grant_date(&self) -> Date {
        self.vest_start.unwrap_or(self.grant_date)
    }

    /// Shares vested but not yet exercised.
    #[must_use]
    pub fn exercisable_quantity(&self) -> u64 {
        self.vested_quantity.saturating_sub(self.exercised_quantity)
    }
}
