// SPDX-License-Identifier: Apache-2.0

//! Inbound request payloads: create drafts (records without ids) and the
//! action bodies for exercises, previews, and auth.

use nocap_model::{
    AccreditationStatus, Activity, ActivityId, ActivityType, Address, CompanyId, Grant, GrantId,
    GrantStatus, KycStatus, ScheduleId, Security, SecurityId, SecurityType, Stakeholder,
    StakeholderId, StakeholderType, Transaction, TransactionId, TransactionStatus,
    TransactionType, UserRole, VestingInterval, VestingSchedule, Wallet,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StakeholderDraft {
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: StakeholderType,
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub accreditation_status: Option<AccreditationStatus>,
}

impl StakeholderDraft {
    #[must_use]
    pub fn into_record(self, id: StakeholderId, now: OffsetDateTime) -> Stakeholder {
        Stakeholder {
            id,
            name: self.name,
            email: self.email,
            kind: self.kind,
            kyc_status: self.kyc_status,
            address: self.address,
            wallet_address: self.wallet_address,
            tax_id: self.tax_id,
            accreditation_status: self.accreditation_status,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityDraft {
    #[serde(rename = "type")]
    pub kind: SecurityType,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub share_class: Option<String>,
    #[serde(default)]
    pub par_value_cents: Option<u64>,
    #[serde(default)]
    pub voting_rights: Option<u32>,
    #[serde(default)]
    pub liquidation_preference: Option<f64>,
    #[serde(default)]
    pub conversion_ratio: Option<f64>,
    #[serde(default)]
    pub price_per_share_cents: Option<u64>,
}

impl SecurityDraft {
    #[must_use]
    pub fn into_record(self, id: SecurityId, now: OffsetDateTime) -> Security {
        Security {
            id,
            kind: self.kind,
            name: self.name,
            symbol: self.symbol,
            description: self.description,
            share_class: self.share_class,
            par_value_cents: self.par_value_cents,
            voting_rights: self.voting_rights,
            liquidation_preference: self.liquidation_preference,
            conversion_ratio: self.conversion_ratio,
            price_per_share_cents: self.price_per_share_cents,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantDraft {
    pub stakeholder_id: StakeholderId,
    pub security_id: SecurityId,
    pub company_id: CompanyId,
    pub quantity: u64,
    #[serde(default)]
    pub strike_price_cents: Option<u64>,
    #[serde(default)]
    pub vesting_schedule_id: Option<ScheduleId>,
    #[serde(default)]
    pub vest_start: Option<Date>,
    #[serde(default)]
    pub cliff_date: Option<Date>,
    #[serde(default)]
    pub vest_end: Option<Date>,
    #[serde(default)]
    pub vested_quantity: u64,
    #[serde(default = "default_grant_status")]
    pub status: GrantStatus,
    pub grant_date: Date,
    #[serde(default)]
    pub expiration_date: Option<Date>,
}

fn default_grant_status() -> GrantStatus {
    GrantStatus::Active
}

impl GrantDraft {
    #[must_use]
    pub fn into_record(self, id: GrantId, now: OffsetDateTime) -> Grant {
        Grant {
            id,
            stakeholder_id: self.stakeholder_id,
            security_id: self.security_id,
            company_id: self.company_id,
            quantity: self.quantity,
            strike_price_cents: self.strike_price_cents,
            vesting_schedule_id: self.vesting_schedule_id,
            vest_start: self.vest_start,
            cliff_date: self.cliff_date,
            vest_end: self.vest_end,
            vested_quantity: self.vested_quantity,
            exercised_quantity: 0,
            status: self.status,
            grant_date: self.grant_date,
            expiration_date: self.expiration_date,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cliff_months: u32,
    pub duration_months: u32,
    pub vesting_interval: VestingInterval,
    #[serde(default)]
    pub cliff_percent: Option<u32>,
}

impl ScheduleDraft {
    #[must_use]
    pub fn into_record(self, id: ScheduleId, now: OffsetDateTime) -> VestingSchedule {
        VestingSchedule {
            id,
            name: self.name,
            description: self.description,
            cliff_months: self.cliff_months,
            duration_months: self.duration_months,
            vesting_interval: self.vesting_interval,
            cliff_percent: self.cliff_percent,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub from_stakeholder_id: Option<StakeholderId>,
    pub to_stakeholder_id: StakeholderId,
    pub security_id: SecurityId,
    pub quantity: u64,
    #[serde(default)]
    pub price_per_share_cents: Option<u64>,
    #[serde(default)]
    pub total_value_cents: Option<u64>,
    #[serde(default)]
    pub grant_id: Option<GrantId>,
    #[serde(with = "time::serde::rfc3339")]
    pub transaction_date: OffsetDateTime,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransactionDraft {
    /// Created transactions are stamped completed, as in the demo backend.
    #[must_use]
    pub fn into_record(self, id: TransactionId, now: OffsetDateTime) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            from_stakeholder_id: self.from_stakeholder_id,
            to_stakeholder_id: self.to_stakeholder_id,
            security_id: self.security_id,
            quantity: self.quantity,
            price_per_share_cents: self.price_per_share_cents,
            total_value_cents: self.total_value_cents,
            grant_id: self.grant_id,
            transaction_date: self.transaction_date,
            tx_hash: self.tx_hash,
            status: TransactionStatus::Completed,
            notes: self.notes,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityDraft {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub company_id: CompanyId,
    #[serde(default)]
    pub actor_id: Option<StakeholderId>,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

impl ActivityDraft {
    #[must_use]
    pub fn into_record(self, id: ActivityId, now: OffsetDateTime) -> Activity {
        Activity {
            id,
            kind: self.kind,
            company_id: self.company_id,
            actor_id: self.actor_id,
            message: self.message,
            details: self.details,
            tx_hash: self.tx_hash,
            timestamp: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExerciseRequest {
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferPreviewRequest {
    pub from_stakeholder_id: StakeholderId,
    pub to_stakeholder_id: StakeholderId,
    pub security_id: SecurityId,
    pub quantity: u64,
    #[serde(default)]
    pub price_per_share_cents: Option<u64>,
    #[serde(default)]
    pub transfer_date: Option<Date>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectWalletRequest {
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub role: UserRole,
    #[serde(default)]
    pub wallet: Option<Wallet>,
}
