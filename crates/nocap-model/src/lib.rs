#![forbid(unsafe_code)]
//! No Cap model SSOT.
//!
//! Every entity the platform stores or serves is defined here, together with
//! the parse-validated identifier newtypes and the field-level validators.
//! Wire casing is snake_case throughout; enums carry their full vocabulary.

mod activity;
mod auth;
mod captable;
mod company;
mod compliance;
mod grant;
mod ids;
mod security;
mod stakeholder;
mod transaction;
mod treasury;
mod validate;

pub use activity::{Activity, ActivityType};
pub use auth::{AuthSession, UserRole, Wallet};
pub use captable::{CapTable, CapTableEntry};
pub use company::{Address, Company};
pub use compliance::{
    Compliance, ComplianceChecklistItem, ComplianceStatus, Filing, FilingStatus,
    JurisdictionCompliance, RuleLogEntry, RuleResult,
};
pub use grant::{Grant, GrantStatus, VestingInterval, VestingSchedule};
pub use ids::{
    ActivityId, CapTableId, CompanyId, GrantId, ParseError, ScheduleId, SecurityId, StakeholderId,
    TransactionId, ID_MAX_LEN,
};
pub use security::{Security, SecurityType};
pub use stakeholder::{AccreditationStatus, KycStatus, Stakeholder, StakeholderType};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use treasury::{StablecoinBalance, Treasury};
pub use validate::{
    is_valid_email, is_valid_wallet_address, validate_company, validate_grant,
    validate_stakeholder, validate_transaction, FieldError, ValidationReport,
};

pub const CRATE_NAME: &str = "nocap-model";
