#![forbid(unsafe_code)]
//! Pure transformation and policy functions.
//!
//! Nothing in this crate reads the wall clock; every time-dependent function
//! takes an explicit `as_of` so results stay reproducible under test.

mod captable;
mod compliance;
mod format;
mod rules;
mod treasury;
mod vesting;

pub use captable::{
    aggregate_by_type, group_entries_by_type, ownership_pct, recompute_percentages,
    OwnershipSlice,
};
pub use compliance::compliance_score;
pub use format::{
    cents_to_usd, format_large_number, format_pct, short_address, short_tx_hash,
};
pub use rules::{evaluate_transfer, RuleCheckOutcome, RuleCheckRequest, RuleFlow, Verdict};
pub use treasury::total_treasury_usd_cents;
pub use vesting::{
    cliff_shares, monthly_vesting_amount, next_vesting_date, vested_quantity,
    vested_quantity_for_grant, vesting_progress_pct,
};

pub use format::{transaction_summary, transaction_value_cents};

pub const CRATE_NAME: &str = "nocap-engine";
