// SPDX-License-Identifier: Apache-2.0

use nocap_model::{Grant, VestingInterval};
use time::Date;

/// Linear vested amount as of a date.
///
/// Rules, in order: nothing before the cliff; everything at or after the end
/// date; otherwise `floor(quantity * elapsed / total)` measured in days from
/// `start`, clamped to `[0, quantity]`. A grant without an end date is
/// treated as fully vested once past the cliff, and a degenerate window
/// (`end <= start`) vests in full as soon as `as_of >= start`.
#[must_use]
pub fn vested_quantity(
    quantity: u64,
    start: Date,
    cliff: Option<Date>,
    end: Option<Date>,
    as_of: Date,
) -> u64 {
    if let Some(cliff) = cliff {
        if as_of < cliff {
            return 0;
        }
    }
    let Some(end) = end else {
        return if as_of < start { 0 } else { quantity };
    };
    if as_of >= end {
        return quantity;
    }
    if as_of < start {
        return 0;
    }
    let total = i64::from(end.to_julian_day()) - i64::from(start.to_julian_day());
    if total <= 0 {
        return quantity;
    }
    let elapsed = i64::from(as_of.to_julian_day()) - i64::from(start.to_julian_day());
    let vested = (u128::from(quantity) * elapsed as u128) / total as u128;
    (vested as u64).min(quantity)
}

/// [`vested_quantity`] with the grant's own dates.
#[must_use]
pub fn vested_quantity_for_grant(grant: &Grant, as_of: Date) -> u64 {
    vested_quantity(
        grant.quantity,
        grant.vest_start_or_grant_date(),
        grant.cliff_date,
        grant.vest_end,
        as_of,
    )
}

/// Vested share of the grant, in percent.
#[must_use]
pub fn vesting_progress_pct(grant: &Grant, as_of: Date) -> f64 {
    if grant.quantity == 0 {
        return 0.0;
    }
    (vested_quantity_for_grant(grant, as_of) as f64 / grant.quantity as f64) * 100.0
}

/// The next interval boundary after `as_of`, capped at the end date.
///
/// Returns `None` once the grant is fully vested or has no end date.
#[must_use]
pub fn next_vesting_date(as_of: Date, end: Option<Date>, interval: VestingInterval) -> Option<Date> {
    let end = end?;
    if as_of >= end {
        return None;
    }
    let mut next = as_of;
    for _ in 0..interval.months() {
        next = add_one_month(next);
    }
    Some(if next <= end { next } else { end })
}

fn add_one_month(date: Date) -> Date {
    let (mut year, month, day) = (date.year(), date.month(), date.day());
    let mut next_month = month.next();
    if next_month == time::Month::January {
        year += 1;
    }
    let clamped = day.min(next_month.length(year));
    // Construction cannot fail after clamping the day to the month length.
    Date::from_calendar_date(year, next_month, clamped)
        .unwrap_or(date)
}

/// Shares released at the cliff.
#[must_use]
pub fn cliff_shares(quantity: u64, cliff_percent: u32) -> u64 {
    (u128::from(quantity) * u128::from(cliff_percent) / 100) as u64
}

/// Per-month vesting after the cliff, integer floor.
///
/// Returns 0 when no months remain past the cliff.
#[must_use]
pub fn monthly_vesting_amount(
    quantity: u64,
    total_months: u32,
    cliff_percent: u32,
    cliff_months: u32,
) -> u64 {
    let months_after_cliff = total_months.saturating_sub(cliff_months);
    if months_after_cliff == 0 {
        return 0;
    }
    let remaining = quantity.saturating_sub(cliff_shares(quantity, cliff_percent));
    remaining / u64::from(months_after_cliff)
}
