// SPDX-License-Identifier: Apache-2.0

use nocap_model::Treasury;

/// Cash plus the USD value of every stablecoin balance, in cents.
///
/// Balances without a quoted USD value contribute nothing.
#[must_use]
pub fn total_treasury_usd_cents(treasury: &Treasury) -> u64 {
    let stablecoin_value: u64 = treasury
        .stablecoins
        .iter()
        .filter_map(|coin| coin.usd_value_cents)
        .sum();
    treasury.usd_cents.saturating_add(stablecoin_value)
}
