// SPDX-License-Identifier: Apache-2.0

use nocap_model::{Stakeholder, StakeholderId, Transaction, TransactionType};
use std::collections::BTreeMap;

/// `123456` cents -> `$1,234.56`.
#[must_use]
pub fn cents_to_usd(cents: u64) -> String {
    let dollars = cents / 100;
    let rem = cents % 100;
    let mut whole = dollars.to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    while whole.len() > 3 {
        let split = whole.len() - 3;
        grouped.insert_str(0, &format!(",{}", &whole[split..]));
        whole.truncate(split);
    }
    grouped.insert_str(0, &whole);
    format!("${grouped}.{rem:02}")
}

/// Compact share counts: `1.5M`, `12.3K`, `42`.
#[must_use]
pub fn format_large_number(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

#[must_use]
pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// `0x1234…abcd` display form; short inputs pass through.
#[must_use]
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[must_use]
pub fn short_tx_hash(hash: &str) -> String {
    if hash.len() <= 18 {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..10], &hash[hash.len() - 8..])
}

/// Explicit total, else quantity x price per share, else 0. Cents.
#[must_use]
pub fn transaction_value_cents(tx: &Transaction) -> u64 {
    if let Some(total) = tx.total_value_cents {
        return total;
    }
    tx.price_per_share_cents
        .map_or(0, |price| tx.quantity.saturating_mul(price))
}

fn name_of<'a>(
    id: Option<&StakeholderId>,
    stakeholders: &'a BTreeMap<StakeholderId, Stakeholder>,
) -> Option<&'a str> {
    id.and_then(|id| stakeholders.get(id)).map(|s| s.name.as_str())
}

/// One-line human summary of a transaction for activity feeds.
#[must_use]
pub fn transaction_summary(
    tx: &Transaction,
    stakeholders: &BTreeMap<StakeholderId, Stakeholder>,
) -> String {
    let to = name_of(Some(&tx.to_stakeholder_id), stakeholders).unwrap_or("Unknown");
    let quantity = format_large_number(tx.quantity);
    match tx.kind {
        TransactionType::Issuance => format!("Issued {quantity} shares to {to}"),
        TransactionType::Transfer => {
            let from = name_of(tx.from_stakeholder_id.as_ref(), stakeholders).unwrap_or("Unknown");
            format!("{from} transferred {quantity} shares to {to}")
        }
        TransactionType::Exercise => format!("{to} exercised {quantity} options"),
        TransactionType::Cancellation => format!("Cancelled {quantity} shares from {to}"),
        _ => format!("{} of {quantity} shares", tx.kind.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocap_model::{
        KycStatus, SecurityId, StakeholderType, TransactionId, TransactionStatus,
    };
    use time::macros::datetime;

    fn tx(kind: TransactionType) -> Transaction {
        Transaction {
            id: TransactionId::parse("tx-1").expect("id"),
            kind,
            from_stakeholder_id: Some(StakeholderId::parse("founder-001").expect("id")),
            to_stakeholder_id: StakeholderId::parse("emp-001").expect("id"),
            security_id: SecurityId::parse("common-stock").expect("id"),
            quantity: 1_500_000,
            price_per_share_cents: Some(250),
            total_value_cents: None,
            grant_id: None,
            transaction_date: datetime!(2025-01-01 00:00 UTC),
            tx_hash: None,
            status: TransactionStatus::Completed,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn directory() -> BTreeMap<StakeholderId, Stakeholder> {
        let mut map = BTreeMap::new();
        for (id, name, kind) in [
            ("founder-001", "John Smith", StakeholderType::Founder),
            ("emp-001", "Jane Doe", StakeholderType::Employee),
        ] {
            let sid = StakeholderId::parse(id).expect("id");
            map.insert(
                sid.clone(),
                Stakeholder {
                    id: sid,
                    name: name.to_string(),
                    email: format!("{id}@acme.io"),
                    kind,
                    kyc_status: KycStatus::Verified,
                    address: None,
                    wallet_address: None,
                    tax_id: None,
                    accreditation_status: None,
                    created_at: None,
                    updated_at: None,
                },
            );
        }
        map
    }

    #[test]
    fn currency_formatting_groups_thousands() {
        assert_eq!(cents_to_usd(123_456), "$1,234.56");
        assert_eq!(cents_to_usd(5), "$0.05");
        assert_eq!(cents_to_usd(850_000_000), "$8,500,000.00");
    }

    #[test]
    fn large_numbers_compact() {
        assert_eq!(format_large_number(1_500_000), "1.5M");
        assert_eq!(format_large_number(12_300), "12.3K");
        assert_eq!(format_large_number(42), "42");
    }

    #[test]
    fn addresses_and_hashes_shorten_for_display() {
        assert_eq!(
            short_address("0x00112233445566778899aabbccddeeff00112233"),
            "0x0011...2233"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
        assert_eq!(
            short_tx_hash("0x00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff"),
            "0x00112233...ccddeeff"
        );
    }

    #[test]
    fn percentages_format_with_requested_precision() {
        assert_eq!(format_pct(41.666, 1), "41.7%");
        assert_eq!(format_pct(25.0, 0), "25%");
    }

    #[test]
    fn transaction_value_prefers_explicit_total() {
        let mut t = tx(TransactionType::Transfer);
        assert_eq!(transaction_value_cents(&t), 375_000_000);
        t.total_value_cents = Some(42);
        assert_eq!(transaction_value_cents(&t), 42);
        t.total_value_cents = None;
        t.price_per_share_cents = None;
        assert_eq!(transaction_value_cents(&t), 0);
    }

    #[test]
    fn summaries_name_both_parties() {
        let dir = directory();
        assert_eq!(
            transaction_summary(&tx(TransactionType::Transfer), &dir),
            "John Smith transferred 1.5M shares to Jane Doe"
        );
        assert_eq!(
            transaction_summary(&tx(TransactionType::Exercise), &dir),
            "Jane Doe exercised 1.5M options"
        );
        assert_eq!(
            transaction_summary(&tx(TransactionType::Issuance), &dir),
            "Issued 1.5M shares to Jane Doe"
        );
    }
}
