// SPDX-License-Identifier: Apache-2.0

//! Demo fixture set: one company, its people, paper, and money.

use crate::store::EquityStore;
use nocap_model::{
    Activity, ActivityId, ActivityType, CapTable, CapTableEntry, CapTableId, Company, CompanyId,
    Compliance, ComplianceChecklistItem, FilingStatus, Grant, GrantId, GrantStatus, KycStatus,
    ScheduleId, Security, SecurityId, SecurityType, StablecoinBalance, Stakeholder, StakeholderId,
    StakeholderType, Transaction, TransactionId, TransactionStatus, TransactionType, Treasury,
    VestingInterval, VestingSchedule,
};
use serde_json::json;
use time::macros::{date, datetime};

fn company_id() -> CompanyId {
    CompanyId::parse("acme-inc").expect("seed company id")
}

fn stakeholder(id: &str, name: &str, email: &str, kind: StakeholderType) -> Stakeholder {
    Stakeholder {
        id: StakeholderId::parse(id).expect("seed stakeholder id"),
        name: name.to_string(),
        email: email.to_string(),
        kind,
        kyc_status: KycStatus::Verified,
        address: None,
        wallet_address: None,
        tax_id: None,
        accreditation_status: None,
        created_at: None,
        updated_at: None,
    }
}

fn entry(owner: &str, security: &str, shares: u64, percentage: f64) -> CapTableEntry {
    CapTableEntry {
        stakeholder_id: StakeholderId::parse(owner).expect("seed owner id"),
        security_id: SecurityId::parse(security).expect("seed security id"),
        shares,
        percentage,
        diluted: None,
    }
}

fn checklist_item(id: &str, label: &str, status: FilingStatus) -> ComplianceChecklistItem {
    ComplianceChecklistItem {
        id: id.to_string(),
        label: label.to_string(),
        status,
        due_date: None,
        completed_date: None,
        notes: None,
        assigned_to: None,
    }
}

/// Load the demo dataset into an empty store.
pub async fn seed_demo(store: &EquityStore) {
    let acme = company_id();

    store
        .insert_company(Company {
            id: acme.clone(),
            name: "Acme Robotics".to_string(),
            valuation_usd_cents: 850_000_000,
            valuation_display: Some("$8.5M".to_string()),
            logo: Some("/img/acme.svg".to_string()),
            stage: Some("Series A".to_string()),
            sector: Some("Robotics".to_string()),
            founded_date: Some(date!(2020 - 01 - 01)),
            address: None,
            jurisdiction: Some("US-DE".to_string()),
            created_at: None,
            updated_at: None,
        })
        .await;

    for person in [
        stakeholder("founder-001", "John Smith", "john@acme.io", StakeholderType::Founder),
        stakeholder("emp-001", "Jane Doe", "jane@acme.io", StakeholderType::Employee),
        stakeholder(
            "inv-001",
            "Nova Capital",
            "deals@novacapital.io",
            StakeholderType::Investor,
        ),
    ] {
        store
            .stakeholders
            .lock()
            .await
            .insert(person.id.clone(), person);
    }

    for security in [
        Security {
            id: SecurityId::parse("common-stock").expect("seed security id"),
            kind: SecurityType::Common,
            name: "Common Stock".to_string(),
            symbol: Some("COMMON".to_string()),
            description: None,
            share_class: None,
            par_value_cents: Some(1),
            voting_rights: Some(1),
            liquidation_preference: None,
            conversion_ratio: None,
            price_per_share_cents: Some(250),
            created_at: None,
            updated_at: None,
        },
        Security {
            id: SecurityId::parse("series-a-preferred").expect("seed security id"),
            kind: SecurityType::Preferred,
            name: "Series A Preferred Stock".to_string(),
            symbol: Some("SERIESA".to_string()),
            description: None,
            share_class: Some("A".to_string()),
            par_value_cents: Some(1),
            voting_rights: Some(1),
            liquidation_preference: Some(1.0),
            conversion_ratio: Some(1.0),
            price_per_share_cents: Some(600),
            created_at: None,
            updated_at: None,
        },
    ] {
        store
            .securities
            .lock()
            .await
            .insert(security.id.clone(), security);
    }

    store
        .schedules
        .lock()
        .await
        .insert(
            ScheduleId::parse("standard-4yr").expect("seed schedule id"),
            VestingSchedule {
                id: ScheduleId::parse("standard-4yr").expect("seed schedule id"),
                name: "Standard 4-Year Vesting".to_string(),
                description: Some("4-year vesting with 1-year cliff".to_string()),
                cliff_months: 12,
                duration_months: 48,
                vesting_interval: VestingInterval::Monthly,
                cliff_percent: Some(25),
                created_at: None,
                updated_at: None,
            },
        );

    store
        .grants
        .lock()
        .await
        .insert(
            GrantId::parse("grant-001").expect("seed grant id"),
            Grant {
                id: GrantId::parse("grant-001").expect("seed grant id"),
                stakeholder_id: StakeholderId::parse("emp-001").expect("seed stakeholder id"),
                security_id: SecurityId::parse("common-stock").expect("seed security id"),
                company_id: acme.clone(),
                quantity: 10_000,
                strike_price_cents: Some(25),
                vesting_schedule_id: Some(
                    ScheduleId::parse("standard-4yr").expect("seed schedule id"),
                ),
                vest_start: Some(date!(2022 - 01 - 01)),
                cliff_date: Some(date!(2023 - 01 - 01)),
                vest_end: Some(date!(2026 - 01 - 01)),
                vested_quantity: 5_000,
                exercised_quantity: 0,
                status: GrantStatus::Active,
                grant_date: date!(2022 - 01 - 01),
                expiration_date: None,
                created_at: None,
                updated_at: None,
            },
        );

    store
        .cap_tables
        .lock()
        .await
        .insert(
            acme.clone(),
            CapTable {
                id: CapTableId::parse("acme-cap-table").expect("seed cap table id"),
                company_id: acme.clone(),
                as_of_date: datetime!(2025-06-30 00:00 UTC),
                entries: vec![
                    entry("founder-001", "common-stock", 4_500_000, 45.0),
                    entry("emp-001", "common-stock", 1_500_000, 15.0),
                    entry("inv-001", "series-a-preferred", 2_500_000, 25.0),
                ],
                total_shares: 10_000_000,
                fully_diluted_shares: Some(10_500_000),
                option_pool_size: Some(500_000),
                treasury_shares: None,
                created_at: None,
                updated_at: None,
            },
        );

    store
        .insert_treasury(Treasury {
            company_id: acme.clone(),
            usd_cents: 220_000_000,
            stablecoins: vec![
                StablecoinBalance {
                    symbol: "USDC".to_string(),
                    address: None,
                    amount: 125_000_000,
                    decimals: Some(6),
                    usd_value_cents: Some(125_000_000),
                },
                StablecoinBalance {
                    symbol: "DAI".to_string(),
                    address: None,
                    amount: 95_000_000,
                    decimals: Some(18),
                    usd_value_cents: Some(95_000_000),
                },
            ],
            runway_days: Some(270),
            last_updated: datetime!(2025-06-30 00:00 UTC),
        })
        .await;

    store
        .insert_compliance(Compliance {
            id: "acme-inc-compliance".to_string(),
            company_id: acme.clone(),
            score: 85,
            ipo_readiness: Some(65),
            jurisdictions: Vec::new(),
            checklist: vec![
                checklist_item("83b-elections", "83(b) elections filed", FilingStatus::Complete),
                checklist_item("409a-valuation", "409A valuation current", FilingStatus::Complete),
                checklist_item(
                    "annual-report",
                    "Delaware annual report",
                    FilingStatus::DueSoon,
                ),
                checklist_item("board-minutes", "Board minutes up to date", FilingStatus::Pending),
            ],
            filings: Vec::new(),
            rule_log: Vec::new(),
        })
        .await;

    // The Series A purchase gives the investor dashboard a cost basis.
    store
        .transactions
        .lock()
        .await
        .insert(
            TransactionId::parse("tx-seed-001").expect("seed tx id"),
            Transaction {
                id: TransactionId::parse("tx-seed-001").expect("seed tx id"),
                kind: TransactionType::Issuance,
                from_stakeholder_id: None,
                to_stakeholder_id: StakeholderId::parse("inv-001").expect("seed stakeholder id"),
                security_id: SecurityId::parse("series-a-preferred").expect("seed security id"),
                quantity: 2_500_000,
                price_per_share_cents: Some(60),
                total_value_cents: Some(150_000_000),
                grant_id: None,
                transaction_date: datetime!(2024-03-15 00:00 UTC),
                tx_hash: None,
                status: TransactionStatus::Completed,
                notes: Some("Series A closing".to_string()),
                created_at: None,
                updated_at: None,
            },
        );

    for (id, kind, message, at) in [
        (
            "act-0001",
            ActivityType::FundingRound,
            "Series A completed",
            datetime!(2024-03-15 12:00 UTC),
        ),
        (
            "act-0002",
            ActivityType::GrantIssued,
            "Issued 10.0K shares to Jane Doe",
            datetime!(2024-04-01 09:30 UTC),
        ),
        (
            "act-0003",
            ActivityType::ValuationUpdate,
            "Company valuation updated to $8,500,000.00",
            datetime!(2025-01-10 16:45 UTC),
        ),
    ] {
        store
            .activities
            .lock()
            .await
            .push(Activity {
                id: ActivityId::parse(id).expect("seed activity id"),
                kind,
                company_id: acme.clone(),
                actor_id: None,
                message: message.to_string(),
                details: Some(json!({"seeded": true})),
                tx_hash: None,
                timestamp: at,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_populates_every_surface() {
        let store = EquityStore::default();
        seed_demo(&store).await;

        let acme = company_id();
        assert_eq!(store.list_companies().await.expect("companies").len(), 1);
        assert_eq!(
            store.list_stakeholders().await.expect("stakeholders").len(),
            3
        );
        assert_eq!(store.list_securities().await.expect("securities").len(), 2);
        assert_eq!(store.list_grants().await.expect("grants").len(), 1);
        assert_eq!(store.list_schedules().await.expect("schedules").len(), 1);
        let table = store.get_cap_table(&acme).await.expect("cap table");
        assert_eq!(table.total_shares, 10_000_000);
        assert_eq!(table.entry_share_sum(), 8_500_000);
        let treasury = store.get_treasury(&acme).await.expect("treasury");
        assert_eq!(treasury.stablecoins.len(), 2);
        let compliance = store.get_compliance(&acme).await.expect("compliance");
        assert_eq!(compliance.checklist.len(), 4);
        let feed = store.list_activities(&acme).await.expect("activities");
        assert_eq!(feed.len(), 3);
        // Newest first.
        assert_eq!(feed[0].id.as_str(), "act-0003");
    }

    #[tokio::test]
    async fn seeded_grant_honors_vested_bound() {
        let store = EquityStore::default();
        seed_demo(&store).await;
        let grant = store
            .get_grant(&GrantId::parse("grant-001").expect("id"))
            .await
            .expect("grant");
        assert!(grant.vested_quantity <= grant.quantity);
    }
}
