// SPDX-License-Identifier: Apache-2.0

use nocap_model::{CapTableEntry, Stakeholder, StakeholderId, StakeholderType};
use serde::Serialize;
use std::collections::BTreeMap;

/// One aggregated wedge of the ownership chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OwnershipSlice {
    pub stakeholder_type: StakeholderType,
    pub shares: u64,
    pub percentage: f64,
    pub entry_count: usize,
}

/// Percentage of `total` held by `shares`; zero total yields zero.
#[must_use]
pub fn ownership_pct(shares: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (shares as f64 / total as f64) * 100.0
}

fn type_of(
    stakeholder_id: &StakeholderId,
    by_id: &BTreeMap<&StakeholderId, &Stakeholder>,
) -> StakeholderType {
    by_id
        .get(stakeholder_id)
        .map_or(StakeholderType::Other, |s| s.kind)
}

/// Group raw entries by the owning stakeholder's type.
///
/// Entries whose stakeholder is unknown land in the `other` bucket.
#[must_use]
pub fn group_entries_by_type<'a>(
    entries: &'a [CapTableEntry],
    stakeholders: &'a [Stakeholder],
) -> BTreeMap<StakeholderType, Vec<&'a CapTableEntry>> {
    let by_id: BTreeMap<&StakeholderId, &Stakeholder> =
        stakeholders.iter().map(|s| (&s.id, s)).collect();
    let mut groups: BTreeMap<StakeholderType, Vec<&CapTableEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(type_of(&entry.stakeholder_id, &by_id))
            .or_default()
            .push(entry);
    }
    groups
}

/// Sum shares and percentages per stakeholder type.
#[must_use]
pub fn aggregate_by_type(
    entries: &[CapTableEntry],
    stakeholders: &[Stakeholder],
) -> Vec<OwnershipSlice> {
    group_entries_by_type(entries, stakeholders)
        .into_iter()
        .map(|(stakeholder_type, group)| OwnershipSlice {
            stakeholder_type,
            shares: group.iter().map(|e| e.shares).sum(),
            percentage: group.iter().map(|e| e.percentage).sum(),
            entry_count: group.len(),
        })
        .collect()
}

/// Rewrite entry percentages from the share counts against `total_shares`.
pub fn recompute_percentages(entries: &mut [CapTableEntry], total_shares: u64) {
    for entry in entries.iter_mut() {
        entry.percentage = ownership_pct(entry.shares, total_shares);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocap_model::{KycStatus, SecurityId, StakeholderId};

    fn stakeholder(id: &str, kind: StakeholderType) -> Stakeholder {
        Stakeholder {
            id: StakeholderId::parse(id).expect("id"),
            name: id.to_string(),
            email: format!("{id}@acme.io"),
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

    fn entry(owner: &str, shares: u64, percentage: f64) -> CapTableEntry {
        CapTableEntry {
            stakeholder_id: StakeholderId::parse(owner).expect("id"),
            security_id: SecurityId::parse("common-stock").expect("id"),
            shares,
            percentage,
            diluted: None,
        }
    }

    #[test]
    fn aggregation_preserves_total_share_count() {
        let stakeholders = vec![
            stakeholder("founder-001", StakeholderType::Founder),
            stakeholder("emp-001", StakeholderType::Employee),
            stakeholder("emp-002", StakeholderType::Employee),
        ];
        let entries = vec![
            entry("founder-001", 4_500_000, 45.0),
            entry("emp-001", 1_500_000, 15.0),
            entry("emp-002", 500_000, 5.0),
            entry("ghost", 250_000, 2.5),
        ];
        let slices = aggregate_by_type(&entries, &stakeholders);
        let aggregated: u64 = slices.iter().map(|s| s.shares).sum();
        let raw: u64 = entries.iter().map(|e| e.shares).sum();
        assert_eq!(aggregated, raw);
    }

    #[test]
    fn unknown_stakeholder_lands_in_other() {
        let slices = aggregate_by_type(&[entry("ghost", 100, 1.0)], &[]);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].stakeholder_type, StakeholderType::Other);
        assert_eq!(slices[0].shares, 100);
    }

    #[test]
    fn employee_entries_merge_into_one_slice() {
        let stakeholders = vec![
            stakeholder("emp-001", StakeholderType::Employee),
            stakeholder("emp-002", StakeholderType::Employee),
        ];
        let entries = vec![entry("emp-001", 300, 3.0), entry("emp-002", 700, 7.0)];
        let slices = aggregate_by_type(&entries, &stakeholders);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].shares, 1_000);
        assert!((slices[0].percentage - 10.0).abs() < f64::EPSILON);
        assert_eq!(slices[0].entry_count, 2);
    }

    #[test]
    fn ownership_pct_guards_zero_total() {
        assert_eq!(ownership_pct(100, 0), 0.0);
        assert!((ownership_pct(2_500_000, 10_000_000) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recompute_overwrites_stale_percentages() {
        let mut entries = vec![entry("emp-001", 5_000_000, 99.0)];
        recompute_percentages(&mut entries, 10_000_000);
        assert!((entries[0].percentage - 50.0).abs() < f64::EPSILON);
    }
}
