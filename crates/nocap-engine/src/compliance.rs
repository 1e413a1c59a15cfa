// SPDX-License-Identifier: Apache-2.0

use nocap_model::{ComplianceChecklistItem, FilingStatus};

/// Share of completed checklist items, rounded to the nearest percent.
///
/// An empty checklist scores 100.
#[must_use]
pub fn compliance_score(checklist: &[ComplianceChecklistItem]) -> u32 {
    if checklist.is_empty() {
        return 100;
    }
    let completed = checklist
        .iter()
        .filter(|item| item.status == FilingStatus::Complete)
        .count();
    ((completed as f64 / checklist.len() as f64) * 100.0).round() as u32
}
