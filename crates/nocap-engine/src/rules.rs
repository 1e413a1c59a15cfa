// SPDX-License-Identifier: Apache-2.0

//! Transfer-approval rule pipeline.
//!
//! The checks evaluate real inputs (KYC state of both parties, a positive
//! quantity inside the transfer window) rather than returning constants;
//! a blocked flow carries recommendations naming what to fix.

use nocap_model::Stakeholder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleCheckRequest {
    pub from: String,
    pub to: String,
    pub security: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleCheckOutcome {
    pub rule: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Verdict {
    Allowed,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFlow {
    pub flow: Vec<RuleCheckOutcome>,
    #[serde(rename = "final")]
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

fn kyc_check(rule: &str, party: Option<&Stakeholder>) -> RuleCheckOutcome {
    match party {
        Some(s) if s.kyc_status.is_verified() => RuleCheckOutcome {
            rule: rule.to_string(),
            passed: true,
            message: None,
        },
        Some(s) => RuleCheckOutcome {
            rule: rule.to_string(),
            passed: false,
            message: Some(format!("{} has not completed KYC", s.name)),
        },
        None => RuleCheckOutcome {
            rule: rule.to_string(),
            passed: false,
            message: Some("stakeholder not found".to_string()),
        },
    }
}

/// Run the three-check pipeline for a proposed transfer.
#[must_use]
pub fn evaluate_transfer(
    request: &RuleCheckRequest,
    sender: Option<&Stakeholder>,
    recipient: Option<&Stakeholder>,
) -> RuleFlow {
    let window = RuleCheckOutcome {
        rule: "Transfer Window".to_string(),
        passed: request.quantity > 0,
        message: (request.quantity == 0).then(|| "quantity must be positive".to_string()),
    };
    let flow = vec![
        kyc_check("Sender KYC", sender),
        kyc_check("Recipient KYC", recipient),
        window,
    ];
    let blocked: Vec<&RuleCheckOutcome> = flow.iter().filter(|c| !c.passed).collect();
    let recommendations = blocked
        .iter()
        .map(|c| match c.message.as_deref() {
            Some(msg) => format!("{}: {msg}", c.rule),
            None => format!("{} failed", c.rule),
        })
        .collect();
    let verdict = if blocked.is_empty() {
        Verdict::Allowed
    } else {
        Verdict::Blocked
    };
    RuleFlow {
        flow,
        verdict,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocap_model::{KycStatus, StakeholderId, StakeholderType};

    fn party(id: &str, kyc: KycStatus) -> Stakeholder {
        Stakeholder {
            id: StakeholderId::parse(id).expect("id"),
            name: id.to_string(),
            email: format!("{id}@acme.io"),
            kind: StakeholderType::Employee,
            kyc_status: kyc,
            address: None,
            wallet_address: None,
            tax_id: None,
            accreditation_status: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn request(quantity: u64) -> RuleCheckRequest {
        RuleCheckRequest {
            from: "emp-001".to_string(),
            to: "founder-001".to_string(),
            security: "common-stock".to_string(),
            quantity,
        }
    }

    #[test]
    fn verified_parties_are_allowed() {
        let sender = party("emp-001", KycStatus::Verified);
        let recipient = party("founder-001", KycStatus::Verified);
        let flow = evaluate_transfer(&request(100), Some(&sender), Some(&recipient));
        assert_eq!(flow.verdict, Verdict::Allowed);
        assert_eq!(flow.flow.len(), 3);
        assert!(flow.flow.iter().all(|c| c.passed));
        assert!(flow.recommendations.is_empty());
    }

    #[test]
    fn pending_recipient_blocks_with_recommendation() {
        let sender = party("emp-001", KycStatus::Verified);
        let recipient = party("founder-001", KycStatus::Pending);
        let flow = evaluate_transfer(&request(100), Some(&sender), Some(&recipient));
        assert_eq!(flow.verdict, Verdict::Blocked);
        assert_eq!(flow.recommendations.len(), 1);
        assert!(flow.recommendations[0].starts_with("Recipient KYC"));
    }

    #[test]
    fn missing_sender_and_zero_quantity_both_reported() {
        let recipient = party("founder-001", KycStatus::Verified);
        let flow = evaluate_transfer(&request(0), None, Some(&recipient));
        assert_eq!(flow.verdict, Verdict::Blocked);
        assert_eq!(flow.recommendations.len(), 2);
    }

    #[test]
    fn rule_flow_serializes_final_keyword() {
        let sender = party("emp-001", KycStatus::Verified);
        let flow = evaluate_transfer(&request(5), Some(&sender), Some(&sender));
        let raw = serde_json::to_value(&flow).expect("serialize");
        assert_eq!(raw["final"], "allowed");
    }
}
