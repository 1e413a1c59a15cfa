// SPDX-License-Identifier: Apache-2.0

use crate::ids::CompanyId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ComplianceStatus {
    Compliant,
    Warning,
    Violation,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum FilingStatus {
    Complete,
    Pending,
    DueSoon,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplianceChecklistItem {
    pub id: String,
    pub label: String,
    pub status: FilingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Filing {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub due_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filed_date: Option<Date>,
    pub status: FilingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RuleResult {
    Passed,
    Warning,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleLogEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub rule_id: String,
    pub rule_name: String,
    pub result: RuleResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JurisdictionCompliance {
    /// e.g. "US-DE", "CA-ON".
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: ComplianceStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Compliance {
    pub id: String,
    pub company_id: CompanyId,
    /// 0-100.
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipo_readiness: Option<u32>,
    #[serde(default)]
    pub jurisdictions: Vec<JurisdictionCompliance>,
    #[serde(default)]
    pub checklist: Vec<ComplianceChecklistItem>,
    #[serde(default)]
    pub filings: Vec<Filing>,
    #[serde(default)]
    pub rule_log: Vec<RuleLogEntry>,
}

impl Compliance {
    /// The fallback record served when a company has no compliance row yet.
    #[must_use]
    pub fn default_for(company_id: CompanyId) -> Self {
        Self {
            id: format!("{company_id}-compliance"),
            company_id,
            score: 85,
            ipo_readiness: Some(65),
            jurisdictions: Vec::new(),
            checklist: Vec::new(),
            filings: Vec::new(),
            rule_log: Vec::new(),
        }
    }
}
