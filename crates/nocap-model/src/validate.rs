// SPDX-License-Identifier: Apache-2.0

//! Field-level validators for inbound records.
//!
//! Validators run against raw JSON before deserialization so that a record
//! with several malformed fields reports every one of them, including values
//! that would not survive enum decoding. They collect errors; they never
//! throw and never stop at the first failure.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

const STAKEHOLDER_TYPES: [&str; 5] = ["founder", "employee", "investor", "advisor", "other"];
const KYC_STATUSES: [&str; 3] = ["verified", "pending", "rejected"];
const GRANT_STATUSES: [&str; 4] = ["active", "cancelled", "expired", "exercised"];
const TRANSACTION_TYPES: [&str; 6] = [
    "issuance",
    "transfer",
    "exercise",
    "cancellation",
    "conversion",
    "redemption",
];
const TRANSACTION_STATUSES: [&str; 3] = ["pending", "completed", "failed"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    #[must_use]
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"))
}

fn wallet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("wallet regex"))
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

#[must_use]
pub fn is_valid_wallet_address(address: &str) -> bool {
    wallet_regex().is_match(address)
}

fn non_empty_string(data: &Value, field: &str, errors: &mut Vec<FieldError>) {
    match data.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => {}
        _ => errors.push(FieldError::new(
            field,
            format!("{field} must be a non-empty string"),
        )),
    }
}

fn string_in(data: &Value, field: &str, allowed: &[&str], errors: &mut Vec<FieldError>) {
    match data.get(field).and_then(Value::as_str) {
        Some(s) if allowed.contains(&s) => {}
        _ => errors.push(FieldError::new(
            field,
            format!("{field} must be one of {allowed:?}"),
        )),
    }
}

fn date_field(data: &Value, field: &str, errors: &mut Vec<FieldError>) {
    let date_only = time::macros::format_description!("[year]-[month]-[day]");
    let ok = data.get(field).and_then(Value::as_str).is_some_and(|s| {
        Date::parse(s, &date_only).is_ok() || OffsetDateTime::parse(s, &Rfc3339).is_ok()
    });
    if !ok {
        errors.push(FieldError::new(
            field,
            format!("{field} must be a valid ISO date"),
        ));
    }
}

pub fn validate_company(data: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    non_empty_string(data, "name", &mut errors);
    match data.get("valuation_usd_cents") {
        Some(v) if v.is_u64() => {}
        _ => errors.push(FieldError::new(
            "valuation_usd_cents",
            "valuation must be a non-negative integer number of cents",
        )),
    }
    for field in ["stage", "sector"] {
        if let Some(v) = data.get(field) {
            if !v.is_null() && !v.is_string() {
                errors.push(FieldError::new(field, format!("{field} must be a string")));
            }
        }
    }
    ValidationReport::from_errors(errors)
}

pub fn validate_stakeholder(data: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    non_empty_string(data, "name", &mut errors);
    match data.get("email").and_then(Value::as_str) {
        Some(email) if is_valid_email(email) => {}
        _ => errors.push(FieldError::new(
            "email",
            "email must be a valid email address",
        )),
    }
    string_in(data, "type", &STAKEHOLDER_TYPES, &mut errors);
    string_in(data, "kyc_status", &KYC_STATUSES, &mut errors);
    if let Some(address) = data.get("wallet_address").and_then(Value::as_str) {
        if !is_valid_wallet_address(address) {
            errors.push(FieldError::new(
                "wallet_address",
                "wallet address must be 0x followed by 40 hex characters",
            ));
        }
    }
    ValidationReport::from_errors(errors)
}

pub fn validate_grant(data: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    for field in ["stakeholder_id", "security_id", "company_id"] {
        non_empty_string(data, field, &mut errors);
    }
    let quantity = data.get("quantity").and_then(Value::as_u64);
    match quantity {
        Some(q) if q > 0 => {}
        _ => errors.push(FieldError::new(
            "quantity",
            "quantity must be a positive integer",
        )),
    }
    let vested = data.get("vested_quantity").and_then(Value::as_u64);
    if vested.is_none() {
        errors.push(FieldError::new(
            "vested_quantity",
            "vested quantity must be a non-negative integer",
        ));
    }
    if let (Some(q), Some(v)) = (quantity, vested) {
        if v > q {
            errors.push(FieldError::new(
                "vested_quantity",
                "vested quantity cannot exceed total quantity",
            ));
        }
    }
    date_field(data, "grant_date", &mut errors);
    string_in(data, "status", &GRANT_STATUSES, &mut errors);
    ValidationReport::from_errors(errors)
}

pub fn validate_transaction(data: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    string_in(data, "type", &TRANSACTION_TYPES, &mut errors);
    non_empty_string(data, "to_stakeholder_id", &mut errors);
    non_empty_string(data, "security_id", &mut errors);
    match data.get("quantity").and_then(Value::as_u64) {
        Some(q) if q > 0 => {}
        _ => errors.push(FieldError::new(
            "quantity",
            "quantity must be a positive integer",
        )),
    }
    date_field(data, "transaction_date", &mut errors);
    string_in(data, "status", &TRANSACTION_STATUSES, &mut errors);
    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stakeholder_validator_reports_one_error_per_malformed_field() {
        let report = validate_stakeholder(&json!({
            "name": "Jane Doe",
            "kyc_status": "approved",
            "type": "employee"
        }));
        assert!(!report.valid);
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "kyc_status"]);
    }

    #[test]
    fn stakeholder_validator_accepts_complete_record() {
        let report = validate_stakeholder(&json!({
            "name": "Jane Doe",
            "email": "jane@acme.io",
            "type": "employee",
            "kyc_status": "verified",
            "wallet_address": "0x00112233445566778899aabbccddeeff00112233"
        }));
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn stakeholder_validator_rejects_malformed_wallet() {
        let report = validate_stakeholder(&json!({
            "name": "Jane Doe",
            "email": "jane@acme.io",
            "type": "employee",
            "kyc_status": "verified",
            "wallet_address": "0xnothex"
        }));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "wallet_address");
    }

    #[test]
    fn grant_validator_enforces_vested_at_most_quantity() {
        let report = validate_grant(&json!({
            "stakeholder_id": "emp-001",
            "security_id": "common-stock",
            "company_id": "acme-inc",
            "quantity": 100,
            "vested_quantity": 250,
            "grant_date": "2022-01-01",
            "status": "active"
        }));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("cannot exceed"));
    }

    #[test]
    fn grant_validator_rejects_zero_quantity() {
        let report = validate_grant(&json!({
            "stakeholder_id": "emp-001",
            "security_id": "common-stock",
            "company_id": "acme-inc",
            "quantity": 0,
            "vested_quantity": 0,
            "grant_date": "2022-01-01",
            "status": "active"
        }));
        assert!(report.errors.iter().any(|e| e.field == "quantity"));
    }

    #[test]
    fn transaction_validator_rejects_unknown_type_and_bad_date() {
        let report = validate_transaction(&json!({
            "type": "gift",
            "to_stakeholder_id": "emp-001",
            "security_id": "common-stock",
            "quantity": 10,
            "transaction_date": "yesterday",
            "status": "completed"
        }));
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["type", "transaction_date"]);
    }

    #[test]
    fn company_validator_checks_valuation_shape() {
        let report = validate_company(&json!({"name": "Acme", "valuation_usd_cents": -5}));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "valuation_usd_cents");
    }

    #[test]
    fn email_and_wallet_helpers() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(is_valid_wallet_address(
            "0xABCDEF0123456789abcdef0123456789abcdef01"
        ));
        assert!(!is_valid_wallet_address("0x1234"));
    }
}
