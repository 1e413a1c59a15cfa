use super::support::{
    api_error_response, envelope_response, finish, propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use nocap_api::ApiError;
use nocap_engine::{
    monthly_vesting_amount, next_vesting_date, ownership_pct, recompute_percentages,
    total_treasury_usd_cents, transaction_value_cents, vested_quantity_for_grant,
    vesting_progress_pct,
};
use nocap_model::{
    Activity, CapTable, Company, CompanyId, ComplianceChecklistItem, FilingStatus, Grant,
    Stakeholder, StakeholderId, Transaction, TransactionStatus, TransactionType, Treasury,
    VestingInterval, VestingSchedule,
};
use serde::Serialize;
use std::time::Instant;
use time::{Date, OffsetDateTime};
use tracing::info;

/// Fallback per-share price when no cap table exists to derive one from.
const FALLBACK_SHARE_PRICE_CENTS: u64 = 250;

#[derive(Debug, Serialize)]
struct TreasuryView {
    #[serde(flatten)]
    treasury: Treasury,
    total_usd_cents: u64,
}

#[derive(Debug, Serialize)]
struct FounderDashboard {
    company: Company,
    cap_table: CapTable,
    treasury: TreasuryView,
    checklist: Vec<ComplianceChecklistItem>,
    activity: Vec<Activity>,
}

#[derive(Debug, Serialize)]
struct GrantView {
    #[serde(flatten)]
    grant: Grant,
    vested_as_of: u64,
    progress_pct: f64,
    next_vesting_date: Option<Date>,
}

#[derive(Debug, Serialize)]
struct UpcomingEvent {
    date: Date,
    event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u64>,
}

#[derive(Debug, Serialize)]
struct EmployeeDashboard {
    stakeholder: Stakeholder,
    grants: Vec<GrantView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vesting_schedule: Option<VestingSchedule>,
    exercise_history: Vec<Transaction>,
    upcoming_events: Vec<UpcomingEvent>,
    current_share_price_cents: u64,
}

#[derive(Debug, Serialize)]
struct InvestorHolding {
    company_id: CompanyId,
    company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo: Option<String>,
    security: String,
    shares: u64,
    ownership_pct: f64,
    cost_basis_cents: u64,
    current_value_cents: u64,
}

#[derive(Debug, Serialize)]
struct InvestorSummary {
    total_invested_usd_cents: u64,
    current_value_usd_cents: u64,
    roi_pct: f64,
}

#[derive(Debug, Serialize)]
struct InvestorAlert {
    #[serde(rename = "type")]
    kind: &'static str,
    company_id: CompanyId,
    message: String,
    priority: &'static str,
}

#[derive(Debug, Serialize)]
struct InvestorDashboard {
    investor: Stakeholder,
    summary: InvestorSummary,
    holdings: Vec<InvestorHolding>,
    alerts: Vec<InvestorAlert>,
}

pub(crate) async fn founder_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/dashboards/founder/{id}", "request start");
    let resp = founder_dashboard(&state, &company_id, &request_id).await;
    finish(&state, "/v1/dashboards/founder/{id}", &request_id, started, resp).await
}

async fn founder_dashboard(state: &AppState, raw_id: &str, request_id: &str) -> Response {
    let company_id = match CompanyId::parse(raw_id) {
        Ok(v) => v,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("company_id", raw_id).with_request_id(request_id),
            )
        }
    };
    let company = match state.store.get_company(&company_id).await {
        Ok(c) => c,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let mut cap_table = match state.store.get_cap_table(&company_id).await {
        Ok(t) => t,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let total = cap_table.total_shares;
    recompute_percentages(&mut cap_table.entries, total);
    let treasury = match state.store.get_treasury(&company_id).await {
        Ok(t) => t,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let compliance = match state.store.get_compliance(&company_id).await {
        Ok(c) => c,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let mut activity = match state.store.list_activities(&company_id).await {
        Ok(feed) => feed,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    activity.truncate(10);

    let total_usd_cents = total_treasury_usd_cents(&treasury);
    envelope_response(FounderDashboard {
        company,
        cap_table,
        treasury: TreasuryView {
            treasury,
            total_usd_cents,
        },
        checklist: compliance.checklist,
        activity,
    })
}

pub(crate) async fn employee_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(stakeholder_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/dashboards/employee/{id}", "request start");
    let resp = employee_dashboard(&state, &stakeholder_id, &request_id).await;
    finish(&state, "/v1/dashboards/employee/{id}", &request_id, started, resp).await
}

async fn employee_dashboard(state: &AppState, raw_id: &str, request_id: &str) -> Response {
    let stakeholder_id = match StakeholderId::parse(raw_id) {
        Ok(v) => v,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("stakeholder_id", raw_id).with_request_id(request_id),
            )
        }
    };
    let stakeholder = match state.store.get_stakeholder(&stakeholder_id).await {
        Ok(s) => s,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let grants = match state.store.list_grants_for_stakeholder(&stakeholder_id).await {
        Ok(list) => list,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };

    let today = OffsetDateTime::now_utc().date();

    let mut schedule = None;
    for grant in &grants {
        if let Some(schedule_id) = &grant.vesting_schedule_id {
            if let Ok(found) = state.store.get_schedule(schedule_id).await {
                schedule = Some(found);
                break;
            }
        }
    }
    let interval = schedule
        .as_ref()
        .map_or(VestingInterval::Monthly, |s| s.vesting_interval);

    let mut upcoming_events = Vec::new();
    let mut grant_views = Vec::new();
    for grant in grants {
        let next = next_vesting_date(today, grant.vest_end, interval);
        if grant.status == nocap_model::GrantStatus::Active {
            if let Some(date) = next {
                let quantity = schedule.as_ref().map(|s| {
                    monthly_vesting_amount(
                        grant.quantity,
                        s.duration_months,
                        s.cliff_percent.unwrap_or(0),
                        s.cliff_months,
                    )
                });
                upcoming_events.push(UpcomingEvent {
                    date,
                    event: "vesting".to_string(),
                    quantity,
                });
            }
        }
        grant_views.push(GrantView {
            vested_as_of: vested_quantity_for_grant(&grant, today),
            progress_pct: vesting_progress_pct(&grant, today),
            next_vesting_date: next,
            grant,
        });
    }

    let exercise_history: Vec<Transaction> = match state
        .store
        .list_transactions_for_stakeholder(&stakeholder_id)
        .await
    {
        Ok(list) => list
            .into_iter()
            .filter(|t| t.kind == TransactionType::Exercise)
            .collect(),
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };

    let mut current_share_price_cents = FALLBACK_SHARE_PRICE_CENTS;
    if let Some(view) = grant_views.first() {
        if let Ok(company) = state.store.get_company(&view.grant.company_id).await {
            if let Ok(table) = state.store.get_cap_table(&company.id).await {
                if table.total_shares > 0 {
                    current_share_price_cents =
                        company.valuation_usd_cents / table.total_shares;
                }
            }
        }
    }

    envelope_response(EmployeeDashboard {
        stakeholder,
        grants: grant_views,
        vesting_schedule: schedule,
        exercise_history,
        upcoming_events,
        current_share_price_cents: current_share_price_cents.max(1),
    })
}

pub(crate) async fn investor_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(stakeholder_id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/dashboards/investor/{id}", "request start");
    let resp = investor_dashboard(&state, &stakeholder_id, &request_id).await;
    finish(&state, "/v1/dashboards/investor/{id}", &request_id, started, resp).await
}

async fn investor_dashboard(state: &AppState, raw_id: &str, request_id: &str) -> Response {
    let stakeholder_id = match StakeholderId::parse(raw_id) {
        Ok(v) => v,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("stakeholder_id", raw_id).with_request_id(request_id),
            )
        }
    };
    let investor = match state.store.get_stakeholder(&stakeholder_id).await {
        Ok(s) => s,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let tables = match state.store.list_cap_tables().await {
        Ok(t) => t,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let purchases: Vec<Transaction> = match state
        .store
        .list_transactions_for_stakeholder(&stakeholder_id)
        .await
    {
        Ok(list) => list
            .into_iter()
            .filter(|t| {
                t.status == TransactionStatus::Completed
                    && t.to_stakeholder_id == stakeholder_id
                    && matches!(
                        t.kind,
                        TransactionType::Issuance | TransactionType::Transfer
                    )
            })
            .collect(),
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };

    let mut holdings = Vec::new();
    let mut alerts = Vec::new();
    for table in tables {
        let held: Vec<_> = table.entries_for(&stakeholder_id);
        if held.is_empty() {
            continue;
        }
        let company = match state.store.get_company(&table.company_id).await {
            Ok(c) => c,
            Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
        };
        for entry in held {
            let pct = ownership_pct(entry.shares, table.total_shares);
            let cost_basis_cents: u64 = purchases
                .iter()
                .filter(|t| t.security_id == entry.security_id)
                .map(transaction_value_cents)
                .sum();
            let security = match state.store.get_security(&entry.security_id).await {
                Ok(s) => s.name,
                Err(_) => entry.security_id.to_string(),
            };
            holdings.push(InvestorHolding {
                company_id: company.id.clone(),
                company_name: company.name.clone(),
                logo: company.logo.clone(),
                security,
                shares: entry.shares,
                ownership_pct: pct,
                cost_basis_cents,
                current_value_cents: ((pct / 100.0) * company.valuation_usd_cents as f64) as u64,
            });
        }

        if let Ok(compliance) = state.store.get_compliance(&table.company_id).await {
            for item in compliance
                .checklist
                .iter()
                .filter(|i| matches!(i.status, FilingStatus::DueSoon | FilingStatus::Overdue))
            {
                let (status_label, priority) = if item.status == FilingStatus::Overdue {
                    ("overdue", "high")
                } else {
                    ("due soon", "medium")
                };
                alerts.push(InvestorAlert {
                    kind: "compliance",
                    company_id: table.company_id.clone(),
                    message: format!("{} is {status_label}", item.label),
                    priority,
                });
            }
        }
    }

    let total_invested: u64 = holdings.iter().map(|h| h.cost_basis_cents).sum();
    let current_value: u64 = holdings.iter().map(|h| h.current_value_cents).sum();
    let roi_pct = if total_invested == 0 {
        0.0
    } else {
        ((current_value as f64 - total_invested as f64) / total_invested as f64) * 100.0
    };

    envelope_response(InvestorDashboard {
        investor,
        summary: InvestorSummary {
            total_invested_usd_cents: total_invested,
            current_value_usd_cents: current_value,
            roi_pct,
        },
        holdings,
        alerts,
    })
}
