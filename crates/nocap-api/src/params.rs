// SPDX-License-Identifier: Apache-2.0

use crate::ApiError;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: usize,
    pub page_size: usize,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub search: Option<String>,
    pub stakeholder_id: Option<String>,
    pub company_id: Option<String>,
}

pub fn parse_list_params(query: &BTreeMap<String, String>) -> Result<ListParams, ApiError> {
    parse_list_params_with_limit(query, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
}

pub fn parse_list_params_with_limit(
    query: &BTreeMap<String, String>,
    default_page_size: usize,
    max_page_size: usize,
) -> Result<ListParams, ApiError> {
    let page = match query.get("page") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(value) if value >= 1 => value,
            _ => return Err(ApiError::invalid_param("page", raw)),
        },
        None => 1,
    };

    let page_size = match query.get("page_size") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(value) if (1..=max_page_size).contains(&value) => value,
            _ => return Err(ApiError::invalid_param("page_size", raw)),
        },
        None => default_page_size,
    };

    let sort_order = match query.get("sort_order").map(String::as_str) {
        None | Some("asc") => SortOrder::Asc,
        Some("desc") => SortOrder::Desc,
        Some(other) => return Err(ApiError::invalid_param("sort_order", other)),
    };

    Ok(ListParams {
        page,
        page_size,
        sort_by: query.get("sort_by").cloned(),
        sort_order,
        status: query.get("status").cloned(),
        kind: query.get("type").cloned(),
        search: query.get("search").cloned(),
        stakeholder_id: query.get("stakeholder_id").cloned(),
        company_id: query.get("company_id").cloned(),
    })
}

impl ListParams {
    /// The half-open index range `[start, end)` this page covers.
    #[must_use]
    pub fn page_bounds(&self, total: usize) -> (usize, usize) {
        let start = (self.page - 1).saturating_mul(self.page_size).min(total);
        let end = start.saturating_add(self.page_size).min(total);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiErrorCode;

    fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let params = parse_list_params(&query(&[])).expect("parse");
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(params.sort_order, SortOrder::Asc);
    }

    #[test]
    fn explicit_values_parse() {
        let params = parse_list_params(&query(&[
            ("page", "3"),
            ("page_size", "10"),
            ("sort_order", "desc"),
            ("type", "employee"),
            ("stakeholder_id", "emp-001"),
        ]))
        .expect("parse");
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.sort_order, SortOrder::Desc);
        assert_eq!(params.kind.as_deref(), Some("employee"));
        assert_eq!(params.stakeholder_id.as_deref(), Some("emp-001"));
    }

    #[test]
    fn zero_page_and_oversized_page_size_are_rejected() {
        let err = parse_list_params(&query(&[("page", "0")])).expect_err("page");
        assert_eq!(err.code, ApiErrorCode::InvalidQueryParameter);
        let err = parse_list_params(&query(&[("page_size", "5000")])).expect_err("page_size");
        assert_eq!(err.code, ApiErrorCode::InvalidQueryParameter);
    }

    #[test]
    fn unknown_sort_order_is_rejected() {
        let err = parse_list_params(&query(&[("sort_order", "sideways")])).expect_err("order");
        assert_eq!(err.code, ApiErrorCode::InvalidQueryParameter);
    }

    #[test]
    fn page_bounds_clamp_to_collection_size() {
        let params = parse_list_params(&query(&[("page", "2"), ("page_size", "10")]))
            .expect("parse");
        assert_eq!(params.page_bounds(25), (10, 20));
        assert_eq!(params.page_bounds(5), (5, 5));
    }
}
