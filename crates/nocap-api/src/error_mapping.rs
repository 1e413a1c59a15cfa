// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub schema_ref: &'static str,
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::InvalidQueryParameter
        | ApiErrorCode::InvalidBody
        | ApiErrorCode::ValidationFailed => 400,
        ApiErrorCode::Unauthorized | ApiErrorCode::InvalidSession => 401,
        ApiErrorCode::NotFound => 404,
        ApiErrorCode::MethodNotAllowed => 405,
        ApiErrorCode::Conflict => 409,
        ApiErrorCode::NotReady => 503,
        _ => 500,
    };

    ApiErrorMapping {
        status_code,
        schema_ref: API_ERROR_SCHEMA_REF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_expected_statuses() {
        let cases = [
            (ApiError::invalid_param("page", "x"), 400),
            (ApiError::validation_failed(serde_json::json!([])), 400),
            (ApiError::not_found("company", "ghost"), 404),
            (ApiError::method_not_allowed("DELETE", "companies"), 405),
            (ApiError::invalid_session("signature mismatch"), 401),
            (ApiError::internal("simulated server error"), 500),
        ];
        for (err, expected) in cases {
            assert_eq!(map_error(&err).status_code, expected, "{:?}", err.code);
        }
    }
}
