// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidQueryParameter,
    InvalidBody,
    ValidationFailed,
    NotFound,
    MethodNotAllowed,
    Unauthorized,
    InvalidSession,
    Conflict,
    NotReady,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"parameter": name, "value": value}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_body(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidBody,
            "request body could not be decoded",
            json!({"reason": reason}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn validation_failed(field_errors: Value) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"field_errors": field_errors}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(
            ApiErrorCode::NotFound,
            format!("{entity} {id} not found"),
            json!({"entity": entity, "id": id}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn method_not_allowed(method: &str, resource: &str) -> Self {
        Self::new(
            ApiErrorCode::MethodNotAllowed,
            format!("method {method} not allowed for {resource}"),
            json!({"method": method, "resource": resource}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_session(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidSession,
            "session token rejected",
            json!({"reason": reason}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn internal(message: &str) -> Self {
        Self::new(
            ApiErrorCode::Internal,
            message,
            Value::Object(serde_json::Map::new()),
            "req-unknown",
        )
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_param_details_name_the_parameter() {
        let err = ApiError::invalid_param("page", "zero");
        assert_eq!(err.code, ApiErrorCode::InvalidQueryParameter);
        assert_eq!(err.details["parameter"], "page");
        assert_eq!(err.details["value"], "zero");
    }

    #[test]
    fn request_id_is_attachable_after_construction() {
        let err = ApiError::not_found("grant", "grant-9").with_request_id("req-42");
        assert_eq!(err.request_id, "req-42");
    }
}
