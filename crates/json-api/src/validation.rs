//! Field-level validation error payloads.

use std::collections::BTreeMap;

use salvo::{http::StatusCode, oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

/// Body rendered alongside a 400 when request fields fail validation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidationErrorResponse {
    /// Human-readable description of the failure.
    pub message: String,

    /// HTTP status code, repeated in the body.
    pub code: u16,

    /// Per-field validation messages.
    pub data: ValidationErrorData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ValidationErrorData {
    #[serde(rename = "validationErrors")]
    pub validation_errors: BTreeMap<String, String>,
}

impl ValidationErrorResponse {
    pub(crate) fn new(message: &str, field: &str, error: &str) -> Self {
        let mut validation_errors = BTreeMap::new();

        validation_errors.insert(field.to_string(), error.to_string());

        Self {
            message: message.to_string(),
            code: StatusCode::BAD_REQUEST.as_u16(),
            data: ValidationErrorData { validation_errors },
        }
    }

    /// Render this payload as a 400 response.
    pub(crate) fn render(self, res: &mut Response) {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(self));
    }
}
