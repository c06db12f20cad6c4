//! The `{ ok, data | error }` envelope every skill returns.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AtomError, HttpStatusCode};

/// Error half of a skill result.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// HTTP status used when the envelope is returned from a route.
    #[serde(skip, default = "default_status")]
    pub status: u16,
}

fn default_status() -> u16 {
    500
}

impl SkillError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            status: default_status(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

impl From<AtomError> for SkillError {
    fn from(err: AtomError) -> Self {
        SkillError::new(err.code(), err.to_string()).with_status(err.status_code())
    }
}

/// Result envelope of a skill call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SkillError>,
}

impl<T> SkillResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// `ok: true` without data, e.g. an invoice lookup that found nothing.
    pub fn empty() -> Self {
        Self {
            ok: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_error(SkillError::new(code, message))
    }

    pub fn from_error(error: SkillError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }

    /// Code of the error, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }

    /// Turn the envelope into a `Result`, for callers that chain skills.
    pub fn into_result(self) -> Result<Option<T>, SkillError> {
        match self.error {
            Some(error) if !self.ok => Err(error),
            _ => Ok(self.data),
        }
    }
}

impl<T> From<Result<T, SkillError>> for SkillResponse<T> {
    fn from(result: Result<T, SkillError>) -> Self {
        match result {
            Ok(data) => SkillResponse::success(data),
            Err(error) => SkillResponse::from_error(error),
        }
    }
}

impl<T: Serialize> IntoResponse for SkillResponse<T> {
    fn into_response(self) -> Response {
        let status = match &self.error {
            Some(error) if !self.ok => {
                StatusCode::from_u16(error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}
