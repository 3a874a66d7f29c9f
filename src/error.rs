//! Service-level error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::{DecayError, ExportError};

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Decay(#[from] DecayError),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to render template: {0}")]
    Template(#[from] askama::Error),
}

/// JSON error body returned by the API.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Decay(DecayError::InvalidChemistry(_)) => "invalid_chemistry",
            Self::Decay(DecayError::InvalidDepthOfDischarge(_)) => "invalid_depth_of_discharge",
            Self::Decay(DecayError::InvalidChargeRate(_)) => "invalid_charge_rate",
            Self::Decay(DecayError::DegenerateResult(_)) => "degenerate_result",
            Self::OutOfRange { .. } => "out_of_range",
            Self::Export(_) => "export_error",
            Self::Template(_) => "template_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decay(_) | Self::OutOfRange { .. } => StatusCode::BAD_REQUEST,
            Self::Export(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::OutOfRange { field, min, max, value } => Some(serde_json::json!({
                "field": field,
                "min": min,
                "max": max,
                "value": value,
            })),
            Self::Decay(DecayError::InvalidChemistry(key)) => Some(serde_json::json!({
                "chemistry": key,
                "accepted": ["li-ion", "li-po", "nimh", "pb-acid"],
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Rejected simulation request: {}", self);
        }

        let body = ErrorResponse {
            error_type: self.error_type().to_string(),
            message: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
