use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pricing::models::RenovationCategory;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// District price table missing, malformed or inconsistent
    #[error("Failed to load district price table: {0}")]
    DataLoad(String),

    /// District not present in the price table
    #[error("District not found: {0}")]
    UnknownDistrict(String),

    /// Living area must be a positive number
    #[error("Invalid area: {0} (must be greater than 0)")]
    InvalidArea(f64),

    /// Construction year outside the accepted range
    #[error("Invalid construction year: {year} (must be between {min} and {max})")]
    InvalidYear { year: i32, min: i32, max: i32 },

    /// Renovation year outside the accepted range
    #[error("Invalid {category} renovation year: {year} (must be between {min} and {max})")]
    InvalidRenovationYear {
        category: RenovationCategory,
        year: i32,
        min: i32,
        max: i32,
    },

    /// Same renovation category listed more than once
    #[error("Renovation category listed more than once: {0}")]
    DuplicateRenovation(RenovationCategory),

    /// Renovation fund balance must be a non-negative number
    #[error("Invalid renovation fund balance: {0} (must be 0 or more)")]
    InvalidFundBalance(f64),

    /// Room count must be a finite number
    #[error("Invalid room count: {0}")]
    InvalidRooms(f64),

    /// Request body could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// True for errors caused by user-supplied property data
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArea(_)
                | Self::InvalidYear { .. }
                | Self::InvalidRenovationYear { .. }
                | Self::DuplicateRenovation(_)
                | Self::InvalidFundBalance(_)
                | Self::InvalidRooms(_)
        )
    }

    /// Stable machine-readable name, used in response bodies and metric labels
    pub fn type_name(&self) -> &'static str {
        error_type_name(self)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::DataLoad(_) | Self::ConfigError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::UnknownDistrict(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::DataLoad(_) => "data_load_error",
        AppError::UnknownDistrict(_) => "unknown_district",
        AppError::InvalidArea(_) => "invalid_area",
        AppError::InvalidYear { .. } => "invalid_year",
        AppError::InvalidRenovationYear { .. } => "invalid_renovation_year",
        AppError::DuplicateRenovation(_) => "duplicate_renovation",
        AppError::InvalidFundBalance(_) => "invalid_fund_balance",
        AppError::InvalidRooms(_) => "invalid_rooms",
        AppError::InvalidRequest(_) => "invalid_request",
        AppError::ConfigError(_) => "config_error",
        AppError::InternalError(_) => "internal_error",
    }
}
