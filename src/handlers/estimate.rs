use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::AppError;
use crate::handlers::AppState;
use crate::pricing::{PriceEstimate, PropertyInput};

/// Handle POST /v1/estimate
///
/// Body is a `PropertyInput`; the district inside it selects the base price.
pub async fn handle_estimate(
    State(state): State<AppState>,
    payload: Result<Json<PropertyInput>, JsonRejection>,
) -> Result<Json<PriceEstimate>, AppError> {
    let Json(input) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let estimate = state.pricing.estimate(&input)?;
    Ok(Json(estimate))
}
