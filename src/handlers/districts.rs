use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::handlers::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct DistrictsResponse {
    pub districts: Vec<DistrictEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictEntry {
    pub name: String,
    pub price_per_area: f64,
}

/// Handle GET /v1/districts
/// Districts are listed in ascending name order
pub async fn list_districts(State(state): State<AppState>) -> Json<DistrictsResponse> {
    let table = state.pricing.table();
    let districts = table
        .iter()
        .map(|(name, price)| DistrictEntry {
            name: name.to_string(),
            price_per_area: price,
        })
        .collect();

    Json(DistrictsResponse { districts })
}
