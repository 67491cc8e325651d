pub mod districts;
pub mod estimate;
pub mod health;
pub mod metrics_handler;

use std::sync::Arc;

use crate::pricing::PricingService;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<PricingService>,
}
