pub mod calculator;
pub mod districts;
pub mod loader;
pub mod models;
pub mod service;

pub use calculator::estimate;
pub use districts::DistrictPriceTable;
pub use loader::{load_from_path, load_from_reader};
pub use models::{
    AdjustmentBreakdown, AtticType, CellarType, LaundryType, ParkingType, PriceEstimate,
    PropertyInput, RenovationCategory, RenovationRecord,
};
pub use service::PricingService;
