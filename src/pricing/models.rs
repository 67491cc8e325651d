use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Renovation categories with a fixed value uplift
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenovationCategory {
    Kitchen,
    Bathroom,
    Windows,
    Heating,
    Roof,
    Facade,
}

impl RenovationCategory {
    /// All categories, in form order
    pub const ALL: [RenovationCategory; 6] = [
        Self::Kitchen,
        Self::Bathroom,
        Self::Windows,
        Self::Heating,
        Self::Roof,
        Self::Facade,
    ];

    /// Value uplift granted by a recent renovation of this category
    pub fn bonus(self) -> f64 {
        match self {
            Self::Kitchen => 0.05,
            Self::Bathroom => 0.10,
            Self::Windows => 0.05,
            Self::Heating => 0.05,
            Self::Roof => 0.05,
            Self::Facade => 0.05,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Bathroom => "bathroom",
            Self::Windows => "windows",
            Self::Heating => "heating",
            Self::Roof => "roof",
            Self::Facade => "facade",
        }
    }

    /// Parse a category name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for RenovationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum LaundryType {
    #[default]
    None,
    InUnit,
    Shared,
    Own,
}

impl LaundryType {
    pub fn bonus(self) -> f64 {
        match self {
            Self::InUnit => 0.05,
            Self::Own => 0.03,
            Self::Shared | Self::None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum ParkingType {
    #[default]
    None,
    Garage,
    Outdoor,
}

impl ParkingType {
    pub fn bonus(self) -> f64 {
        match self {
            Self::Garage => 0.05,
            Self::Outdoor => 0.02,
            Self::None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum CellarType {
    #[default]
    None,
    Shared,
    Own,
}

impl CellarType {
    pub fn bonus(self) -> f64 {
        match self {
            Self::Own => 0.03,
            Self::Shared => 0.01,
            Self::None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum AtticType {
    #[default]
    None,
    Present,
}

impl AtticType {
    pub fn bonus(self) -> f64 {
        match self {
            Self::Present => 0.02,
            Self::None => 0.0,
        }
    }
}

/// Renovation state of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenovationRecord {
    pub category: RenovationCategory,
    pub performed: bool,
    #[serde(default)]
    pub year: Option<i32>,
}

impl RenovationRecord {
    /// A renovation carried out in `year`
    pub fn performed_in(category: RenovationCategory, year: i32) -> Self {
        Self {
            category,
            performed: true,
            year: Some(year),
        }
    }

    /// Year of the renovation, if it was performed and dated
    pub fn effective_year(&self) -> Option<i32> {
        if self.performed {
            self.year
        } else {
            None
        }
    }
}

/// Property description submitted for valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub district: String,
    pub rooms: f64,
    pub area: f64,
    pub construction_year: i32,
    #[serde(default)]
    pub has_fiber_optic: bool,
    #[serde(default)]
    pub owner_count: u32,
    #[serde(default)]
    pub renovation_fund_balance: f64,
    #[serde(default)]
    pub laundry_type: LaundryType,
    #[serde(default)]
    pub parking_type: ParkingType,
    #[serde(default)]
    pub cellar_type: CellarType,
    #[serde(default)]
    pub attic_type: AtticType,
    #[serde(default)]
    pub renovations: Vec<RenovationRecord>,
}

impl Default for PropertyInput {
    fn default() -> Self {
        Self {
            district: String::new(),
            rooms: 2.5,
            area: 60.0,
            construction_year: 1980,
            has_fiber_optic: false,
            owner_count: 10,
            renovation_fund_balance: 0.0,
            laundry_type: LaundryType::None,
            parking_type: ParkingType::None,
            cellar_type: CellarType::None,
            attic_type: AtticType::None,
            renovations: Vec::new(),
        }
    }
}

/// Individual bonus/malus terms, as signed fractions of the base price
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentBreakdown {
    /// Positive fraction subtracted for old buildings
    pub age_deduction: f64,
    pub fiber_bonus: f64,
    pub renovation_bonus: f64,
    pub fund_bonus: f64,
    pub amenity_bonus: f64,
    pub rooms_bonus: f64,
}

impl AdjustmentBreakdown {
    /// Net adjustment applied to the base price
    pub fn total(&self) -> f64 {
        -self.age_deduction
            + self.fiber_bonus
            + self.renovation_bonus
            + self.fund_bonus
            + self.amenity_bonus
            + self.rooms_bonus
    }
}

/// Result of a valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub price_per_area: f64,
    pub total_price: f64,
    pub base_price_per_area: f64,
    pub total_adjustment: f64,
    pub adjustments: AdjustmentBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renovation_bonus_table() {
        let total: f64 = RenovationCategory::ALL.iter().map(|c| c.bonus()).sum();
        assert!((total - 0.35).abs() < 1e-12);
        assert_eq!(RenovationCategory::Bathroom.bonus(), 0.10);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(RenovationCategory::parse("Kitchen"), Some(RenovationCategory::Kitchen));
        assert_eq!(RenovationCategory::parse(" roof "), Some(RenovationCategory::Roof));
        assert_eq!(RenovationCategory::parse("garden"), None);
    }

    #[test]
    fn test_amenity_bonuses() {
        assert_eq!(LaundryType::InUnit.bonus(), 0.05);
        assert_eq!(LaundryType::Shared.bonus(), 0.0);
        assert_eq!(ParkingType::Outdoor.bonus(), 0.02);
        assert_eq!(CellarType::Shared.bonus(), 0.01);
        assert_eq!(AtticType::Present.bonus(), 0.02);
    }

    #[test]
    fn test_effective_year_ignores_unperformed() {
        let record = RenovationRecord {
            category: RenovationCategory::Roof,
            performed: false,
            year: Some(2020),
        };
        assert_eq!(record.effective_year(), None);

        let record = RenovationRecord::performed_in(RenovationCategory::Roof, 2020);
        assert_eq!(record.effective_year(), Some(2020));
    }

    #[test]
    fn test_property_input_json() {
        let json = r#"{
            "district": "Basel",
            "rooms": 3.5,
            "area": 80,
            "constructionYear": 2001,
            "laundryType": "inUnit",
            "renovations": [{"category": "kitchen", "performed": true, "year": 2020}]
        }"#;

        let input: PropertyInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.district, "Basel");
        assert_eq!(input.laundry_type, LaundryType::InUnit);
        assert_eq!(input.parking_type, ParkingType::None);
        assert!(!input.has_fiber_optic);
        assert_eq!(input.renovations.len(), 1);
        assert_eq!(input.renovations[0].category, RenovationCategory::Kitchen);
    }

    #[test]
    fn test_breakdown_total() {
        let breakdown = AdjustmentBreakdown {
            age_deduction: 0.20,
            fiber_bonus: 0.05,
            ..Default::default()
        };
        assert!((breakdown.total() - (-0.15)).abs() < 1e-12);
    }
}
