use crate::error::AppError;
use std::collections::BTreeMap;

/// Base price per unit area, keyed by district name
///
/// Names are matched exactly and case-sensitively. The table is immutable once
/// built; reloading produces a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictPriceTable {
    prices: BTreeMap<String, f64>,
}

impl DistrictPriceTable {
    /// Build a table from `(name, price)` pairs
    ///
    /// Rejects duplicate names and prices that are not finite and positive.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut prices = BTreeMap::new();

        for (name, price) in entries {
            let name = name.into();
            if name.is_empty() {
                return Err(AppError::DataLoad("district name cannot be empty".to_string()));
            }
            if !price.is_finite() || price <= 0.0 {
                return Err(AppError::DataLoad(format!(
                    "district '{}' has invalid price per area: {}",
                    name, price
                )));
            }
            if prices.contains_key(&name) {
                return Err(AppError::DataLoad(format!("duplicate district: {}", name)));
            }
            prices.insert(name, price);
        }

        Ok(Self { prices })
    }

    /// Base price per unit area for `name`
    pub fn lookup(&self, name: &str) -> Result<f64, AppError> {
        self.prices
            .get(name)
            .copied()
            .ok_or_else(|| AppError::UnknownDistrict(name.to_string()))
    }

    /// District names in ascending order
    pub fn list_names(&self) -> Vec<String> {
        self.prices.keys().cloned().collect()
    }

    /// `(name, price)` pairs in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(name, price)| (name.as_str(), *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
