use crate::error::AppError;
use crate::metrics;
use crate::pricing::calculator;
use crate::pricing::districts::DistrictPriceTable;
use crate::pricing::loader;
use crate::pricing::models::{PriceEstimate, PropertyInput};
use arc_swap::ArcSwap;
use chrono::Datelike;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Estimates prices against a swappable district table
///
/// Readers always see a complete table: reloads build a new one and swap the
/// pointer.
pub struct PricingService {
    table: ArcSwap<DistrictPriceTable>,
    source: Option<PathBuf>,
    current_year: Option<i32>,
}

impl PricingService {
    /// Create a service over an in-memory table (no reload source)
    pub fn new(table: DistrictPriceTable) -> Self {
        metrics::record_district_count(table.len());
        Self {
            table: ArcSwap::from_pointee(table),
            source: None,
            current_year: None,
        }
    }

    /// Load the table from a CSV file, remembering the path for reloads
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let table = loader::load_from_path(path)?;

        let mut service = Self::new(table);
        service.source = Some(path.to_path_buf());
        Ok(service)
    }

    /// Pin the reference year instead of reading the clock
    pub fn with_current_year(mut self, year: Option<i32>) -> Self {
        self.current_year = year;
        self
    }

    /// Reference year for age and renovation computations
    pub fn current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Snapshot of the current table
    pub fn table(&self) -> Arc<DistrictPriceTable> {
        self.table.load_full()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Resolve `input.district` and run the price formula
    pub fn estimate(&self, input: &PropertyInput) -> Result<PriceEstimate, AppError> {
        let start = Instant::now();
        let base_price = self.table.load().lookup(&input.district);

        // Only names present in the table become label values
        let district_label = if base_price.is_ok() {
            input.district.as_str()
        } else {
            metrics::UNKNOWN_DISTRICT_LABEL
        };

        let result = base_price
            .and_then(|base_price| calculator::estimate(input, base_price, self.current_year()));
        metrics::record_duration(start.elapsed());

        match &result {
            Ok(estimate) => {
                debug!(
                    district = %input.district,
                    price_per_area = estimate.price_per_area,
                    total_price = estimate.total_price,
                    "Estimate computed"
                );
                metrics::record_estimate(district_label, "ok");
            }
            Err(e) => {
                debug!(district = %input.district, error_type = e.type_name(), "Estimate rejected: {}", e);
                metrics::record_estimate(district_label, "rejected");
                metrics::record_error(e.type_name());
            }
        }

        result
    }

    /// Swap in a new table
    pub fn replace_table(&self, table: DistrictPriceTable) {
        let count = table.len();
        self.table.store(Arc::new(table));
        metrics::record_district_count(count);
        info!("District price table replaced ({} districts)", count);
    }

    /// Reload the table from its source file
    ///
    /// The current table stays in place if loading fails.
    pub fn reload(&self) -> Result<usize, AppError> {
        let path = self.source.as_deref().ok_or_else(|| {
            AppError::ConfigError("price table has no source file to reload from".to_string())
        })?;

        let table = loader::load_from_path(path)?;
        let count = table.len();
        self.replace_table(table);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn service() -> PricingService {
        let table = DistrictPriceTable::from_entries([("Basel", 8000.0), ("Bern", 7000.0)]).unwrap();
        PricingService::new(table).with_current_year(Some(2024))
    }

    fn input(district: &str) -> PropertyInput {
        PropertyInput {
            district: district.to_string(),
            construction_year: 2010,
            ..Default::default()
        }
    }

    #[test]
    fn test_estimate_resolves_district() {
        let service = service();
        let estimate = service.estimate(&input("Bern")).unwrap();
        assert_eq!(estimate.base_price_per_area, 7000.0);
        assert_eq!(estimate.price_per_area, 7000.0);
    }

    #[test]
    fn test_unknown_district_checked_before_input() {
        let service = service();
        let mut bad = input("basel");
        bad.area = 0.0;
        assert!(matches!(service.estimate(&bad), Err(AppError::UnknownDistrict(_))));
    }

    #[test]
    fn test_current_year_defaults_to_clock() {
        let table = DistrictPriceTable::from_entries([("Basel", 8000.0)]).unwrap();
        let service = PricingService::new(table);
        assert_eq!(service.current_year(), chrono::Local::now().year());
    }

    #[test]
    fn test_unresolved_districts_share_one_metric_series() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let service = service();

        ::metrics::with_local_recorder(&recorder, || {
            for i in 0..200 {
                let _ = service.estimate(&input(&format!("nowhere-{}", i)));
            }
            service.estimate(&input("Basel")).unwrap();
            let mut invalid = input("Bern");
            invalid.area = 0.0;
            let _ = service.estimate(&invalid);
        });

        let rendered = handle.render();
        let series: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("estimator_estimates_total{"))
            .collect();

        assert_eq!(series.len(), 3, "{}", rendered);
        assert!(!rendered.contains("nowhere-"));
        assert!(series
            .iter()
            .any(|line| line.contains(r#"district="unknown""#) && line.ends_with(" 200")));
        assert!(series.iter().any(|line| line.contains(r#"district="Bern""#)));
    }

    #[test]
    fn test_replace_table_keeps_old_snapshots() {
        let service = service();
        let before = service.table();

        let table = DistrictPriceTable::from_entries([("Zug", 9000.0)]).unwrap();
        service.replace_table(table);

        assert_eq!(before.len(), 2);
        assert_eq!(service.table().list_names(), vec!["Zug"]);
        assert!(service.estimate(&input("Basel")).is_err());
    }

    #[test]
    fn test_reload_without_source_fails() {
        let service = service();
        assert!(matches!(service.reload(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_reload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "district,price_per_area\nBasel,8000").unwrap();
        file.flush().unwrap();

        let service = PricingService::from_path(file.path()).unwrap();
        assert_eq!(service.table().len(), 1);

        let mut file = std::fs::File::create(file.path()).unwrap();
        writeln!(file, "district,price_per_area\nBasel,8200\nBern,7000").unwrap();
        file.flush().unwrap();

        assert_eq!(service.reload().unwrap(), 2);
        assert_eq!(service.table().lookup("Basel").unwrap(), 8200.0);
    }

    #[test]
    fn test_failed_reload_keeps_current_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "district,price_per_area\nBasel,8000").unwrap();
        file.flush().unwrap();

        let service = PricingService::from_path(file.path()).unwrap();

        let mut file = std::fs::File::create(file.path()).unwrap();
        writeln!(file, "district,price_per_area\nBasel,8000\nBasel,8100").unwrap();
        file.flush().unwrap();

        assert!(matches!(service.reload(), Err(AppError::DataLoad(_))));
        assert_eq!(service.table().lookup("Basel").unwrap(), 8000.0);
    }
}
