use crate::error::AppError;
use crate::pricing::districts::DistrictPriceTable;
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const DISTRICT_COLUMN: &str = "district";

/// Header names accepted for the price column
const PRICE_COLUMNS: [&str; 4] = [
    "price_per_area",
    "priceperarea",
    "price per unit area",
    "price_per_m2",
];

/// Load the district table from a CSV file
pub fn load_from_path(path: &Path) -> Result<DistrictPriceTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::DataLoad(format!("failed to open '{}': {}", path.display(), e))
    })?;

    let table = load_from_reader(file)?;
    info!(
        "Loaded {} district prices from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Load the district table from any CSV source
///
/// Requires a header row with a `district` column and a price column. Any bad
/// row rejects the whole table.
pub fn load_from_reader<R: Read>(source: R) -> Result<DistrictPriceTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::DataLoad(format!("failed to read CSV headers: {}", e)))?
        .clone();

    let (district_idx, price_idx) = resolve_columns(&headers)?;

    let mut entries = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records start on the line after the header
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::DataLoad(format!("line {}: CSV parse error: {}", line, e)))?;
        entries.push(parse_row(&record, district_idx, price_idx, line)?);
    }

    if entries.is_empty() {
        return Err(AppError::DataLoad("price table contains no districts".to_string()));
    }

    debug!("Parsed {} district rows", entries.len());
    DistrictPriceTable::from_entries(entries)
}

fn resolve_columns(headers: &StringRecord) -> Result<(usize, usize), AppError> {
    let mut district_idx = None;
    let mut price_idx = None;

    for (idx, name) in headers.iter().enumerate() {
        let name = normalize_header_name(name);
        if name == DISTRICT_COLUMN && district_idx.is_none() {
            district_idx = Some(idx);
        } else if PRICE_COLUMNS.contains(&name.as_str()) && price_idx.is_none() {
            price_idx = Some(idx);
        }
    }

    match (district_idx, price_idx) {
        (Some(d), Some(p)) => Ok((d, p)),
        (None, _) => Err(AppError::DataLoad(format!(
            "missing required column '{}'",
            DISTRICT_COLUMN
        ))),
        (_, None) => Err(AppError::DataLoad(format!(
            "missing price column (expected one of: {})",
            PRICE_COLUMNS.join(", ")
        ))),
    }
}

fn normalize_header_name(name: &str) -> String {
    // spreadsheet exports may prefix the first header with a BOM
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    district_idx: usize,
    price_idx: usize,
    line: usize,
) -> Result<(String, f64), AppError> {
    let district = record
        .get(district_idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::DataLoad(format!("line {}: missing district name", line)))?;

    let raw_price = record
        .get(price_idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::DataLoad(format!("line {}: missing price for '{}'", line, district))
        })?;

    let price = raw_price.parse::<f64>().map_err(|_| {
        AppError::DataLoad(format!(
            "line {}: price '{}' for '{}' is not a number",
            line, raw_price, district
        ))
    })?;

    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::DataLoad(format!(
            "line {}: price for '{}' must be positive, got {}",
            line, district, price
        )));
    }

    Ok((district.to_string(), price))
}
