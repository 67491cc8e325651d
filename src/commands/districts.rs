use anyhow::Result;
use colored::Colorize;
use immo_estimator::{config, pricing};
use std::path::Path;

/// Execute the districts command
///
/// Prints the configured price table in name order
pub fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let table = pricing::load_from_path(&cfg.data.districts_csv)?;

    println!(
        "{} ({})",
        "Districts".bold(),
        cfg.data.districts_csv.display()
    );

    let width = table.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);
    for (name, price) in table.iter() {
        let padded = format!("{:<width$}", name, width = width);
        println!("  {}  {:>10.2} CHF/m²", padded.cyan(), price);
    }
    println!();
    println!("  {} districts", table.len());

    Ok(())
}
