use anyhow::{Context, Result};
use colored::Colorize;
use immo_estimator::{
    config,
    pricing::{PriceEstimate, PricingService},
};
use std::path::Path;

use crate::cli::EstimateArgs;

/// Execute the estimate command
///
/// Loads the configured district table and prints a single estimate
pub fn execute(config_path: &Path, args: &EstimateArgs) -> Result<()> {
    let cfg = config::load_config(config_path)?;

    let pricing = PricingService::from_path(&cfg.data.districts_csv)
        .with_context(|| format!("Failed to load {}", cfg.data.districts_csv.display()))?
        .with_current_year(args.current_year.or(cfg.pricing.current_year));

    let input = args.to_input();
    let estimate = pricing.estimate(&input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print_estimate(&input.district, pricing.current_year(), &estimate);
    }

    Ok(())
}

fn print_estimate(district: &str, current_year: i32, estimate: &PriceEstimate) {
    let adj = &estimate.adjustments;

    println!("{} {}", "Estimate for".bold(), district.cyan());
    println!(
        "  {}: {:.2} CHF/m² (reference year {})",
        "Base price".cyan(),
        estimate.base_price_per_area,
        current_year
    );
    println!("  {}:", "Adjustments".cyan());
    println!("    Age:          {}", format_percent(-adj.age_deduction));
    println!("    Fibre optic:  {}", format_percent(adj.fiber_bonus));
    println!("    Renovations:  {}", format_percent(adj.renovation_bonus));
    println!("    Fund:         {}", format_percent(adj.fund_bonus));
    println!("    Amenities:    {}", format_percent(adj.amenity_bonus));
    println!("    Rooms:        {}", format_percent(adj.rooms_bonus));
    println!("    {}        {}", "Total:".bold(), format_percent(estimate.total_adjustment));
    println!();
    println!(
        "  {}: {:.2} CHF",
        "Estimated price per m²".green().bold(),
        estimate.price_per_area
    );
    println!(
        "  {}: {:.2} CHF",
        "Estimated total price".green().bold(),
        estimate.total_price
    );
}

fn format_percent(fraction: f64) -> String {
    format!("{:+.2}%", fraction * 100.0)
}
