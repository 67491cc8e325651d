//! Price formula
//!
//! `price_per_area = base * (1 + total_adjustment)`, where the adjustment is the
//! sum of the age malus and the fibre, renovation, fund, amenity and room
//! bonuses. No floor or ceiling is applied: extreme inputs can push the price
//! below zero.

use crate::error::AppError;
use crate::pricing::models::{AdjustmentBreakdown, PriceEstimate, PropertyInput};
use std::collections::HashSet;

pub const MIN_CONSTRUCTION_YEAR: i32 = 1800;
pub const MIN_RENOVATION_YEAR: i32 = 1900;

/// Buildings strictly older than this many years get the age deduction
pub const AGE_THRESHOLD_YEARS: i32 = 30;
pub const AGE_DEDUCTION: f64 = 0.20;

pub const FIBER_BONUS: f64 = 0.05;

/// Renovations at most this many years old count in full, older ones not at all
pub const RENOVATION_WINDOW_YEARS: i32 = 10;

pub const FUND_BALANCE_DIVISOR: f64 = 10_000.0;
pub const FUND_BONUS_CAP: f64 = 0.10;

pub const ROOMS_BASELINE: f64 = 2.5;
pub const ROOMS_BONUS_PER_ROOM: f64 = 0.01;

/// Estimate the price of a property given its district's base price
///
/// The district lookup is the caller's job; `base_price_per_area` is the
/// already-resolved value.
pub fn estimate(
    input: &PropertyInput,
    base_price_per_area: f64,
    current_year: i32,
) -> Result<PriceEstimate, AppError> {
    validate(input, current_year)?;

    let adjustments = adjustments(input, current_year);
    let total_adjustment = adjustments.total();
    let price_per_area = base_price_per_area * (1.0 + total_adjustment);

    Ok(PriceEstimate {
        price_per_area,
        total_price: price_per_area * input.area,
        base_price_per_area,
        total_adjustment,
        adjustments,
    })
}

/// Check preconditions in order, returning the first violation
pub fn validate(input: &PropertyInput, current_year: i32) -> Result<(), AppError> {
    if !input.area.is_finite() || input.area <= 0.0 {
        return Err(AppError::InvalidArea(input.area));
    }

    if input.construction_year < MIN_CONSTRUCTION_YEAR || input.construction_year > current_year
    {
        return Err(AppError::InvalidYear {
            year: input.construction_year,
            min: MIN_CONSTRUCTION_YEAR,
            max: current_year,
        });
    }

    for record in &input.renovations {
        if let Some(year) = record.effective_year() {
            if !(MIN_RENOVATION_YEAR..=current_year).contains(&year) {
                return Err(AppError::InvalidRenovationYear {
                    category: record.category,
                    year,
                    min: MIN_RENOVATION_YEAR,
                    max: current_year,
                });
            }
        }
    }

    let mut seen = HashSet::new();
    for record in &input.renovations {
        if !seen.insert(record.category) {
            return Err(AppError::DuplicateRenovation(record.category));
        }
    }

    if !input.renovation_fund_balance.is_finite() || input.renovation_fund_balance < 0.0 {
        return Err(AppError::InvalidFundBalance(input.renovation_fund_balance));
    }

    if !input.rooms.is_finite() {
        return Err(AppError::InvalidRooms(input.rooms));
    }

    Ok(())
}

/// Compute every adjustment term; assumes `input` passed [`validate`]
pub fn adjustments(input: &PropertyInput, current_year: i32) -> AdjustmentBreakdown {
    let age = current_year - input.construction_year;

    AdjustmentBreakdown {
        age_deduction: if age > AGE_THRESHOLD_YEARS {
            AGE_DEDUCTION
        } else {
            0.0
        },
        fiber_bonus: if input.has_fiber_optic { FIBER_BONUS } else { 0.0 },
        renovation_bonus: renovation_bonus(input, current_year),
        fund_bonus: fund_bonus(input.renovation_fund_balance),
        amenity_bonus: input.laundry_type.bonus()
            + input.parking_type.bonus()
            + input.cellar_type.bonus()
            + input.attic_type.bonus(),
        rooms_bonus: ROOMS_BONUS_PER_ROOM * (input.rooms - ROOMS_BASELINE),
    }
}

fn renovation_bonus(input: &PropertyInput, current_year: i32) -> f64 {
    input
        .renovations
        .iter()
        .filter_map(|record| {
            let year = record.effective_year()?;
            (current_year - year <= RENOVATION_WINDOW_YEARS).then(|| record.category.bonus())
        })
        .sum()
}

/// Linear in the fund balance, capped
pub fn fund_bonus(balance: f64) -> f64 {
    (balance / FUND_BALANCE_DIVISOR).min(FUND_BONUS_CAP)
}
