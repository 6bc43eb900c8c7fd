//! Fleet diesel cost estimation.
//!
//! Pure arithmetic: consumption rate from monthly usage, monthly cost per truck
//! and for the whole fleet, and a check of average weekly mileage against a
//! per-truck limit.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::validation::validate_non_negative;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default monthly distance per truck, in km.
pub const DEFAULT_MONTHLY_MILEAGE_KM: f64 = 1000.0;
/// Default monthly fuel used per truck, in litres.
pub const DEFAULT_MONTHLY_FUEL_L: f64 = 200.0;
/// Default consumption rate, in L/km.
pub const DEFAULT_CONSUMPTION_RATE: f64 = 0.3;
/// Default fuel price per litre (SAR).
pub const DEFAULT_FUEL_PRICE: f64 = 2.50;
/// Default weekly mileage limit per truck, in km.
pub const DEFAULT_WEEKLY_LIMIT_KM: f64 = 300.0;
/// Default number of trucks.
pub const DEFAULT_FLEET_SIZE: u32 = 10;

/// Weeks per month used to average monthly mileage.
pub const WEEKS_PER_MONTH: f64 = 4.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Inputs for the monthly cost calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct DieselInputs {
    #[validate(range(min = 0.0))]
    pub monthly_mileage: f64,
    #[validate(range(min = 0.0))]
    pub consumption_rate: f64,
    #[validate(range(min = 0.0))]
    pub fuel_price: f64,
    #[validate(range(min = 1))]
    pub fleet_size: u32,
}

impl Default for DieselInputs {
    fn default() -> Self {
        Self {
            monthly_mileage: DEFAULT_MONTHLY_MILEAGE_KM,
            consumption_rate: DEFAULT_CONSUMPTION_RATE,
            fuel_price: DEFAULT_FUEL_PRICE,
            fleet_size: DEFAULT_FLEET_SIZE,
        }
    }
}

/// Monthly diesel cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DieselCost {
    pub cost_per_truck: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStatus {
    Within,
    Exceeded,
}

/// Average weekly mileage compared with the weekly limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyMileage {
    pub average_weekly: f64,
    pub limit: f64,
    pub status: LimitStatus,
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

/// Litres per km from a month of distance and fuel.
pub fn consumption_rate(monthly_mileage: f64, monthly_fuel: f64) -> Result<f64, CoreError> {
    validate_non_negative(monthly_fuel, "monthly_fuel")?;
    if !monthly_mileage.is_finite() || monthly_mileage <= 0.0 {
        return Err(CoreError::Validation("Monthly mileage must be > 0.".to_string()));
    }
    Ok(monthly_fuel / monthly_mileage)
}

/// Monthly cost per truck and for the fleet.
pub fn compute_cost(inputs: &DieselInputs) -> Result<DieselCost, CoreError> {
    validate_non_negative(inputs.monthly_mileage, "monthly_mileage")?;
    validate_non_negative(inputs.consumption_rate, "consumption_rate")?;
    validate_non_negative(inputs.fuel_price, "fuel_price")?;
    inputs
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let cost_per_truck = inputs.monthly_mileage * inputs.consumption_rate * inputs.fuel_price;
    Ok(DieselCost {
        cost_per_truck,
        total_cost: cost_per_truck * f64::from(inputs.fleet_size),
    })
}

/// Compare average weekly mileage (monthly / 4) with the limit.
pub fn check_weekly_limit(monthly_mileage: f64, weekly_limit: f64) -> Result<WeeklyMileage, CoreError> {
    validate_non_negative(monthly_mileage, "monthly_mileage")?;
    validate_non_negative(weekly_limit, "weekly_limit")?;

    let average_weekly = monthly_mileage / WEEKS_PER_MONTH;
    let status = if average_weekly > weekly_limit {
        LimitStatus::Exceeded
    } else {
        LimitStatus::Within
    };
    Ok(WeeklyMileage {
        average_weekly,
        limit: weekly_limit,
        status,
    })
}

/// Two decimals with thousands separators: `7500.0` -> `"7,500.00"`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
