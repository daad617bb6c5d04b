// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of WattPlan.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Sizing arithmetic
//!
//! The building blocks behind the system summary. Every division here
//! is guarded; a zero divisor yields zero instead of infinity so a
//! half-filled session can never render NaN at the user.

use serde::Serialize;
use thiserror::Error;

/// Precondition failures surfaced to the user as alerts
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SizingAlert {
    #[error("Enter a valid power greater than zero")]
    InvalidPower,

    #[error("Select a panel, inverter, and battery")]
    IncompleteSelection,
}

/// Priced and dimensioned result of a completed sizing session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    pub required_power_w: f64,
    pub panel_count: u32,
    pub panels_cost: f64,
    pub inverter_cost: f64,
    /// Batteries wired in series per string
    pub series_count: u32,
    pub parallel_strings: u32,
    pub total_batteries: u32,
    pub batteries_cost: f64,
    /// Energy stored in one series string, watt-hours
    pub string_capacity_wh: f64,
    pub runtime_per_string_hours: f64,
    pub total_runtime_hours: f64,
    /// Hours to recharge one battery; `None` when the inverter does not
    /// publish a charging current
    pub charging_time_hours: Option<f64>,
    pub adjusted_charging_time_hours: Option<f64>,
    pub total_cost: f64,
    pub backup_hours: f64,
    /// Set when the bank runs dry before the requested backup window
    pub runtime_warning: bool,
}

/// Panels needed to cover the required draw, rounded up
///
/// Zero when either argument is not positive; a suggestion only makes
/// sense for a real load and a producing panel.
pub fn suggested_panel_count(required_power_w: f64, panel_output_w: f64) -> u32 {
    if !required_power_w.is_finite() || required_power_w <= 0.0 || panel_output_w <= 0.0 {
        return 0;
    }
    (required_power_w / panel_output_w).ceil() as u32
}

/// Batteries wired in series to reach the DC bus voltage
///
/// Zero when the battery voltage is zero.
pub fn series_count(dc_bus_voltage: f64, battery_voltage: f64) -> u32 {
    if battery_voltage <= 0.0 {
        return 0;
    }
    (dc_bus_voltage / battery_voltage) as u32
}

/// Usable backup hours one series string delivers at the required draw
///
/// Zero when there is no draw. Only `usable_capacity_factor` of the
/// nameplate energy counts; lead and LiFePO4 banks are never drained to
/// the last watt-hour.
pub fn runtime_per_string_hours(
    string_capacity_wh: f64,
    required_power_w: f64,
    usable_capacity_factor: f64,
) -> f64 {
    if required_power_w <= 0.0 {
        return 0.0;
    }
    string_capacity_wh / required_power_w * usable_capacity_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_panel_count_rounds_up() {
        assert_eq!(suggested_panel_count(1000.0, 300.0), 4);
        assert_eq!(suggested_panel_count(900.0, 300.0), 3);
        assert_eq!(suggested_panel_count(1.0, 300.0), 1);
    }

    #[test]
    fn test_suggested_panel_count_guards() {
        assert_eq!(suggested_panel_count(0.0, 300.0), 0);
        assert_eq!(suggested_panel_count(-50.0, 300.0), 0);
        assert_eq!(suggested_panel_count(1000.0, 0.0), 0);
        assert_eq!(suggested_panel_count(f64::NAN, 300.0), 0);
    }

    #[test]
    fn test_series_count() {
        assert_eq!(series_count(24.0, 12.0), 2);
        assert_eq!(series_count(48.0, 12.0), 4);
        assert_eq!(series_count(12.0, 12.0), 1);
    }

    #[test]
    fn test_series_count_zero_voltage() {
        assert_eq!(series_count(24.0, 0.0), 0);
        assert_eq!(series_count(24.0, -12.0), 0);
    }

    #[test]
    fn test_runtime_per_string() {
        let runtime = runtime_per_string_hours(2400.0, 1000.0, 0.8);
        assert!((runtime - 1.92).abs() < 1e-9);
    }

    #[test]
    fn test_runtime_zero_draw() {
        assert_eq!(runtime_per_string_hours(2400.0, 0.0, 0.8), 0.0);
        assert_eq!(runtime_per_string_hours(2400.0, -5.0, 0.8), 0.0);
    }

    #[test]
    fn test_alert_messages() {
        assert_eq!(
            SizingAlert::InvalidPower.to_string(),
            "Enter a valid power greater than zero"
        );
        assert_eq!(
            SizingAlert::IncompleteSelection.to_string(),
            "Select a panel, inverter, and battery"
        );
    }
}
