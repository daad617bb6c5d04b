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

//! Compatibility filters over the catalog
//!
//! Each filter narrows one equipment kind down to the items that fit
//! the system being sized. The filters never mutate the catalog; they
//! return borrowed views in catalog order.

use crate::voltage::VoltageTier;
use wattplan_types::{Catalog, EquipmentItem, SizingFactors};

/// Panels that can contribute power to the array
pub fn eligible_panels(catalog: &Catalog) -> Vec<&EquipmentItem> {
    catalog
        .panels()
        .filter(|item| item.as_panel().is_some_and(|panel| panel.output_w > 0.0))
        .collect()
}

/// Inverters on the tier's DC bus rated above the required power
///
/// The rating must clear the draw with headroom, `required_power_w`
/// times `factors.inverter_headroom`.
pub fn eligible_inverters<'a>(
    catalog: &'a Catalog,
    tier: VoltageTier,
    required_power_w: f64,
    factors: &SizingFactors,
) -> Vec<&'a EquipmentItem> {
    let minimum_input_w = required_power_w * factors.inverter_headroom;
    catalog
        .inverters()
        .filter(|item| {
            item.as_inverter().is_some_and(|inverter| {
                inverter.dc_bus_voltage == tier.volts() && inverter.input_w >= minimum_input_w
            })
        })
        .collect()
}

/// Batteries whose voltage divides the inverter's DC bus into whole
/// series strings
///
/// Catalog voltages are whole volts, so the modulo is exact; a zero
/// battery voltage never matches.
pub fn eligible_batteries(catalog: &Catalog, dc_bus_voltage: f64) -> Vec<&EquipmentItem> {
    catalog
        .batteries()
        .filter(|item| {
            item.as_battery().is_some_and(|battery| {
                battery.voltage > 0.0 && dc_bus_voltage % battery.voltage == 0.0
            })
        })
        .collect()
}
