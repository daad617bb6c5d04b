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

//! Sizing session state machine
//!
//! A session is an immutable value; every user action is a
//! `SizingEvent` and `apply` returns the next session, leaving the old
//! one untouched. Downstream selections that a change invalidates are
//! cleared in the same step, so a session can never pair an inverter
//! with a power draw it was not chosen for.

use crate::sizing::{
    SizingAlert, SystemSummary, runtime_per_string_hours, series_count, suggested_panel_count,
};
use crate::voltage::VoltageTier;
use tracing::{debug, warn};
use wattplan_types::{EquipmentItem, EquipmentKind, SizingFactors};

/// A chosen panel model with the number of units to install
#[derive(Debug, Clone, PartialEq)]
pub struct PanelChoice {
    pub item: EquipmentItem,
    pub quantity: u32,
}

/// One user action against the session
#[derive(Debug, Clone, PartialEq)]
pub enum SizingEvent {
    PowerChanged(f64),
    PanelSelected(EquipmentItem),
    PanelQuantityChanged(u32),
    InverterSelected(EquipmentItem),
    BatterySelected(EquipmentItem),
    ParallelStringsChanged(u32),
    BackupHoursChanged(f64),
}

/// Snapshot of one sizing exercise
#[derive(Debug, Clone, PartialEq)]
pub struct SizingSession {
    required_power_w: f64,
    panel: Option<PanelChoice>,
    inverter: Option<EquipmentItem>,
    battery: Option<EquipmentItem>,
    parallel_strings: u32,
    backup_hours: f64,
}

impl Default for SizingSession {
    fn default() -> Self {
        Self {
            required_power_w: 0.0,
            panel: None,
            inverter: None,
            battery: None,
            parallel_strings: 1,
            backup_hours: 0.0,
        }
    }
}

impl SizingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required_power_w(&self) -> f64 {
        self.required_power_w
    }

    pub fn panel(&self) -> Option<&PanelChoice> {
        self.panel.as_ref()
    }

    pub fn inverter(&self) -> Option<&EquipmentItem> {
        self.inverter.as_ref()
    }

    pub fn battery(&self) -> Option<&EquipmentItem> {
        self.battery.as_ref()
    }

    pub fn parallel_strings(&self) -> u32 {
        self.parallel_strings
    }

    pub fn backup_hours(&self) -> f64 {
        self.backup_hours
    }

    /// DC bus tier implied by the current power draw
    pub fn voltage_tier(&self) -> Option<VoltageTier> {
        VoltageTier::for_power(self.required_power_w)
    }

    /// Apply one event and return the next session
    ///
    /// Invalid events are absorbed: a selection of the wrong equipment
    /// kind, a zero count or a battery chosen before any inverter all
    /// leave the session unchanged.
    #[must_use]
    pub fn apply(&self, event: SizingEvent) -> Self {
        let mut next = self.clone();
        match event {
            SizingEvent::PowerChanged(watts) => {
                next.required_power_w = if watts.is_finite() { watts } else { 0.0 };
                if next.inverter.is_some() || next.battery.is_some() {
                    debug!(
                        "Power changed to {} W, clearing inverter and battery selections",
                        next.required_power_w
                    );
                }
                next.inverter = None;
                next.battery = None;
            }
            SizingEvent::PanelSelected(item) => {
                if item.kind() != EquipmentKind::SolarPanel {
                    warn!("Ignoring '{}' as panel selection, item is a {}", item.name, item.kind());
                    return next;
                }
                let output_w = item.as_panel().map_or(0.0, |panel| panel.output_w);
                let quantity = suggested_panel_count(self.required_power_w, output_w).max(1);
                next.panel = Some(PanelChoice { item, quantity });
            }
            SizingEvent::PanelQuantityChanged(quantity) => {
                if quantity == 0 {
                    return next;
                }
                if let Some(choice) = &mut next.panel {
                    choice.quantity = quantity;
                }
            }
            SizingEvent::InverterSelected(item) => {
                if item.kind() != EquipmentKind::Inverter {
                    warn!(
                        "Ignoring '{}' as inverter selection, item is a {}",
                        item.name,
                        item.kind()
                    );
                    return next;
                }
                if next.battery.is_some() {
                    debug!("Inverter changed, clearing battery selection");
                }
                next.inverter = Some(item);
                next.battery = None;
            }
            SizingEvent::BatterySelected(item) => {
                if item.kind() != EquipmentKind::Battery {
                    warn!(
                        "Ignoring '{}' as battery selection, item is a {}",
                        item.name,
                        item.kind()
                    );
                    return next;
                }
                if next.inverter.is_none() {
                    warn!("Ignoring battery selection, no inverter chosen yet");
                    return next;
                }
                next.battery = Some(item);
            }
            SizingEvent::ParallelStringsChanged(strings) => {
                if strings == 0 {
                    return next;
                }
                next.parallel_strings = strings;
            }
            SizingEvent::BackupHoursChanged(hours) => {
                if hours.is_finite() && hours >= 0.0 {
                    next.backup_hours = hours;
                }
            }
        }
        next
    }

    /// Price and dimension the selected system
    ///
    /// Pure over the session snapshot; calling it twice returns the
    /// same summary.
    ///
    /// # Errors
    ///
    /// Returns a `SizingAlert` when the power draw is not positive or
    /// any of the three selections is missing.
    pub fn summary(&self, factors: &SizingFactors) -> Result<SystemSummary, SizingAlert> {
        if !self.required_power_w.is_finite() || self.required_power_w <= 0.0 {
            return Err(SizingAlert::InvalidPower);
        }
        let (Some(choice), Some(inverter_item), Some(battery_item)) =
            (&self.panel, &self.inverter, &self.battery)
        else {
            return Err(SizingAlert::IncompleteSelection);
        };
        let (Some(inverter), Some(battery)) =
            (inverter_item.as_inverter(), battery_item.as_battery())
        else {
            return Err(SizingAlert::IncompleteSelection);
        };

        let panels_cost = f64::from(choice.quantity) * choice.item.price;
        let series = series_count(inverter.dc_bus_voltage, battery.voltage);
        let total_batteries = series * self.parallel_strings;
        let batteries_cost = f64::from(total_batteries) * battery_item.price;
        let string_capacity_wh = battery.capacity_ah * inverter.dc_bus_voltage;
        let per_string = runtime_per_string_hours(
            string_capacity_wh,
            self.required_power_w,
            factors.usable_capacity_factor,
        );
        let total_runtime = per_string * f64::from(self.parallel_strings);
        let charging_time_hours = if inverter.charging_current_a > 0.0 {
            Some(battery.capacity_ah / inverter.charging_current_a)
        } else {
            None
        };

        Ok(SystemSummary {
            required_power_w: self.required_power_w,
            panel_count: choice.quantity,
            panels_cost,
            inverter_cost: inverter_item.price,
            series_count: series,
            parallel_strings: self.parallel_strings,
            total_batteries,
            batteries_cost,
            string_capacity_wh,
            runtime_per_string_hours: per_string,
            total_runtime_hours: total_runtime,
            charging_time_hours,
            adjusted_charging_time_hours: charging_time_hours
                .map(|hours| hours * factors.charge_overhead),
            total_cost: panels_cost + inverter_item.price + batteries_cost,
            backup_hours: self.backup_hours,
            runtime_warning: total_runtime < self.backup_hours,
        })
    }
}
