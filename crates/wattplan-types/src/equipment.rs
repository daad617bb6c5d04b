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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============= Equipment Kind Enum =============

/// Equipment categories WattPlan can size
/// Every catalog item belongs to exactly one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    /// Photovoltaic panel (rated output in watts)
    SolarPanel,
    /// Inverter/charger (rated input in watts, nominal DC bus voltage)
    Inverter,
    /// Battery (capacity in amp-hours, nominal voltage)
    Battery,
}

impl EquipmentKind {
    /// Get human-readable name for the equipment kind
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SolarPanel => "Solar Panel",
            Self::Inverter => "Inverter",
            Self::Battery => "Battery",
        }
    }

    /// Get catalog string value (snake_case, as the store API sends it)
    pub fn to_catalog_value(&self) -> &'static str {
        match self {
            Self::SolarPanel => "solar_panel",
            Self::Inverter => "inverter",
            Self::Battery => "battery",
        }
    }

    /// List all supported equipment kinds
    pub fn all() -> &'static [EquipmentKind] {
        &[Self::SolarPanel, Self::Inverter, Self::Battery]
    }
}

impl fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for EquipmentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "solar_panel" => Ok(Self::SolarPanel),
            "inverter" => Ok(Self::Inverter),
            "battery" => Ok(Self::Battery),
            _ => Err(anyhow::anyhow!(
                "Unknown equipment kind: '{}'. Supported kinds: {}",
                s,
                Self::all()
                    .iter()
                    .map(|k| k.to_catalog_value())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

// ============= Per-Kind Specifications =============

/// Panel nameplate data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    /// Rated output under standard test conditions (W)
    pub output_w: f64,
}

/// Inverter nameplate data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InverterSpec {
    /// Maximum continuous input the unit accepts (W)
    pub input_w: f64,
    /// Nominal DC bus voltage the battery bank must match (V)
    /// Upstream catalogs name this field `DC_volr`
    #[serde(alias = "DC_volr")]
    pub dc_bus_voltage: f64,
    /// Built-in charger output current (A)
    pub charging_current_a: f64,
}

/// Battery nameplate data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySpec {
    /// Rated capacity (Ah)
    pub capacity_ah: f64,
    /// Nominal voltage (V)
    pub voltage: f64,
}

/// Typed specification, one variant per equipment kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSpec {
    SolarPanel(PanelSpec),
    Inverter(InverterSpec),
    Battery(BatterySpec),
}

impl EquipmentSpec {
    pub fn kind(&self) -> EquipmentKind {
        match self {
            Self::SolarPanel(_) => EquipmentKind::SolarPanel,
            Self::Inverter(_) => EquipmentKind::Inverter,
            Self::Battery(_) => EquipmentKind::Battery,
        }
    }
}

// ============= Catalog Item =============

/// One priced catalog entry with its typed specification
///
/// Items are immutable snapshots of the upstream catalog. Fields the
/// sizing engine does not consume (images, descriptions, stock) are
/// dropped at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: u64,
    pub name: String,
    /// Unit price in the catalog's currency
    pub price: f64,
    pub spec: EquipmentSpec,
}

impl EquipmentItem {
    pub fn kind(&self) -> EquipmentKind {
        self.spec.kind()
    }

    /// Panel specification, if this item is a panel
    pub fn as_panel(&self) -> Option<&PanelSpec> {
        match &self.spec {
            EquipmentSpec::SolarPanel(spec) => Some(spec),
            EquipmentSpec::Inverter(_) | EquipmentSpec::Battery(_) => None,
        }
    }

    /// Inverter specification, if this item is an inverter
    pub fn as_inverter(&self) -> Option<&InverterSpec> {
        match &self.spec {
            EquipmentSpec::Inverter(spec) => Some(spec),
            EquipmentSpec::SolarPanel(_) | EquipmentSpec::Battery(_) => None,
        }
    }

    /// Battery specification, if this item is a battery
    pub fn as_battery(&self) -> Option<&BatterySpec> {
        match &self.spec {
            EquipmentSpec::Battery(spec) => Some(spec),
            EquipmentSpec::SolarPanel(_) | EquipmentSpec::Inverter(_) => None,
        }
    }
}
