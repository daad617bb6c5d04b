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

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

fn default_inverter_headroom() -> f64 {
    1.1
}

fn default_usable_capacity_factor() -> f64 {
    0.8
}

fn default_charge_overhead() -> f64 {
    1.15
}

/// Sizing rule-of-thumb factors
///
/// The defaults reproduce the retailer's long-standing sizing rules:
/// inverters are oversized 10% above the load, battery runtime is derated
/// to 80% of nameplate capacity, and charge time carries a 15% overhead.
/// All three can be overridden under `[sizing]` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingFactors {
    /// Required inverter input as a multiple of the load (≥ 1.0)
    #[serde(default = "default_inverter_headroom")]
    pub inverter_headroom: f64,

    /// Fraction of nameplate battery capacity counted toward runtime (0, 1]
    #[serde(default = "default_usable_capacity_factor")]
    pub usable_capacity_factor: f64,

    /// Charge-time multiplier covering charger losses (≥ 1.0)
    #[serde(default = "default_charge_overhead")]
    pub charge_overhead: f64,
}

impl Default for SizingFactors {
    fn default() -> Self {
        Self {
            inverter_headroom: default_inverter_headroom(),
            usable_capacity_factor: default_usable_capacity_factor(),
            charge_overhead: default_charge_overhead(),
        }
    }
}

impl SizingFactors {
    /// Validate factor ranges, with actionable messages
    pub fn validate(&self) -> Result<()> {
        if !self.inverter_headroom.is_finite() || self.inverter_headroom < 1.0 {
            bail!(
                "sizing.inverter_headroom must be a finite value >= 1.0, got {}",
                self.inverter_headroom
            );
        }
        if !self.usable_capacity_factor.is_finite()
            || self.usable_capacity_factor <= 0.0
            || self.usable_capacity_factor > 1.0
        {
            bail!(
                "sizing.usable_capacity_factor must be in (0.0, 1.0], got {}",
                self.usable_capacity_factor
            );
        }
        if !self.charge_overhead.is_finite() || self.charge_overhead < 1.0 {
            bail!(
                "sizing.charge_overhead must be a finite value >= 1.0, got {}",
                self.charge_overhead
            );
        }
        Ok(())
    }
}
