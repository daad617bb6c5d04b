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

//! System voltage tiering
//!
//! Small off-grid systems run a 12V DC bus, mid-size systems 24V and
//! large ones 48V. The tier is derived from the required power draw and
//! drives which inverters are compatible.

use serde::{Deserialize, Serialize};
use std::fmt;

/// DC bus voltage class of the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoltageTier {
    #[serde(rename = "12V")]
    V12,
    #[serde(rename = "24V")]
    V24,
    #[serde(rename = "48V")]
    V48,
}

impl VoltageTier {
    /// Tier for a required power draw in watts
    ///
    /// Returns `None` until the power is a positive number; there is no
    /// meaningful bus voltage for an unloaded system.
    pub fn for_power(required_power_w: f64) -> Option<Self> {
        if !required_power_w.is_finite() || required_power_w <= 0.0 {
            return None;
        }
        if required_power_w < 1500.0 {
            Some(Self::V12)
        } else if required_power_w < 3000.0 {
            Some(Self::V24)
        } else {
            Some(Self::V48)
        }
    }

    /// Nominal bus voltage in volts
    pub fn volts(self) -> f64 {
        match self {
            Self::V12 => 12.0,
            Self::V24 => 24.0,
            Self::V48 => 48.0,
        }
    }

    /// Get human-readable display name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::V12 => "12V",
            Self::V24 => "24V",
            Self::V48 => "48V",
        }
    }

    /// Get all available tiers
    pub fn all() -> Vec<Self> {
        vec![Self::V12, Self::V24, Self::V48]
    }
}

impl fmt::Display for VoltageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
