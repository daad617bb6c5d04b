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

//! Off-grid sizing engine
//!
//! Pure calculation layer between the equipment catalog and the user
//! interfaces. No IO happens here: callers hand in a catalog snapshot
//! and session state, and get filtered equipment lists or a priced
//! system summary back.
//!
//! ## Features
//!
//! - System voltage tiering from the required power draw
//! - Compatibility filters for panels, inverters and batteries
//! - Panel quantity suggestion and battery bank arithmetic
//! - Immutable sizing session driven by an event reducer
//! - Full cost and runtime summary with user-facing preconditions

pub mod compat;
pub mod session;
pub mod sizing;
pub mod voltage;

// Re-export common types for convenience
pub use compat::{eligible_batteries, eligible_inverters, eligible_panels};
pub use session::{PanelChoice, SizingEvent, SizingSession};
pub use sizing::{
    SizingAlert, SystemSummary, runtime_per_string_hours, series_count, suggested_panel_count,
};
pub use voltage::VoltageTier;
