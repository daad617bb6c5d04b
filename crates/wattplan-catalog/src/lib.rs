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

//! Upstream catalog access for WattPlan.
//!
//! ## Features
//!
//! - Paginated product fetch handling both store response shapes
//!   (`{ data, meta }` envelopes and bare arrays)
//! - Strict record normalization: malformed records are skipped with a
//!   per-record reason instead of being coerced to zero-spec equipment
//! - Cooperative cancellation so a superseded fetch stops instead of
//!   running to completion in the background
//! - [`CatalogSource`] seam with HTTP and local-file implementations

pub mod cancel;
pub mod client;
pub mod errors;
pub mod record;
pub mod source;

pub use cancel::{CancelHandle, CancelToken};
pub use client::HttpCatalogClient;
pub use errors::{CatalogError, Result};
pub use record::{CatalogFetch, RejectedRecord};
pub use source::{CatalogSource, FileCatalogSource};
