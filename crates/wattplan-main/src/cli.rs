// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of WattPlan.

//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wattplan")]
#[command(author, version, about = "WattPlan Off-Grid Sizing CLI")]
#[command(
    long_about = "Sizes off-grid solar systems against the SOLARE equipment catalog.\n\
    \nThe catalog is loaded from the store API (or a local JSON file) and every\n\
    calculation runs against that snapshot.\n\
    \nExamples:\n  \
    wattplan serve                          # Start the storefront JSON API\n  \
    wattplan catalog                        # List the loaded equipment\n  \
    wattplan size --power 1000 --panel 11 --inverter 42 --battery 7"
)]
pub struct Cli {
    /// Path to a TOML or JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the store API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Read the catalog from a local JSON file instead of the store API
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the JSON API server for the storefront
    Serve(ServeArgs),

    /// Fetch the catalog and list its items
    Catalog(CatalogArgs),

    /// Size a system directly from the command line
    #[command(
        long_about = "Sizes one system and prints the priced summary.\n\
        \nThe selected equipment must be compatible: the inverter has to sit on\n\
        the voltage tier implied by --power and carry the headroom margin, and\n\
        the battery voltage has to divide the inverter's DC bus.\n\
        \nExample:\n  \
        wattplan size --power 1000 --panel 11 --inverter 42 --battery 7 \\\n      \
        --parallel 2 --backup-hours 5"
    )]
    Size(SizeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen port; defaults to web.port from the configuration
    #[arg(long, help = "Port for the JSON API")]
    pub port: Option<u16>,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Print items as pretty JSON instead of a table
    #[arg(long, default_value_t = false, help = "Emit the catalog as JSON")]
    pub json: bool,
}

#[derive(Args)]
pub struct SizeArgs {
    /// Required continuous power draw in watts
    #[arg(
        long,
        value_parser = parse_positive_power,
        help = "Load the system must carry (must be > 0)"
    )]
    pub power: f64,

    /// Catalog id of the solar panel model
    #[arg(long, value_name = "ID")]
    pub panel: u64,

    /// Number of panels; defaults to the suggested count
    #[arg(long, value_name = "COUNT")]
    pub panel_count: Option<u32>,

    /// Catalog id of the inverter
    #[arg(long, value_name = "ID")]
    pub inverter: u64,

    /// Catalog id of the battery model
    #[arg(long, value_name = "ID")]
    pub battery: u64,

    /// Battery strings wired in parallel
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Parallel battery strings (must be >= 1)"
    )]
    pub parallel: u32,

    /// Backup window the bank should cover, in hours
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Requested backup window in hours"
    )]
    pub backup_hours: f64,
}

fn parse_positive_power(value: &str) -> Result<f64, String> {
    let power: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !power.is_finite() || power <= 0.0 {
        return Err("power must be greater than zero".to_string());
    }
    Ok(power)
}
