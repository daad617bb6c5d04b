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

//! WattPlan entry point
//!
//! Wires the configured catalog source into the web server or runs a
//! one-shot catalog or sizing command.

mod cli;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{CatalogArgs, Cli, Commands, ServeArgs, SizeArgs};
use config::AppConfig;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;
use wattplan_catalog::{CatalogSource, FileCatalogSource, HttpCatalogClient};
use wattplan_core::{
    SizingAlert, SizingEvent, SizingSession, SystemSummary, VoltageTier, eligible_batteries,
    eligible_inverters, eligible_panels,
};
use wattplan_web::{AppState, start_web_server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("🚀 Starting WattPlan - Off-Grid Equipment Sizing");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.catalog_url {
        config.catalog.base_url = url;
    }
    if let Some(file) = cli.catalog_file {
        config.catalog.file = Some(file.display().to_string());
    }
    config.validate()?;

    info!("📋 Configuration:");
    match &config.catalog.file {
        Some(file) => info!("   Catalog: local file {}", file),
        None => info!(
            "   Catalog: {} (timeout {}s, up to {} pages)",
            config.catalog.base_url, config.catalog.timeout_secs, config.catalog.max_pages
        ),
    }
    info!(
        "   Sizing factors: headroom ×{}, usable capacity {}, charge overhead ×{}",
        config.sizing.inverter_headroom,
        config.sizing.usable_capacity_factor,
        config.sizing.charge_overhead
    );

    let source = build_source(&config)?;
    info!("🛒 Catalog source: {}", source.name());

    match cli.command {
        Commands::Serve(args) => run_serve(source, &config, &args).await,
        Commands::Catalog(args) => run_catalog(source.as_ref(), &args).await,
        Commands::Size(args) => run_size(source.as_ref(), &config, &args).await,
    }
}

fn build_source(config: &AppConfig) -> Result<Arc<dyn CatalogSource>> {
    match &config.catalog.file {
        Some(file) => Ok(Arc::new(FileCatalogSource::new(file))),
        None => {
            let client = HttpCatalogClient::new(&config.catalog.base_url, config.timeout())?
                .with_max_pages(config.catalog.max_pages);
            Ok(Arc::new(client))
        }
    }
}

async fn run_serve(
    source: Arc<dyn CatalogSource>,
    config: &AppConfig,
    args: &ServeArgs,
) -> Result<()> {
    let state = AppState::new(source.clone(), config.sizing);

    info!("🔍 Initial catalog load from {}", source.name());
    match source.fetch_catalog().await {
        Ok(fetch) => {
            if fetch.rejected.is_empty() {
                info!("✅ Catalog ready: {} items", fetch.catalog.len());
            } else {
                warn!(
                    "⚠️ Catalog ready: {} items, {} records rejected",
                    fetch.catalog.len(),
                    fetch.rejected.len()
                );
            }
            state.install_catalog(fetch);
        }
        // The server still starts; the storefront can trigger a refresh
        Err(e) => error!("❌ Initial catalog load failed: {e}"),
    }

    let port = args.port.unwrap_or(config.web.port);
    start_web_server(state, port)
        .await
        .map_err(|e| anyhow::anyhow!("Web server failed: {e}"))
}

async fn run_catalog(source: &dyn CatalogSource, args: &CatalogArgs) -> Result<()> {
    let fetch = source.fetch_catalog().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(fetch.catalog.items())?);
        return Ok(());
    }

    println!("{:<6} {:<12} {:<32} {:>10}", "ID", "TYPE", "NAME", "PRICE");
    for item in fetch.catalog.items() {
        println!(
            "{:<6} {:<12} {:<32} {:>10.2}",
            item.id,
            item.kind().to_catalog_value(),
            item.name,
            item.price
        );
    }

    if !fetch.rejected.is_empty() {
        println!();
        println!("{} records rejected:", fetch.rejected.len());
        for reject in &fetch.rejected {
            println!("  - {}: {}", reject.label(), reject.reason);
        }
    }

    Ok(())
}

async fn run_size(source: &dyn CatalogSource, config: &AppConfig, args: &SizeArgs) -> Result<()> {
    let fetch = source.fetch_catalog().await?;
    let catalog = &fetch.catalog;

    let Some(tier) = VoltageTier::for_power(args.power) else {
        anyhow::bail!("{}", SizingAlert::InvalidPower);
    };
    info!("🔍 {} W draw sizes a {} system", args.power, tier);

    let panel = catalog
        .item(args.panel)
        .ok_or_else(|| anyhow::anyhow!("No catalog item with id {}", args.panel))?;
    if !eligible_panels(catalog).iter().any(|item| item.id == args.panel) {
        anyhow::bail!("'{}' is not an eligible panel", panel.name);
    }

    let inverter = catalog
        .item(args.inverter)
        .ok_or_else(|| anyhow::anyhow!("No catalog item with id {}", args.inverter))?;
    if !eligible_inverters(catalog, tier, args.power, &config.sizing)
        .iter()
        .any(|item| item.id == args.inverter)
    {
        anyhow::bail!(
            "'{}' does not fit: a {} inverter rated for at least {:.0} W is required",
            inverter.name,
            tier,
            args.power * config.sizing.inverter_headroom
        );
    }

    let dc_bus_voltage = inverter
        .as_inverter()
        .map_or(0.0, |spec| spec.dc_bus_voltage);
    let battery = catalog
        .item(args.battery)
        .ok_or_else(|| anyhow::anyhow!("No catalog item with id {}", args.battery))?;
    if !eligible_batteries(catalog, dc_bus_voltage)
        .iter()
        .any(|item| item.id == args.battery)
    {
        anyhow::bail!(
            "'{}' does not divide the {} V DC bus into whole strings",
            battery.name,
            dc_bus_voltage
        );
    }

    let mut session = SizingSession::new()
        .apply(SizingEvent::PowerChanged(args.power))
        .apply(SizingEvent::PanelSelected(panel.clone()))
        .apply(SizingEvent::InverterSelected(inverter.clone()))
        .apply(SizingEvent::BatterySelected(battery.clone()))
        .apply(SizingEvent::ParallelStringsChanged(args.parallel))
        .apply(SizingEvent::BackupHoursChanged(args.backup_hours));
    if let Some(count) = args.panel_count {
        session = session.apply(SizingEvent::PanelQuantityChanged(count));
    }

    let summary = session
        .summary(&config.sizing)
        .map_err(|alert| anyhow::anyhow!("{alert}"))?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &SystemSummary) {
    println!();
    println!("System summary");
    println!("==============");
    println!(
        "Panels:          {} pcs, {:.2} total",
        summary.panel_count, summary.panels_cost
    );
    println!("Inverter:        {:.2}", summary.inverter_cost);
    println!(
        "Batteries:       {} pcs ({} series × {} parallel), {:.2} total",
        summary.total_batteries, summary.series_count, summary.parallel_strings,
        summary.batteries_cost
    );
    println!("String capacity: {:.0} Wh", summary.string_capacity_wh);
    println!(
        "Runtime:         {:.2} h per string, {:.2} h total",
        summary.runtime_per_string_hours, summary.total_runtime_hours
    );
    match summary.adjusted_charging_time_hours {
        Some(hours) => println!("Charging time:   {hours:.2} h (including charge overhead)"),
        None => println!("Charging time:   not available"),
    }
    println!("Total cost:      {:.2}", summary.total_cost);

    if summary.runtime_warning {
        println!();
        println!(
            "⚠️  Runtime {:.2} h is below the requested {:.2} h backup window",
            summary.total_runtime_hours, summary.backup_hours
        );
    }
}
