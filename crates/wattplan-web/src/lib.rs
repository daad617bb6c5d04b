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

//! JSON API for the sizing storefront
//!
//! Serves the catalog snapshot and runs sizing requests against it.
//! The catalog lives in shared state; reads never block on a refresh,
//! and a new refresh cancels the one still in flight.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use wattplan_catalog::{CancelHandle, CatalogError, CatalogFetch, CatalogSource, RejectedRecord};
use wattplan_core::{
    SizingEvent, SizingSession, SystemSummary, VoltageTier, eligible_batteries,
    eligible_inverters, eligible_panels, suggested_panel_count,
};
use wattplan_types::{Catalog, EquipmentItem, EquipmentKind, SizingFactors};

/// Application state for web handlers
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn CatalogSource>,
    catalog: Arc<RwLock<Option<Arc<CatalogFetch>>>>,
    refresh: Arc<Mutex<Option<CancelHandle>>>,
    factors: SizingFactors,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("source", &self.source.name())
            .field("factors", &self.factors)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(source: Arc<dyn CatalogSource>, factors: SizingFactors) -> Self {
        Self {
            source,
            catalog: Arc::new(RwLock::new(None)),
            refresh: Arc::new(Mutex::new(None)),
            factors,
        }
    }

    /// Current catalog snapshot, if one has been loaded
    pub fn catalog(&self) -> Option<Arc<CatalogFetch>> {
        self.catalog.read().clone()
    }

    pub fn factors(&self) -> &SizingFactors {
        &self.factors
    }

    /// Store a snapshot loaded outside the refresh path
    pub fn install_catalog(&self, fetch: CatalogFetch) {
        *self.catalog.write() = Some(Arc::new(fetch));
    }

    /// Reload the catalog from the source
    ///
    /// Any refresh still in flight is cancelled first; the newest
    /// request always wins. The stored snapshot is only replaced on
    /// success.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, `CatalogError::Cancelled` when a newer
    /// refresh superseded this one.
    pub async fn refresh_catalog(&self) -> wattplan_catalog::Result<Arc<CatalogFetch>> {
        let token = {
            let mut slot = self.refresh.lock();
            if let Some(previous) = slot.take() {
                previous.cancel();
            }
            let (handle, token) = CancelHandle::new();
            *slot = Some(handle);
            token
        };

        let fetch = Arc::new(self.source.fetch_cancellable(token).await?);
        *self.catalog.write() = Some(fetch.clone());
        Ok(fetch)
    }
}

/// Start the web server
///
/// # Errors
/// Returns error if server fails to bind or serve
pub async fn start_web_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    info!("🌐 Starting web server on {addr}");
    info!("📱 Storefront API base: http://localhost:{}/api/", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/catalog/refresh", post(refresh_catalog_handler))
        .route("/api/recommendations", post(recommendations_handler))
        .route("/api/summary", post(summary_handler))
        .layer(CorsLayer::permissive()) // Storefront runs on its own origin
        .with_state(state)
}

// ============= JSON Payloads =============

/// Catalog item as served to the storefront
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentJson {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dc_bus_voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_current_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_ah: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_quantity: Option<u32>,
}

impl EquipmentJson {
    fn from_item(item: &EquipmentItem) -> Self {
        let mut json = Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            kind: item.kind().to_catalog_value().to_string(),
            output_w: None,
            input_w: None,
            dc_bus_voltage: None,
            charging_current_a: None,
            capacity_ah: None,
            voltage: None,
            suggested_quantity: None,
        };
        if let Some(panel) = item.as_panel() {
            json.output_w = Some(panel.output_w);
        }
        if let Some(inverter) = item.as_inverter() {
            json.input_w = Some(inverter.input_w);
            json.dc_bus_voltage = Some(inverter.dc_bus_voltage);
            json.charging_current_a = Some(inverter.charging_current_a);
        }
        if let Some(battery) = item.as_battery() {
            json.capacity_ah = Some(battery.capacity_ah);
            json.voltage = Some(battery.voltage);
        }
        json
    }

    fn with_suggested_quantity(mut self, quantity: u32) -> Self {
        self.suggested_quantity = Some(quantity);
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogJson {
    pub items: Vec<EquipmentJson>,
    pub fetched_at: DateTime<Utc>,
    pub pages_fetched: u32,
    pub rejected: Vec<RejectedRecord>,
}

impl CatalogJson {
    fn from_fetch(fetch: &CatalogFetch) -> Self {
        Self {
            items: fetch.catalog.items().iter().map(EquipmentJson::from_item).collect(),
            fetched_at: fetch.catalog.fetched_at,
            pages_fetched: fetch.pages_fetched,
            rejected: fetch.rejected.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub required_power_w: f64,
    /// When set, batteries compatible with this inverter are included
    #[serde(default)]
    pub inverter_id: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsJson {
    pub voltage_tier: Option<VoltageTier>,
    pub panels: Vec<EquipmentJson>,
    pub inverters: Vec<EquipmentJson>,
    pub batteries: Vec<EquipmentJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub required_power_w: f64,
    pub panel_id: u64,
    /// Overrides the suggested panel count when set
    #[serde(default)]
    pub panel_quantity: Option<u32>,
    pub inverter_id: u64,
    pub battery_id: u64,
    #[serde(default)]
    pub parallel_strings: Option<u32>,
    #[serde(default)]
    pub backup_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryJson {
    pub required_power_w: f64,
    pub panel_count: u32,
    pub panels_cost: f64,
    pub inverter_cost: f64,
    pub series_count: u32,
    pub parallel_strings: u32,
    pub total_batteries: u32,
    pub batteries_cost: f64,
    pub string_capacity_wh: f64,
    pub runtime_per_string_hours: f64,
    pub total_runtime_hours: f64,
    pub charging_time_hours: Option<f64>,
    pub adjusted_charging_time_hours: Option<f64>,
    pub total_cost: f64,
    pub backup_hours: f64,
    pub runtime_warning: bool,
}

impl SummaryJson {
    fn from_summary(summary: &SystemSummary) -> Self {
        Self {
            required_power_w: summary.required_power_w,
            panel_count: summary.panel_count,
            panels_cost: summary.panels_cost,
            inverter_cost: summary.inverter_cost,
            series_count: summary.series_count,
            parallel_strings: summary.parallel_strings,
            total_batteries: summary.total_batteries,
            batteries_cost: summary.batteries_cost,
            string_capacity_wh: summary.string_capacity_wh,
            runtime_per_string_hours: summary.runtime_per_string_hours,
            total_runtime_hours: summary.total_runtime_hours,
            charging_time_hours: summary.charging_time_hours,
            adjusted_charging_time_hours: summary.adjusted_charging_time_hours,
            total_cost: summary.total_cost,
            backup_hours: summary.backup_hours,
            runtime_warning: summary.runtime_warning,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub error: String,
}

// ============= Handlers =============

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.source.health_check().await {
        Ok(true) => (axum::http::StatusCode::OK, "OK"),
        Ok(false) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "DEGRADED"),
        Err(_) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "ERROR"),
    }
}

async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog() {
        Some(fetch) => Json(CatalogJson::from_fetch(&fetch)).into_response(),
        None => catalog_unavailable(),
    }
}

async fn refresh_catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("🛒 Catalog refresh requested");
    match state.refresh_catalog().await {
        Ok(fetch) => Json(CatalogJson::from_fetch(&fetch)).into_response(),
        Err(CatalogError::Cancelled) => (
            axum::http::StatusCode::CONFLICT,
            Json(ErrorJson {
                error: "Catalog refresh superseded by a newer request".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("❌ Catalog refresh failed: {e}");
            (
                axum::http::StatusCode::BAD_GATEWAY,
                Json(ErrorJson {
                    error: format!("Could not load the equipment catalog: {e}"),
                }),
            )
                .into_response()
        }
    }
}

async fn recommendations_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> impl IntoResponse {
    let Some(fetch) = state.catalog() else {
        return catalog_unavailable();
    };
    let catalog = &fetch.catalog;
    let tier = VoltageTier::for_power(request.required_power_w);

    let panels = eligible_panels(catalog)
        .into_iter()
        .map(|item| {
            let output_w = item.as_panel().map_or(0.0, |panel| panel.output_w);
            EquipmentJson::from_item(item).with_suggested_quantity(suggested_panel_count(
                request.required_power_w,
                output_w,
            ))
        })
        .collect();

    let inverters = tier
        .map(|tier| {
            eligible_inverters(catalog, tier, request.required_power_w, state.factors())
                .into_iter()
                .map(EquipmentJson::from_item)
                .collect()
        })
        .unwrap_or_default();

    let batteries = match request.inverter_id {
        Some(id) => {
            let inverter_item = match find_item(catalog, id, EquipmentKind::Inverter) {
                Ok(item) => item,
                Err(message) => return unprocessable(message),
            };
            let dc_bus_voltage = inverter_item
                .as_inverter()
                .map_or(0.0, |inverter| inverter.dc_bus_voltage);
            eligible_batteries(catalog, dc_bus_voltage)
                .into_iter()
                .map(EquipmentJson::from_item)
                .collect()
        }
        None => Vec::new(),
    };

    Json(RecommendationsJson {
        voltage_tier: tier,
        panels,
        inverters,
        batteries,
    })
    .into_response()
}

async fn summary_handler(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> impl IntoResponse {
    let Some(fetch) = state.catalog() else {
        return catalog_unavailable();
    };
    let catalog = &fetch.catalog;

    let panel = match find_item(catalog, request.panel_id, EquipmentKind::SolarPanel) {
        Ok(item) => item,
        Err(message) => return unprocessable(message),
    };
    let inverter = match find_item(catalog, request.inverter_id, EquipmentKind::Inverter) {
        Ok(item) => item,
        Err(message) => return unprocessable(message),
    };
    let battery = match find_item(catalog, request.battery_id, EquipmentKind::Battery) {
        Ok(item) => item,
        Err(message) => return unprocessable(message),
    };

    let mut session = SizingSession::new()
        .apply(SizingEvent::PowerChanged(request.required_power_w))
        .apply(SizingEvent::PanelSelected(panel.clone()))
        .apply(SizingEvent::InverterSelected(inverter.clone()))
        .apply(SizingEvent::BatterySelected(battery.clone()));
    if let Some(quantity) = request.panel_quantity {
        session = session.apply(SizingEvent::PanelQuantityChanged(quantity));
    }
    if let Some(strings) = request.parallel_strings {
        session = session.apply(SizingEvent::ParallelStringsChanged(strings));
    }
    if let Some(hours) = request.backup_hours {
        session = session.apply(SizingEvent::BackupHoursChanged(hours));
    }

    match session.summary(state.factors()) {
        Ok(summary) => Json(SummaryJson::from_summary(&summary)).into_response(),
        Err(alert) => unprocessable(alert.to_string()),
    }
}

fn find_item<'a>(
    catalog: &'a Catalog,
    id: u64,
    kind: EquipmentKind,
) -> Result<&'a EquipmentItem, String> {
    let item = catalog
        .item(id)
        .ok_or_else(|| format!("Unknown catalog id {id}"))?;
    if item.kind() != kind {
        return Err(format!("Item {id} is not a {}", kind.display_name()));
    }
    Ok(item)
}

fn catalog_unavailable() -> Response {
    (
        axum::http::StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorJson {
            error: "Catalog not loaded yet".to_string(),
        }),
    )
        .into_response()
}

fn unprocessable(message: String) -> Response {
    (
        axum::http::StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorJson { error: message }),
    )
        .into_response()
}
