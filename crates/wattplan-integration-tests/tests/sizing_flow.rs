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

use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wattplan_catalog::{CatalogSource, FileCatalogSource, HttpCatalogClient};
use wattplan_core::{
    SizingEvent, SizingSession, VoltageTier, eligible_batteries, eligible_inverters,
    eligible_panels,
};
use wattplan_types::SizingFactors;
use wattplan_web::{AppState, build_router};

fn showroom_catalog() -> serde_json::Value {
    json!([
        {
            "id": 1, "name": "Mono 300W", "price": 100, "type": "solar_panel",
            "specifications": {"output": 300}
        },
        {
            "id": 2, "name": "Hybrid 2kW 24V", "price": 500, "type": "inverter",
            "specifications": {"input": 2000, "DC_volr": 24, "charging_current": 10}
        },
        {
            "id": 3, "name": "Gel 100Ah 12V", "price": 150, "type": "battery",
            "specifications": {"capacity": 100, "voltage": 12}
        },
        {
            "id": 4, "name": "Display dummy panel", "price": 10, "type": "solar_panel",
            "specifications": {"output": 0}
        },
        {
            "id": 5, "name": "Telecom 8V block", "price": 90, "type": "battery",
            "specifications": {"capacity": 200, "voltage": 8}
        }
    ])
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

async fn serve_catalog() -> (mockito::ServerGuard, String) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(mockito::Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(showroom_catalog().to_string())
        .create_async()
        .await;

    let client = HttpCatalogClient::new(&server.url(), Duration::from_secs(5)).unwrap();
    let state = AppState::new(Arc::new(client), SizingFactors::default());
    state.refresh_catalog().await.unwrap();

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (server, format!("http://{addr}"))
}

#[tokio::test]
async fn test_catalog_file_to_summary() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(showroom_catalog().to_string().as_bytes())
        .unwrap();
    file.flush().unwrap();

    let fetch = FileCatalogSource::new(file.path())
        .fetch_catalog()
        .await
        .unwrap();
    let catalog = &fetch.catalog;
    let factors = SizingFactors::default();

    // The zero-output panel and the 8V block drop out of the pick lists
    let panels = eligible_panels(catalog);
    assert_eq!(panels.len(), 1);
    let tier = VoltageTier::for_power(1800.0).unwrap();
    let inverters = eligible_inverters(catalog, tier, 1800.0, &factors);
    assert_eq!(inverters.len(), 1);
    let batteries = eligible_batteries(catalog, 24.0);
    assert_eq!(batteries.len(), 1);
    assert_eq!(batteries[0].id, 3);

    let session = SizingSession::new()
        .apply(SizingEvent::PowerChanged(1000.0))
        .apply(SizingEvent::PanelSelected(panels[0].clone()))
        .apply(SizingEvent::InverterSelected(inverters[0].clone()))
        .apply(SizingEvent::BatterySelected(batteries[0].clone()))
        .apply(SizingEvent::ParallelStringsChanged(2))
        .apply(SizingEvent::BackupHoursChanged(5.0));

    let summary = session.summary(&factors).unwrap();
    assert_eq!(summary.panel_count, 4);
    assert_eq!(summary.panels_cost, 400.0);
    assert_eq!(summary.inverter_cost, 500.0);
    assert_eq!(summary.series_count, 2);
    assert_eq!(summary.total_batteries, 4);
    assert_eq!(summary.batteries_cost, 600.0);
    assert_eq!(summary.string_capacity_wh, 2400.0);
    assert!(close(summary.runtime_per_string_hours, 1.92));
    assert!(close(summary.total_runtime_hours, 3.84));
    assert_eq!(summary.charging_time_hours, Some(10.0));
    assert!(close(summary.adjusted_charging_time_hours.unwrap(), 11.5));
    assert_eq!(summary.total_cost, 1500.0);
    assert!(summary.runtime_warning);

    // Re-running the computation changes nothing
    assert_eq!(session.summary(&factors).unwrap(), summary);
}

#[tokio::test]
async fn test_http_catalog_and_recommendations() {
    let (_upstream, base) = serve_catalog().await;
    let http = reqwest::Client::new();

    let catalog: serde_json::Value = http
        .get(format!("{base}/api/catalog"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog["items"].as_array().unwrap().len(), 5);
    assert_eq!(catalog["pagesFetched"], 1);

    let recommendations: serde_json::Value = http
        .post(format!("{base}/api/recommendations"))
        .json(&json!({"requiredPowerW": 1800.0, "inverterId": 2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(recommendations["voltageTier"], "24V");
    let panels = recommendations["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 1);
    assert_eq!(panels[0]["id"], 1);
    assert_eq!(panels[0]["suggestedQuantity"], 6);
    let inverters = recommendations["inverters"].as_array().unwrap();
    assert_eq!(inverters.len(), 1);
    assert_eq!(inverters[0]["id"], 2);
    let batteries = recommendations["batteries"].as_array().unwrap();
    assert_eq!(batteries.len(), 1);
    assert_eq!(batteries[0]["id"], 3);
}

#[tokio::test]
async fn test_http_summary_math() {
    let (_upstream, base) = serve_catalog().await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{base}/api/summary"))
        .json(&json!({
            "requiredPowerW": 1000.0,
            "panelId": 1,
            "inverterId": 2,
            "batteryId": 3,
            "parallelStrings": 2,
            "backupHours": 5.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["panelCount"], 4);
    assert_eq!(body["panelsCost"], 400.0);
    assert_eq!(body["inverterCost"], 500.0);
    assert_eq!(body["seriesCount"], 2);
    assert_eq!(body["totalBatteries"], 4);
    assert_eq!(body["batteriesCost"], 600.0);
    assert_eq!(body["stringCapacityWh"], 2400.0);
    assert!(close(body["runtimePerStringHours"].as_f64().unwrap(), 1.92));
    assert!(close(body["totalRuntimeHours"].as_f64().unwrap(), 3.84));
    assert_eq!(body["chargingTimeHours"], 10.0);
    assert!(close(
        body["adjustedChargingTimeHours"].as_f64().unwrap(),
        11.5
    ));
    assert_eq!(body["totalCost"], 1500.0);
    assert_eq!(body["backupHours"], 5.0);
    assert_eq!(body["runtimeWarning"], true);
}

#[tokio::test]
async fn test_http_summary_alerts() {
    let (_upstream, base) = serve_catalog().await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{base}/api/summary"))
        .json(&json!({
            "requiredPowerW": 0.0,
            "panelId": 1,
            "inverterId": 2,
            "batteryId": 3
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Enter a valid power greater than zero");

    let response = http
        .post(format!("{base}/api/summary"))
        .json(&json!({
            "requiredPowerW": 1000.0,
            "panelId": 999,
            "inverterId": 2,
            "batteryId": 3
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}
