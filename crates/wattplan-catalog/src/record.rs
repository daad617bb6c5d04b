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

//! Wire shapes and strict record normalization
//!
//! The store API is loosely typed: specification values arrive as numbers
//! or numeric strings depending on how the product was entered in the
//! admin console. Normalization accepts both, and rejects everything else
//! record-by-record so one bad product cannot poison the catalog or slip
//! through as zero-spec equipment.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use wattplan_types::{
    BatterySpec, Catalog, EquipmentItem, EquipmentKind, EquipmentSpec, InverterSpec, PanelSpec,
};

// ============= Response Shapes =============

/// The store returns either a pagination envelope or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    Paged {
        data: Vec<Value>,
        #[serde(default)]
        meta: Option<Value>,
    },
    Bare(Vec<Value>),
}

/// One decoded page, records still unvalidated
#[derive(Debug)]
pub(crate) struct ParsedPage {
    pub records: Vec<Value>,
    pub last_page: Option<u32>,
}

/// Decode one response body into records plus the page count, if the
/// envelope carries one. Bare arrays have no page count.
pub(crate) fn parse_body(body: &str) -> Result<ParsedPage> {
    let response: CatalogResponse = serde_json::from_str(body)?;
    Ok(match response {
        CatalogResponse::Paged { data, meta } => ParsedPage {
            records: data,
            last_page: meta.as_ref().and_then(page_count),
        },
        CatalogResponse::Bare(records) => ParsedPage {
            records,
            last_page: None,
        },
    })
}

/// Extract `meta.last_page`; junk values count as absent, which stops
/// pagination rather than extending it
fn page_count(meta: &Value) -> Option<u32> {
    let n = numeric(meta.get("last_page")?)?;
    if n >= 1.0 && n <= f64::from(u32::MAX) && n.fract() == 0.0 {
        Some(n as u32)
    } else {
        None
    }
}

// ============= Normalization =============

/// A record dropped during normalization, with the reason it was dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Upstream id, when one was readable
    pub id: Option<u64>,
    /// Upstream name, when one was readable
    pub name: Option<String>,
    pub reason: String,
}

impl RejectedRecord {
    /// Short label for log lines
    pub fn label(&self) -> String {
        match (&self.id, &self.name) {
            (Some(id), Some(name)) => format!("record {id} ('{name}')"),
            (Some(id), None) => format!("record {id}"),
            (None, Some(name)) => format!("record '{name}'"),
            (None, None) => "unlabelled record".to_string(),
        }
    }
}

/// Result of one full catalog load
#[derive(Debug, Clone)]
pub struct CatalogFetch {
    pub catalog: Catalog,
    pub rejected: Vec<RejectedRecord>,
    pub pages_fetched: u32,
}

/// Normalize a page of raw records, splitting good items from rejects.
/// Rejects are logged and collected; the load continues.
pub(crate) fn normalize_records(records: &[Value]) -> (Vec<EquipmentItem>, Vec<RejectedRecord>) {
    let mut items = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for value in records {
        match normalize_value(value) {
            Ok(item) => items.push(item),
            Err(reject) => {
                warn!("⚠️ [CATALOG] Skipping {}: {}", reject.label(), reject.reason);
                rejected.push(reject);
            }
        }
    }
    (items, rejected)
}

/// Strictly convert one raw record into a typed catalog item
pub(crate) fn normalize_value(
    value: &Value,
) -> std::result::Result<EquipmentItem, RejectedRecord> {
    let Some(object) = value.as_object() else {
        return Err(RejectedRecord {
            id: None,
            name: None,
            reason: "record is not a JSON object".to_string(),
        });
    };

    // Lenient label fields so rejections stay attributable
    let label_id = object.get("id").and_then(numeric_u64);
    let label_name = object
        .get("name")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let reject = |reason: String| RejectedRecord {
        id: label_id,
        name: label_name.clone(),
        reason,
    };

    let id = object
        .get("id")
        .and_then(numeric_u64)
        .ok_or_else(|| reject("missing or non-integer 'id'".to_string()))?;

    let name = match object.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        Some(_) => return Err(reject("'name' is empty".to_string())),
        None => return Err(reject("missing 'name'".to_string())),
    };

    let price = match object.get("price") {
        Some(value) => checked_amount(value, "price").map_err(&reject)?,
        None => return Err(reject("missing 'price'".to_string())),
    };

    let kind = match object.get("type").and_then(Value::as_str) {
        Some(raw_kind) => raw_kind
            .parse::<EquipmentKind>()
            .map_err(|e| reject(e.to_string()))?,
        None => return Err(reject("missing 'type'".to_string())),
    };

    let Some(spec_map) = object.get("specifications").and_then(Value::as_object) else {
        return Err(reject("'specifications' is missing or not an object".to_string()));
    };

    let spec = match kind {
        EquipmentKind::SolarPanel => EquipmentSpec::SolarPanel(PanelSpec {
            output_w: spec_field(spec_map, "output").map_err(&reject)?,
        }),
        EquipmentKind::Inverter => EquipmentSpec::Inverter(InverterSpec {
            input_w: spec_field(spec_map, "input").map_err(&reject)?,
            dc_bus_voltage: spec_field(spec_map, "DC_volr").map_err(&reject)?,
            charging_current_a: spec_field(spec_map, "charging_current").map_err(&reject)?,
        }),
        EquipmentKind::Battery => EquipmentSpec::Battery(BatterySpec {
            capacity_ah: spec_field(spec_map, "capacity").map_err(&reject)?,
            voltage: spec_field(spec_map, "voltage").map_err(&reject)?,
        }),
    };

    Ok(EquipmentItem {
        id,
        name,
        price,
        spec,
    })
}

/// Accept JSON numbers and numeric strings; everything else is malformed
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

fn numeric_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

fn checked_amount(value: &Value, field: &str) -> std::result::Result<f64, String> {
    let number =
        numeric(value).ok_or_else(|| format!("'{field}' is not numeric (got {value})"))?;
    if !number.is_finite() || number < 0.0 {
        return Err(format!("'{field}' is out of range ({number})"));
    }
    Ok(number)
}

fn spec_field(spec: &Map<String, Value>, field: &str) -> std::result::Result<f64, String> {
    let value = spec
        .get(field)
        .ok_or_else(|| format!("specifications missing '{field}'"))?;
    let number = numeric(value)
        .ok_or_else(|| format!("specifications field '{field}' is not numeric (got {value})"))?;
    if !number.is_finite() || number < 0.0 {
        return Err(format!(
            "specifications field '{field}' is out of range ({number})"
        ));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_paged_envelope() {
        let body = json!({
            "data": [{"id": 1}],
            "meta": {"current_page": 1, "last_page": 3}
        })
        .to_string();
        let page = parse_body(&body).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.last_page, Some(3));
    }

    #[test]
    fn test_parse_bare_array() {
        let page = parse_body(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.last_page, None);
    }

    #[test]
    fn test_parse_envelope_without_meta() {
        let page = parse_body(r#"{"data": []}"#).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.last_page, None);
    }

    #[test]
    fn test_last_page_accepts_numeric_string() {
        let body = json!({"data": [], "meta": {"last_page": "4"}}).to_string();
        assert_eq!(parse_body(&body).unwrap().last_page, Some(4));
    }

    #[test]
    fn test_last_page_junk_treated_as_absent() {
        let body = json!({"data": [], "meta": {"last_page": "lots"}}).to_string();
        assert_eq!(parse_body(&body).unwrap().last_page, None);
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(parse_body("{\"items\": 3}").is_err());
        assert!(parse_body("not json").is_err());
    }

    fn panel_record() -> Value {
        json!({
            "id": 11,
            "name": "Mono 300W",
            "price": 100,
            "type": "solar_panel",
            "specifications": {"output": 300}
        })
    }

    #[test]
    fn test_normalize_panel() {
        let item = normalize_value(&panel_record()).unwrap();
        assert_eq!(item.id, 11);
        assert_eq!(item.kind(), EquipmentKind::SolarPanel);
        assert_eq!(item.as_panel().unwrap().output_w, 300.0);
    }

    #[test]
    fn test_normalize_accepts_numeric_strings() {
        let record = json!({
            "id": "12",
            "name": "Hybrid 2kW",
            "price": "499.90",
            "type": "inverter",
            "specifications": {"input": "2000", "DC_volr": "24", "charging_current": "10"}
        });
        let item = normalize_value(&record).unwrap();
        assert_eq!(item.id, 12);
        assert_eq!(item.price, 499.90);
        let inverter = item.as_inverter().unwrap();
        assert_eq!(inverter.input_w, 2000.0);
        assert_eq!(inverter.dc_bus_voltage, 24.0);
        assert_eq!(inverter.charging_current_a, 10.0);
    }

    #[test]
    fn test_normalize_rejects_junk_spec_value() {
        let mut record = panel_record();
        record["specifications"]["output"] = json!("three hundred");
        let reject = normalize_value(&record).unwrap_err();
        assert_eq!(reject.id, Some(11));
        assert_eq!(reject.name.as_deref(), Some("Mono 300W"));
        assert!(reject.reason.contains("'output'"));
    }

    #[test]
    fn test_normalize_rejects_missing_spec_field() {
        let record = json!({
            "id": 5,
            "name": "Gel 100Ah",
            "price": 150,
            "type": "battery",
            "specifications": {"capacity": 100}
        });
        let reject = normalize_value(&record).unwrap_err();
        assert!(reject.reason.contains("missing 'voltage'"));
    }

    #[test]
    fn test_normalize_rejects_negative_values() {
        let mut record = panel_record();
        record["price"] = json!(-1);
        let reject = normalize_value(&record).unwrap_err();
        assert!(reject.reason.contains("'price'"));
    }

    #[test]
    fn test_normalize_rejects_unknown_kind() {
        let mut record = panel_record();
        record["type"] = json!("windmill");
        let reject = normalize_value(&record).unwrap_err();
        assert!(reject.reason.contains("windmill"));
    }

    #[test]
    fn test_normalize_rejects_non_object_record() {
        let reject = normalize_value(&json!("not a product")).unwrap_err();
        assert_eq!(reject.id, None);
        assert!(reject.reason.contains("not a JSON object"));
    }

    #[test]
    fn test_zero_spec_values_are_kept() {
        // Zero output is eligible-list business, not a data-quality reject
        let mut record = panel_record();
        record["specifications"]["output"] = json!(0);
        let item = normalize_value(&record).unwrap();
        assert_eq!(item.as_panel().unwrap().output_w, 0.0);
    }

    #[test]
    fn test_normalize_records_splits_good_from_bad() {
        let records = vec![panel_record(), json!({"id": 2}), json!(null)];
        let (items, rejected) = normalize_records(&records);
        assert_eq!(items.len(), 1);
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_reject_labels() {
        let both = RejectedRecord {
            id: Some(3),
            name: Some("X".to_string()),
            reason: String::new(),
        };
        assert_eq!(both.label(), "record 3 ('X')");
        let neither = RejectedRecord {
            id: None,
            name: None,
            reason: String::new(),
        };
        assert_eq!(neither.label(), "unlabelled record");
    }
}
