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

//! Catalog source abstraction
//!
//! The sizing layers work against `CatalogSource`, so the store API can
//! be swapped for a local file during development and testing.

use crate::cancel::CancelToken;
use crate::client::HttpCatalogClient;
use crate::errors::{CatalogError, Result};
use crate::record::{self, CatalogFetch};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tracing::debug;
use wattplan_types::Catalog;

/// Anything that can produce a full equipment catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the complete catalog
    async fn fetch_catalog(&self) -> Result<CatalogFetch>;

    /// Load the catalog, aborting when `token` fires
    ///
    /// Sources without mid-fetch cancellation points only check the
    /// token once at the start.
    async fn fetch_cancellable(&self, token: CancelToken) -> Result<CatalogFetch> {
        if token.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        self.fetch_catalog().await
    }

    /// Check if the source is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Source name for logging
    fn name(&self) -> &str;
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch_catalog(&self) -> Result<CatalogFetch> {
        self.fetch_all().await
    }

    async fn fetch_cancellable(&self, token: CancelToken) -> Result<CatalogFetch> {
        self.fetch_all_cancellable(token).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.ping().await
    }

    fn name(&self) -> &str {
        "store-api"
    }
}

/// Catalog read from a JSON file on disk
///
/// The file holds either a bare array of records or one pagination
/// envelope; either way it counts as a single page.
#[derive(Debug)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch_catalog(&self) -> Result<CatalogFetch> {
        debug!("Reading catalog file {}", self.path.display());
        let fetched_at = Utc::now();
        let body = tokio::fs::read_to_string(&self.path).await?;
        let page = record::parse_body(&body)?;
        let (items, rejected) = record::normalize_records(&page.records);

        Ok(CatalogFetch {
            catalog: Catalog::new(items, fetched_at),
            rejected,
            pages_fetched: 1,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    fn name(&self) -> &str {
        "catalog-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CatalogError;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wattplan_types::EquipmentKind;

    fn write_catalog(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_file_source_bare_array() {
        let file = write_catalog(
            r#"[
                {"id": 1, "name": "Mono 300W", "price": 100,
                 "type": "solar_panel", "specifications": {"output": 300}},
                {"id": 2, "name": "Hybrid 2kW", "price": 500,
                 "type": "inverter",
                 "specifications": {"input": 2000, "DC_volr": 24, "charging_current": 10}}
            ]"#,
        );

        let source = FileCatalogSource::new(file.path());
        let fetch = source.fetch_catalog().await.unwrap();

        assert_eq!(fetch.catalog.len(), 2);
        assert_eq!(fetch.pages_fetched, 1);
        assert_eq!(fetch.catalog.of_kind(EquipmentKind::Inverter).count(), 1);
    }

    #[tokio::test]
    async fn test_file_source_envelope_shape() {
        let file = write_catalog(
            r#"{"data": [
                {"id": 3, "name": "Gel 150Ah", "price": 200,
                 "type": "battery", "specifications": {"capacity": 150, "voltage": 12}}
            ], "meta": {"last_page": 7}}"#,
        );

        let source = FileCatalogSource::new(file.path());
        let fetch = source.fetch_catalog().await.unwrap();

        // A file is one page regardless of what its envelope claims
        assert_eq!(fetch.catalog.len(), 1);
        assert_eq!(fetch.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileCatalogSource::new("/nonexistent/catalog.json");
        let result = source.fetch_catalog().await;
        assert!(matches!(result, Err(CatalogError::File(_))));
        assert!(!source.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_file_source_collects_rejects() {
        let file = write_catalog(r#"[{"id": 1, "name": "Broken"}]"#);
        let fetch = FileCatalogSource::new(file.path())
            .fetch_catalog()
            .await
            .unwrap();
        assert!(fetch.catalog.is_empty());
        assert_eq!(fetch.rejected.len(), 1);
    }

    #[tokio::test]
    async fn test_default_cancellable_checks_token_up_front() {
        let file = write_catalog("[]");
        let source = FileCatalogSource::new(file.path());

        let (handle, token) = crate::cancel::CancelHandle::new();
        handle.cancel();

        let result = source.fetch_cancellable(token).await;
        assert!(matches!(result, Err(CatalogError::Cancelled)));
    }

    #[test]
    fn test_source_names() {
        assert_eq!(FileCatalogSource::new("x.json").name(), "catalog-file");
    }
}
