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

//! HTTP client for the equipment store API
//!
//! Walks the store's paginated product listing one page at a time,
//! normalizing records as they arrive. A fetch either returns the full
//! catalog or a single error; there is no partial-success retry loop.

use crate::cancel::{CancelHandle, CancelToken};
use crate::errors::{CatalogError, Result};
use crate::record::{self, CatalogFetch, ParsedPage};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use wattplan_types::Catalog;

/// Hard ceiling on pages walked in one fetch, so a misbehaving
/// `last_page` cannot keep the loop alive forever
const DEFAULT_MAX_PAGES: u32 = 50;

/// Client for the store's equipment listing endpoint
#[derive(Debug)]
pub struct HttpCatalogClient {
    base_url: String,
    client: reqwest::Client,
    max_pages: u32,
}

impl HttpCatalogClient {
    /// Create a new catalog client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::ClientBuild(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Override the pagination ceiling
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Load the whole catalog, following pagination to the end
    ///
    /// # Errors
    ///
    /// Returns an error when any page fails to download or decode.
    pub async fn fetch_all(&self) -> Result<CatalogFetch> {
        let (_handle, token) = CancelHandle::new();
        self.fetch_all_cancellable(token).await
    }

    /// Load the whole catalog, aborting as soon as `token` is cancelled
    ///
    /// Cancellation is checked between pages and raced against the
    /// in-flight request, so a stale fetch stops without waiting for
    /// its timeout.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Cancelled` when the token fires, or the
    /// download/decode error of the failing page.
    pub async fn fetch_all_cancellable(&self, mut token: CancelToken) -> Result<CatalogFetch> {
        let started_at = Utc::now();
        let mut items = Vec::new();
        let mut rejected = Vec::new();
        let mut page: u32 = 1;

        loop {
            if token.is_cancelled() {
                return Err(CatalogError::Cancelled);
            }

            let body = tokio::select! {
                () = token.cancelled() => return Err(CatalogError::Cancelled),
                result = self.download_page(page) => result?,
            };

            let ParsedPage { records, last_page } = record::parse_body(&body)?;
            let (page_items, page_rejected) = record::normalize_records(&records);
            items.extend(page_items);
            rejected.extend(page_rejected);

            match last_page {
                Some(last) if page < last => {
                    if page >= self.max_pages {
                        warn!(
                            "⚠️ [CATALOG] Stopping after {} pages, store reports {} total",
                            page, last
                        );
                        break;
                    }
                    page += 1;
                }
                Some(_) | None => break,
            }
        }

        info!(
            "✅ [CATALOG] Loaded {} items across {} pages ({} rejected)",
            items.len(),
            page,
            rejected.len()
        );

        Ok(CatalogFetch {
            catalog: Catalog::new(items, started_at),
            rejected,
            pages_fetched: page,
        })
    }

    /// Download one page of the listing as raw text
    async fn download_page(&self, page: u32) -> Result<String> {
        let url = format!("{}?page={}", self.base_url, page);
        debug!("Downloading catalog page {} from {}", page, url);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            reqwest::StatusCode::OK => Ok(response.text().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                error!(
                    "❌ [CATALOG] Store API returned {} for page {}: {}",
                    status, page, body
                );
                Err(CatalogError::Api {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Cheap reachability probe against the first listing page
    pub(crate) async fn ping(&self) -> Result<bool> {
        let url = format!("{}?page=1", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                debug!("Store API ping failed: {}", e);
                Ok(false)
            }
        }
    }
}
