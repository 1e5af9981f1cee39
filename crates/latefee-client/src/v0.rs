//! # V0 Transactional-API Client
//!
//! The transactional API is queried with `page[number]`/`page[size]`
//! parameters and answers `{data: [...]}`; a short page ends the
//! query. Tenant queries are scoped by property ID and must stay
//! bounded, so the configured property list is split into fixed-size
//! batches fetched with a bounded fan-out.
//!
//! This client also carries the bulk charge submission: one POST with
//! the full item array. Submission is not idempotent across retried
//! pipeline runs — each item's reference ID is fresh per run.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use latefee_core::model::{BulkChargeItem, V0Tenant};
use latefee_core::normalize::iso_days_ago;

use crate::config::V0Config;
use crate::error::ClientError;
use crate::retry::{error_for_status, send_with_retry};

/// Per-attempt request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Rows requested per page.
const PAGE_SIZE: usize = 1000;

/// Property IDs per tenant-query batch (keeps the filter parameter
/// bounded).
const BATCH_SIZE: usize = 20;

/// Concurrent batch fetches in flight at once.
const FAN_OUT: usize = 5;

/// Tenant lookback window, in days, for the first resolution pass.
const LOOKBACK_DAYS: i64 = 365;

/// Widened lookback window for the retry pass.
const WIDE_LOOKBACK_DAYS: i64 = 1825;

#[derive(Debug, Deserialize)]
struct V0Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Client for the V0 transactional API.
#[derive(Debug, Clone)]
pub struct V0Client {
    http: reqwest::Client,
    base: String,
    dev_id: String,
    client_id: String,
    client_secret: String,
    property_ids: Vec<String>,
    page_size: usize,
}

impl V0Client {
    /// Build a client from configuration.
    pub fn new(config: V0Config) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| ClientError::Http {
                endpoint: config.base.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base: config.base,
            dev_id: config.dev_id,
            client_id: config.client_id,
            client_secret: config.client_secret,
            property_ids: config.property_ids,
            page_size: PAGE_SIZE,
        })
    }

    /// Override the page size (test hook; production uses 1000).
    #[doc(hidden)]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fetch tenants across all configured properties.
    ///
    /// `wide` selects the broader lookback window used by the
    /// pipeline's widen-retry pass.
    pub async fn fetch_tenants(&self, wide: bool) -> Result<Vec<V0Tenant>, ClientError> {
        let lookback = if wide { WIDE_LOOKBACK_DAYS } else { LOOKBACK_DAYS };
        let base_filters = vec![
            ("filters[Status]".to_string(), "Current,Notice,Evict".to_string()),
            ("filters[IncludeUnassigned]".to_string(), "false".to_string()),
            (
                "filters[LastUpdatedAtFrom]".to_string(),
                iso_days_ago(lookback, Utc::now()),
            ),
        ];
        self.fetch_tenants_batched(&base_filters).await
    }

    /// Fetch tenants in property-ID batches with bounded concurrency,
    /// deduplicating by tenant ID (batches can overlap when a tenant
    /// moved between properties).
    async fn fetch_tenants_batched(
        &self,
        base_filters: &[(String, String)],
    ) -> Result<Vec<V0Tenant>, ClientError> {
        let batches: Vec<Vec<String>> = self
            .property_ids
            .chunks(BATCH_SIZE)
            .map(|c| c.to_vec())
            .collect();

        let mut all: Vec<V0Tenant> = Vec::new();
        for group in batches.chunks(FAN_OUT) {
            let mut handles = Vec::with_capacity(group.len());
            for batch in group {
                let client = self.clone();
                let mut query = base_filters.to_vec();
                query.push(("filters[PropertyId]".to_string(), batch.join(",")));
                handles.push(tokio::spawn(async move {
                    client.fetch_all_pages::<V0Tenant>("tenants", &query).await
                }));
            }
            // Await in spawn order so batch results land
            // deterministically; the first failure aborts the fetch.
            for handle in handles {
                let page = handle.await.map_err(|e| ClientError::TaskFailed {
                    endpoint: "tenants".to_string(),
                    reason: e.to_string(),
                })??;
                all.extend(page);
            }
        }

        let mut seen = HashSet::new();
        Ok(all
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect())
    }

    /// Submit the bulk charge payload. No-op (0 submitted, no network
    /// call) when the item list is empty.
    pub async fn submit_bulk_charges(&self, items: &[BulkChargeItem]) -> Result<usize, ClientError> {
        if items.is_empty() {
            return Ok(0);
        }

        let url = format!("{}/charges/bulk", self.base);
        let payload = serde_json::json!({ "data": items });
        let resp = send_with_retry(&url, || {
            self.http
                .post(&url)
                .basic_auth(&self.client_id, Some(&self.client_secret))
                .header("X-AppFolio-Developer-ID", &self.dev_id)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&payload)
                .send()
        })
        .await?;
        error_for_status(&url, resp).await?;
        Ok(items.len())
    }

    /// GET every page of `path` with the given query, following
    /// `page[number]` until a short page.
    async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        base_query: &[(String, String)],
    ) -> Result<Vec<T>, ClientError> {
        let url = format!("{}/{}", self.base, path);
        let mut all = Vec::new();
        let mut page_number = 1usize;

        loop {
            let mut query = base_query.to_vec();
            query.push(("page[number]".to_string(), page_number.to_string()));
            query.push(("page[size]".to_string(), self.page_size.to_string()));

            let resp = send_with_retry(&url, || {
                self.http
                    .get(&url)
                    .query(&query)
                    .basic_auth(&self.client_id, Some(&self.client_secret))
                    .header("X-AppFolio-Developer-ID", &self.dev_id)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
            })
            .await?;
            let resp = error_for_status(&url, resp).await?;
            let page: V0Page<T> =
                resp.json()
                    .await
                    .map_err(|source| ClientError::Deserialization {
                        endpoint: url.clone(),
                        source,
                    })?;

            let len = page.data.len();
            all.extend(page.data);
            if len < self.page_size {
                break;
            }
            page_number += 1;
        }

        Ok(all)
    }
}
