//! # V2 Reporting-API Client
//!
//! The reporting API answers POST queries with either a bare JSON
//! array or a `{results, next_page_url}` envelope. Pages are followed
//! sequentially until `next_page_url` is absent; a continuation URL
//! pointing off the configured host is refused rather than followed.
//!
//! Two reports are consumed: `aged_receivables_detail` (the
//! delinquency rows driving the pipeline) and `tenant_directory` (the
//! reconciliation candidates). The directory query is attempted with
//! three column sets because older report versions name the unit
//! column differently.

use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use latefee_core::model::{de, DelinquencyRow, TenantDirectoryEntry};

use crate::config::V2Config;
use crate::error::ClientError;
use crate::retry::{error_for_status, send_with_retry};

/// Per-attempt request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// One page of a V2 report: either a bare array or the paginated
/// envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum V2Page<T> {
    Rows(Vec<T>),
    Envelope {
        #[serde(default = "Vec::new")]
        results: Vec<T>,
        #[serde(default)]
        next_page_url: Option<String>,
    },
}

impl<T> V2Page<T> {
    fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            Self::Rows(rows) => (rows, None),
            Self::Envelope {
                results,
                next_page_url,
            } => (results, next_page_url),
        }
    }
}

/// Raw aged-receivables record as the report emits it. Currency and
/// identifier columns arrive as number-or-string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AgedReceivablesRecord {
    #[serde(deserialize_with = "de::lenient_string")]
    property_name: String,
    #[serde(deserialize_with = "de::lenient_string")]
    unit_name: String,
    #[serde(deserialize_with = "de::lenient_string")]
    payer_name: String,
    #[serde(deserialize_with = "de::lenient_string")]
    occupancy_id: String,
    #[serde(rename = "0_to30", deserialize_with = "de::lenient_string")]
    zero_to_30: String,
    #[serde(deserialize_with = "de::lenient_string")]
    total_amount: String,
    #[serde(deserialize_with = "de::lenient_string")]
    account_number: String,
    #[serde(deserialize_with = "de::lenient_string")]
    unit_id: String,
    #[serde(deserialize_with = "de::lenient_string")]
    property_id: String,
    #[serde(deserialize_with = "de::lenient_string")]
    posting_date: String,
    #[serde(deserialize_with = "de::lenient_string")]
    invoice_occurred_on: String,
}

/// Client for the V2 reporting API.
#[derive(Debug, Clone)]
pub struct V2Client {
    http: reqwest::Client,
    base: Url,
    user: String,
    pass: String,
    property_ids: Vec<String>,
}

impl V2Client {
    /// Build a client from configuration.
    pub fn new(config: V2Config) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base).map_err(|source| ClientError::InvalidUrl {
            url: config.base.clone(),
            source,
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| ClientError::Http {
                endpoint: config.base.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base,
            user: config.user,
            pass: config.pass,
            property_ids: config.property_ids,
        })
    }

    /// Fetch all delinquency rows as of today, optionally filtered to
    /// one GL account number.
    pub async fn fetch_aged_receivables(
        &self,
        filter_gl_account: &str,
    ) -> Result<Vec<DelinquencyRow>, ClientError> {
        let as_of = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let body = serde_json::json!({
            "occurred_on_to": as_of,
            "property_visibility": "active",
            "tenant_statuses": ["0", "4", "3"],
            "properties": { "properties_ids": self.property_ids },
            "columns": [
                "property_name", "unit_name", "payer_name", "occupancy_id",
                "0_to30", "total_amount", "account_number",
                "unit_id", "property_id", "posting_date", "invoice_occurred_on",
            ],
        });

        let records: Vec<AgedReceivablesRecord> =
            self.collect_all("aged_receivables_detail.json", body).await?;

        let filter = filter_gl_account.trim();
        let rows = records
            .into_iter()
            .filter(|r| filter.is_empty() || r.account_number.trim() == filter)
            .map(|r| DelinquencyRow {
                property_name: r.property_name,
                unit_name: r.unit_name,
                payer_name: r.payer_name,
                occupancy_id: r.occupancy_id,
                zero_to_30_raw: r.zero_to_30,
                total_amount_raw: r.total_amount,
                v2_unit_id: r.unit_id,
                v2_property_id: r.property_id,
                posting_date_raw: r.posting_date,
                charge_date_raw: r.invoice_occurred_on,
            })
            .collect();
        Ok(rows)
    }

    /// Fetch the tenant directory, trying three request bodies in
    /// order (the report's unit column has been renamed across
    /// versions). The last error surfaces only when all three fail.
    pub async fn fetch_tenant_directory(&self) -> Result<Vec<TenantDirectoryEntry>, ClientError> {
        let scope = serde_json::json!({
            "tenant_visibility": "active",
            "tenant_statuses": ["0", "4", "3"],
            "tenant_types": ["all"],
            "property_visibility": "active",
            "properties": { "properties_ids": self.property_ids },
        });

        let mut bodies = vec![scope.clone()];
        for unit_column in ["unit", "unit_name"] {
            let mut body = scope.clone();
            body["columns"] = serde_json::json!([
                "property_name", unit_column, "occupancy_import_uid",
                "tenant_integration_id", "status",
            ]);
            bodies.push(body);
        }

        let mut last_error = None;
        for body in bodies {
            match self.collect_all("tenant_directory.json", body).await {
                Ok(entries) => return Ok(entries),
                Err(e) => {
                    tracing::warn!("tenant directory request variant failed: {e}");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or(ClientError::TaskFailed {
            endpoint: "tenant_directory.json".to_string(),
            reason: "no request variants attempted".to_string(),
        }))
    }

    /// POST `first_body` to `path`, then follow `next_page_url` links
    /// until exhausted, concatenating every page's rows.
    async fn collect_all<T: DeserializeOwned>(
        &self,
        path: &str,
        first_body: serde_json::Value,
    ) -> Result<Vec<T>, ClientError> {
        let first_url = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let (mut rows, mut next) = self.post_page::<T>(&first_url, Some(first_body)).await?;
        while let Some(next_url) = next {
            let url = self.continuation_url(&next_url)?;
            let (page_rows, page_next) = self.post_page::<T>(&url, None).await?;
            rows.extend(page_rows);
            next = page_next;
        }
        Ok(rows)
    }

    async fn post_page<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(Vec<T>, Option<String>), ClientError> {
        let payload = body.unwrap_or_else(|| serde_json::json!({}));
        let resp = send_with_retry(url, || {
            self.http
                .post(url)
                .basic_auth(&self.user, Some(&self.pass))
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&payload)
                .send()
        })
        .await?;
        let resp = error_for_status(url, resp).await?;
        let page: V2Page<T> =
            resp.json()
                .await
                .map_err(|source| ClientError::Deserialization {
                    endpoint: url.to_string(),
                    source,
                })?;
        Ok(page.into_parts())
    }

    /// Resolve a continuation URL. Relative URLs are joined against
    /// the base origin; absolute URLs must stay on the base host.
    fn continuation_url(&self, next: &str) -> Result<String, ClientError> {
        if next.starts_with("http") {
            let parsed = Url::parse(next).map_err(|source| ClientError::InvalidUrl {
                url: next.to_string(),
                source,
            })?;
            if parsed.host_str() != self.base.host_str() || parsed.port() != self.base.port() {
                return Err(ClientError::PaginationHostMismatch {
                    url: next.to_string(),
                });
            }
            return Ok(next.to_string());
        }

        let mut origin = self.base.clone();
        origin.set_path("");
        origin.set_query(None);
        origin
            .join(next)
            .map(|u| u.to_string())
            .map_err(|source| ClientError::InvalidUrl {
                url: next.to_string(),
                source,
            })
    }
}
