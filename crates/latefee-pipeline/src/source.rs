//! # Charge Data Source
//!
//! The pipeline's seam over the two external APIs. The orchestrator
//! depends on this trait, not on the HTTP clients, so its sequencing
//! and failure handling are testable without a network.

use latefee_client::{V0Client, V2Client};
use latefee_core::model::{BulkChargeItem, DelinquencyRow, TenantDirectoryEntry, V0Tenant};

/// Everything the orchestrator needs from the outside world.
#[allow(async_fn_in_trait)]
pub trait ChargeSource {
    /// Fetch the delinquency rows driving the run.
    async fn fetch_delinquencies(&self) -> anyhow::Result<Vec<DelinquencyRow>>;

    /// Fetch the reporting-side tenant directory.
    async fn fetch_tenant_directory(&self) -> anyhow::Result<Vec<TenantDirectoryEntry>>;

    /// Fetch transactional tenants; `wide` selects the broader
    /// lookback window for the widen-retry pass.
    async fn fetch_v0_tenants(&self, wide: bool) -> anyhow::Result<Vec<V0Tenant>>;

    /// Submit the bulk charge payload, returning the submitted count.
    async fn submit_bulk(&self, items: Vec<BulkChargeItem>) -> anyhow::Result<usize>;
}

/// Production [`ChargeSource`] over the real API clients.
#[derive(Debug, Clone)]
pub struct HttpChargeSource {
    v2: V2Client,
    v0: V0Client,
    /// GL account filter applied to the aged-receivables query
    /// (empty = no filtering).
    filter_gl_account: String,
}

impl HttpChargeSource {
    pub fn new(v2: V2Client, v0: V0Client, filter_gl_account: String) -> Self {
        Self {
            v2,
            v0,
            filter_gl_account,
        }
    }
}

impl ChargeSource for HttpChargeSource {
    async fn fetch_delinquencies(&self) -> anyhow::Result<Vec<DelinquencyRow>> {
        self.v2
            .fetch_aged_receivables(&self.filter_gl_account)
            .await
            .map_err(anyhow::Error::from)
    }

    async fn fetch_tenant_directory(&self) -> anyhow::Result<Vec<TenantDirectoryEntry>> {
        self.v2
            .fetch_tenant_directory()
            .await
            .map_err(anyhow::Error::from)
    }

    async fn fetch_v0_tenants(&self, wide: bool) -> anyhow::Result<Vec<V0Tenant>> {
        self.v0
            .fetch_tenants(wide)
            .await
            .map_err(anyhow::Error::from)
    }

    async fn submit_bulk(&self, items: Vec<BulkChargeItem>) -> anyhow::Result<usize> {
        self.v0
            .submit_bulk_charges(&items)
            .await
            .map_err(anyhow::Error::from)
    }
}
