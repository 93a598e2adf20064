//! Lead Repository
//!
//! Tenant-scoped access to the `clients` table. The board only ever reads
//! the open leads and writes a single field (`status`).

use async_trait::async_trait;
use serde_json::json;

use super::client::{single, ScopedClient};
use crate::error::ApiResult;
use crate::models::{Lead, LeadRow, LeadStatus, LEAD_COLUMNS};

const TABLE: &str = "clients";

/// Data access used by the board engine.
///
/// `?Send`: implementations live on the browser's single thread.
#[async_trait(?Send)]
pub trait LeadRepository {
    /// Open leads of the tenant (everything not yet `contacted`), up to `limit`
    async fn fetch_leads(&self, limit: usize) -> ApiResult<Vec<Lead>>;

    /// Write `status` and return the record as stored
    async fn update_lead_status(&self, lead_id: &str, status: LeadStatus) -> ApiResult<Lead>;
}

/// [`LeadRepository`] over the hosted data store
#[derive(Clone, Debug)]
pub struct SupabaseLeads {
    client: ScopedClient,
}

impl SupabaseLeads {
    pub fn new(client: ScopedClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl LeadRepository for SupabaseLeads {
    async fn fetch_leads(&self, limit: usize) -> ApiResult<Vec<Lead>> {
        let query = self
            .client
            .scoped(TABLE)
            .select(LEAD_COLUMNS)
            .neq("status", LeadStatus::Contacted.as_str())
            .range(0, limit.saturating_sub(1));
        let rows: Vec<LeadRow> = self.client.rest().select(self.client.token(), &query).await?;
        log::info!("[LEADS] fetched {} leads", rows.len());
        Ok(rows.into_iter().map(Lead::from).collect())
    }

    async fn update_lead_status(&self, lead_id: &str, status: LeadStatus) -> ApiResult<Lead> {
        let query = self
            .client
            .scoped(TABLE)
            .eq("remotejid", lead_id)
            .select(LEAD_COLUMNS);
        let rows: Vec<LeadRow> = self
            .client
            .rest()
            .update(self.client.token(), &query, &json!({ "status": status.as_str() }))
            .await?;
        let lead = Lead::from(single(rows)?);
        log::info!("[LEADS] {} -> {}", lead_id, lead.status);
        Ok(lead)
    }
}
