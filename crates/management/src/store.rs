//! Campaign repository seam and an in-memory store backed by DashMap.
//!
//! The document store that owns campaign records sits behind
//! [`CampaignRepository`]. Engines never hold a live reference to it: they
//! receive a snapshot from `fetch_all` and write back through `create` /
//! `update`. Visibility of writes is eventually consistent, so callers
//! re-fetch rather than assume a previous snapshot is current.

use async_trait::async_trait;
use campaign_core::{Campaign, CampaignError, CampaignId, CampaignPatch, CampaignResult};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use uuid::Uuid;

/// Keyed collection of campaign records owned by the persistence layer.
///
/// Implementations assign identity and audit timestamps on `create`. Calls
/// may run concurrently and complete in any order; nothing here is
/// transactional across calls.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Full current snapshot, newest first.
    async fn fetch_all(&self) -> CampaignResult<Vec<Campaign>>;

    /// Persist a new record and return it with `id`, `created_at` and
    /// `updated_at` filled in.
    async fn create(&self, campaign: Campaign) -> CampaignResult<Campaign>;

    /// Apply a partial update, re-validating the date invariant.
    async fn update(&self, id: CampaignId, patch: CampaignPatch) -> CampaignResult<Campaign>;

    async fn delete(&self, id: CampaignId) -> CampaignResult<()>;
}

/// Thread-safe in-memory campaign store.
pub struct InMemoryCampaignStore {
    /// id -> (insertion sequence, record)
    campaigns: DashMap<Uuid, (u64, Campaign)>,
    sequence: AtomicU64,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self {
            campaigns: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Seed a store from an existing snapshot. Records without an id get
    /// one; existing ids and timestamps are kept. Later entries count as
    /// newer.
    pub fn from_snapshot(snapshot: Vec<Campaign>) -> CampaignResult<Self> {
        let store = Self::new();
        for mut campaign in snapshot {
            campaign.validate()?;
            let id = *campaign.id.get_or_insert_with(Uuid::new_v4);
            if store.campaigns.contains_key(&id) {
                return Err(CampaignError::DataShape(format!(
                    "duplicate campaign id {}",
                    id
                )));
            }
            let seq = store.next_sequence();
            store.campaigns.insert(id, (seq, campaign));
        }
        info!(count = store.len(), "Campaign store seeded from snapshot");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    pub fn get(&self, id: &CampaignId) -> Option<Campaign> {
        self.campaigns.get(id).map(|r| r.value().1.clone())
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryCampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignStore {
    async fn fetch_all(&self) -> CampaignResult<Vec<Campaign>> {
        let mut entries: Vec<(u64, Campaign)> =
            self.campaigns.iter().map(|r| r.value().clone()).collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries.into_iter().map(|(_, c)| c).collect())
    }

    async fn create(&self, mut campaign: Campaign) -> CampaignResult<Campaign> {
        if let Some(id) = campaign.id {
            return Err(CampaignError::Validation(format!(
                "campaign {} is already persisted",
                id
            )));
        }
        campaign.validate()?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        campaign.id = Some(id);
        campaign.created_at = Some(now);
        campaign.updated_at = Some(now);

        let seq = self.next_sequence();
        self.campaigns.insert(id, (seq, campaign.clone()));
        debug!(
            campaign_id = %id,
            brand = %campaign.brand,
            channel = %campaign.channel,
            "Campaign created"
        );
        Ok(campaign)
    }

    async fn update(&self, id: CampaignId, patch: CampaignPatch) -> CampaignResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| CampaignError::NotFound(id.to_string()))?;
        let campaign = &mut entry.value_mut().1;
        campaign.apply_patch(&patch)?;
        campaign.updated_at = Some(Utc::now());
        debug!(campaign_id = %id, "Campaign updated");
        Ok(campaign.clone())
    }

    async fn delete(&self, id: CampaignId) -> CampaignResult<()> {
        self.campaigns
            .remove(&id)
            .map(|_| debug!(campaign_id = %id, "Campaign deleted"))
            .ok_or_else(|| CampaignError::NotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
