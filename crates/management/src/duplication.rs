//! Bulk duplication: clone a brand/channel cohort into a new date window.
//!
//! The cohort is selected from a caller-supplied snapshot, every record is
//! transformed independently, and all creates are issued concurrently. The
//! batch is not atomic: any subset of writes may fail, and writes already
//! issued are never rolled back. The outcome records each failure so a
//! partial batch is distinguishable from a complete one.

use campaign_core::config::DuplicationConfig;
use campaign_core::error::ensure_date_order;
use campaign_core::{
    derive_status, Campaign, CampaignError, CampaignId, CampaignResult, CampaignStatus,
};
use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::store::CampaignRepository;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where, and with which overrides, a cohort is copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicationTarget {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Replaces every copy's manager when set and non-blank.
    #[serde(default)]
    pub manager: Option<String>,
    /// Replaces every copy's notes when set and non-blank.
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub set_all_to_planned: bool,
    /// Wins over `set_all_to_planned` and the date-derived status.
    #[serde(default)]
    pub custom_status: Option<CampaignStatus>,
}

impl DuplicationTarget {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            manager: None,
            notes: None,
            set_all_to_planned: false,
            custom_status: None,
        }
    }

    /// New records only ever carry a canonical status, so an override
    /// outside the four canonical values is rejected here.
    pub fn validate(&self) -> CampaignResult<()> {
        ensure_date_order(self.start_date, self.end_date)?;
        match &self.custom_status {
            Some(status) if !status.is_canonical() => Err(CampaignError::Validation(format!(
                "custom status '{}' is not a canonical status",
                status
            ))),
            _ => Ok(()),
        }
    }

    /// Status shared by every copy in one batch.
    pub fn resolve_status(&self, today: NaiveDate) -> CampaignStatus {
        derive_status(
            today,
            self.start_date,
            self.end_date,
            self.custom_status.as_ref(),
            self.set_all_to_planned,
        )
    }
}

/// A single create that did not go through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicationFailure {
    pub source_id: Option<CampaignId>,
    pub reason: String,
}

/// Per-record result of one duplication batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicationOutcome {
    pub attempted: usize,
    pub created: Vec<Campaign>,
    pub failures: Vec<DuplicationFailure>,
}

impl DuplicationOutcome {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.created.len() == self.attempted
    }
}

// ---------------------------------------------------------------------------
// DuplicationEngine
// ---------------------------------------------------------------------------

pub struct DuplicationEngine<R: CampaignRepository + ?Sized> {
    repo: Arc<R>,
    copy_suffix: String,
}

impl<R: CampaignRepository + ?Sized> DuplicationEngine<R> {
    pub fn new(repo: Arc<R>, config: &DuplicationConfig) -> Self {
        Self {
            repo,
            copy_suffix: config.copy_suffix.clone(),
        }
    }

    /// Build the copies without writing anything.
    ///
    /// Fails validation on an inverted target window or an empty cohort.
    pub fn plan(
        &self,
        snapshot: &[Campaign],
        brand: &str,
        channel: &str,
        target: &DuplicationTarget,
        today: NaiveDate,
    ) -> CampaignResult<Vec<(Option<CampaignId>, Campaign)>> {
        target.validate()?;

        let cohort: Vec<&Campaign> = snapshot
            .iter()
            .filter(|c| c.brand == brand && c.channel == channel)
            .collect();
        if cohort.is_empty() {
            return Err(CampaignError::EmptyCohort {
                brand: brand.to_string(),
                channel: channel.to_string(),
            });
        }

        let status = target.resolve_status(today);
        Ok(cohort
            .into_iter()
            .map(|source| (source.id, self.copy_of(source, target, &status)))
            .collect())
    }

    /// Duplicate the `brand` + `channel` cohort of `snapshot` into the target
    /// window and persist the copies.
    ///
    /// Returns `Err` without writing for validation failures, and `Err` with
    /// zero created when every write fails. A partial failure is `Ok` with
    /// the failed records listed in the outcome.
    pub async fn duplicate_cohort(
        &self,
        snapshot: &[Campaign],
        brand: &str,
        channel: &str,
        target: &DuplicationTarget,
        today: NaiveDate,
    ) -> CampaignResult<DuplicationOutcome> {
        let copies = self.plan(snapshot, brand, channel, target, today)?;
        let attempted = copies.len();
        info!(
            brand = %brand,
            channel = %channel,
            cohort = attempted,
            start = %target.start_date,
            end = %target.end_date,
            "Duplicating campaign cohort"
        );

        let writes = copies.into_iter().map(|(source_id, copy)| {
            let repo = Arc::clone(&self.repo);
            async move { (source_id, repo.create(copy).await) }
        });
        let results = join_all(writes).await;

        let mut created = Vec::with_capacity(attempted);
        let mut failures = Vec::new();
        for (source_id, result) in results {
            match result {
                Ok(campaign) => created.push(campaign),
                Err(e) => failures.push(DuplicationFailure {
                    source_id,
                    reason: e.to_string(),
                }),
            }
        }

        metrics::counter!("planner.duplication.created").increment(created.len() as u64);
        metrics::counter!("planner.duplication.failed").increment(failures.len() as u64);

        if created.is_empty() {
            let reason = failures
                .first()
                .map(|f| f.reason.clone())
                .unwrap_or_else(|| "no writes completed".to_string());
            error!(
                brand = %brand,
                channel = %channel,
                attempted,
                reason = %reason,
                "Duplication failed"
            );
            return Err(CampaignError::Persistence(format!(
                "0 of {} campaigns created: {}",
                attempted, reason
            )));
        }

        if !failures.is_empty() {
            warn!(
                brand = %brand,
                channel = %channel,
                created = created.len(),
                failed = failures.len(),
                "Duplication partially failed"
            );
        } else {
            info!(
                brand = %brand,
                channel = %channel,
                created = created.len(),
                "Duplication complete"
            );
        }

        Ok(DuplicationOutcome {
            attempted,
            created,
            failures,
        })
    }

    /// Fetch a fresh snapshot from the repository, then duplicate.
    pub async fn duplicate_from_store(
        &self,
        brand: &str,
        channel: &str,
        target: &DuplicationTarget,
        today: NaiveDate,
    ) -> CampaignResult<DuplicationOutcome> {
        let snapshot = self.repo.fetch_all().await?;
        self.duplicate_cohort(&snapshot, brand, channel, target, today)
            .await
    }

    fn copy_of(
        &self,
        source: &Campaign,
        target: &DuplicationTarget,
        status: &CampaignStatus,
    ) -> Campaign {
        let mut copy = source.without_identity();
        copy.start_date = target.start_date;
        copy.end_date = target.end_date;
        copy.status = status.clone();

        if let Some(manager) = non_blank(&target.manager) {
            copy.manager = manager.to_string();
        }
        copy.notes = match non_blank(&target.notes) {
            Some(notes) => notes.to_string(),
            None if source.notes.is_empty() => self.copy_suffix.clone(),
            None => format!("{} {}", source.notes, self.copy_suffix),
        };
        copy
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
