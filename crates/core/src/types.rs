use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ensure_date_order, CampaignError, CampaignResult};
use crate::status::CampaignStatus;
use crate::timestamp;

pub type CampaignId = Uuid;

/// Channel-specific optional metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KpiKey {
    ExpectedGrps,
    AchievedGrps,
    SpotsPurchased,
    Impressions,
    ExpectedViewers,
    ExpectedViews,
}

impl KpiKey {
    pub const ALL: [KpiKey; 6] = [
        KpiKey::ExpectedGrps,
        KpiKey::AchievedGrps,
        KpiKey::SpotsPurchased,
        KpiKey::Impressions,
        KpiKey::ExpectedViewers,
        KpiKey::ExpectedViews,
    ];
}

/// One marketing campaign: a brand on a channel in a region for a date window.
///
/// `id`, `created_at` and `updated_at` belong to the persistence layer and
/// stay `None` on records that have not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CampaignId>,
    pub brand: String,
    pub channel: String,
    #[serde(default)]
    pub region: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Descriptive only; period matching never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_type: Option<String>,

    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub leads: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_lead: Option<f64>,
    /// Percentage-formatted, e.g. `"12.5%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<String>,
    #[serde(default)]
    pub status: CampaignStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_grps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_grps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spots_purchased: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_viewers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_views: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_social_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_social_notes: Option<String>,

    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// A planned, unpersisted campaign with every optional field empty.
    pub fn new(
        brand: impl Into<String>,
        channel: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            brand: brand.into(),
            channel: channel.into(),
            region: String::new(),
            start_date,
            end_date,
            period_type: None,
            budget: 0.0,
            leads: 0,
            cost_per_lead: None,
            roi: None,
            status: CampaignStatus::Planned,
            expected_grps: None,
            achieved_grps: None,
            spots_purchased: None,
            impressions: None,
            expected_viewers: None,
            expected_views: None,
            extra_social_budget: None,
            extra_social_notes: None,
            manager: String::new(),
            notes: String::new(),
            publisher: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Check the record-level invariants: ordered dates and non-negative,
    /// finite economics.
    pub fn validate(&self) -> CampaignResult<()> {
        if self.start_date > self.end_date {
            return Err(CampaignError::DataShape(format!(
                "campaign {} ends ({}) before it starts ({})",
                self.label(),
                self.end_date,
                self.start_date
            )));
        }
        let amounts = [
            ("budget", Some(self.budget)),
            ("costPerLead", self.cost_per_lead),
            ("expectedGrps", self.expected_grps),
            ("achievedGrps", self.achieved_grps),
            ("extraSocialBudget", self.extra_social_budget),
        ];
        for (field, value) in amounts {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CampaignError::DataShape(format!(
                        "campaign {} has invalid {}: {}",
                        self.label(),
                        field,
                        v
                    )));
                }
            }
        }
        Ok(())
    }

    /// Human-readable identifier for logs and alert messages.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("{} / {} ({})", self.brand, self.channel, id),
            None => format!("{} / {}", self.brand, self.channel),
        }
    }

    pub fn metric(&self, key: KpiKey) -> Option<f64> {
        match key {
            KpiKey::ExpectedGrps => self.expected_grps,
            KpiKey::AchievedGrps => self.achieved_grps,
            KpiKey::SpotsPurchased => self.spots_purchased.map(|v| v as f64),
            KpiKey::Impressions => self.impressions.map(|v| v as f64),
            KpiKey::ExpectedViewers => self.expected_viewers.map(|v| v as f64),
            KpiKey::ExpectedViews => self.expected_views.map(|v| v as f64),
        }
    }

    /// Stored cost-per-lead, else `budget / leads` (0 with no leads).
    pub fn effective_cost_per_lead(&self) -> f64 {
        match self.cost_per_lead {
            Some(cpl) => cpl,
            None if self.leads > 0 => self.budget / self.leads as f64,
            None => 0.0,
        }
    }

    /// `achievedGrps / expectedGrps`, when both are set and expected is positive.
    pub fn grp_efficiency(&self) -> Option<f64> {
        match (self.expected_grps, self.achieved_grps) {
            (Some(expected), Some(achieved)) if expected > 0.0 => Some(achieved / expected),
            _ => None,
        }
    }

    /// `extraSocialBudget / budget`, when both are meaningful.
    pub fn social_spend_ratio(&self) -> Option<f64> {
        match self.extra_social_budget {
            Some(extra) if self.budget > 0.0 => Some(extra / self.budget),
            _ => None,
        }
    }

    /// Copy of this record with persistence identity and audit fields cleared.
    pub fn without_identity(&self) -> Campaign {
        Campaign {
            id: None,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }

    /// Apply a partial update. The patch is validated as a whole before any
    /// field changes, so a rejected patch leaves the record untouched.
    pub fn apply_patch(&mut self, patch: &CampaignPatch) -> CampaignResult<()> {
        let start = patch.start_date.unwrap_or(self.start_date);
        let end = patch.end_date.unwrap_or(self.end_date);
        ensure_date_order(start, end)?;
        if let Some(budget) = patch.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(CampaignError::Validation(format!(
                    "budget must be a non-negative amount, got {}",
                    budget
                )));
            }
        }

        self.start_date = start;
        self.end_date = end;
        if let Some(manager) = &patch.manager {
            self.manager = manager.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(budget) = patch.budget {
            self.budget = budget;
        }
        if let Some(leads) = patch.leads {
            self.leads = leads;
        }
        Ok(())
    }
}

/// Partial field update for an existing campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager: Option<String>,
    pub notes: Option<String>,
    pub status: Option<CampaignStatus>,
    pub budget: Option<f64>,
    pub leads: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Campaign {
        let mut c = Campaign::new("FC", "TV", date(2025, 1, 1), date(2025, 1, 31));
        c.budget = 12_000.0;
        c.leads = 80;
        c
    }

    #[test]
    fn test_deserialize_stored_record() {
        let json = r#"{
            "id": "6f1c9d1e-8c39-4a59-9a57-2f0c5c9a7e11",
            "brand": "FC",
            "channel": "TV",
            "region": "North",
            "startDate": "2025-01-06",
            "endDate": "2025-02-02",
            "budget": 25000,
            "leads": 140,
            "status": "In Progress",
            "expectedGrps": 120,
            "achievedGrps": 96.5,
            "manager": "JD",
            "createdAt": {"seconds": 1735689600, "nanoseconds": 0},
            "updatedAt": "2025-01-07T09:30:00Z"
        }"#;

        let c: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(c.status, CampaignStatus::Active);
        assert_eq!(c.expected_grps, Some(120.0));
        assert!(c.impressions.is_none());
        assert!(c.created_at.is_some());
        assert!(c.updated_at.is_some());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_missing_dates_rejected_at_parse() {
        let json = r#"{"brand": "FC", "channel": "TV"}"#;
        assert!(serde_json::from_str::<Campaign>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_dates_and_negatives() {
        let mut c = sample();
        c.end_date = date(2024, 12, 1);
        assert!(matches!(c.validate(), Err(CampaignError::DataShape(_))));

        let mut c = sample();
        c.budget = -1.0;
        assert!(matches!(c.validate(), Err(CampaignError::DataShape(_))));
    }

    #[test]
    fn test_effective_cost_per_lead() {
        let mut c = sample();
        assert!((c.effective_cost_per_lead() - 150.0).abs() < f64::EPSILON);

        c.cost_per_lead = Some(99.0);
        assert!((c.effective_cost_per_lead() - 99.0).abs() < f64::EPSILON);

        let mut no_leads = sample();
        no_leads.leads = 0;
        assert_eq!(no_leads.effective_cost_per_lead(), 0.0);
    }

    #[test]
    fn test_grp_efficiency_requires_positive_expected() {
        let mut c = sample();
        assert!(c.grp_efficiency().is_none());

        c.expected_grps = Some(0.0);
        c.achieved_grps = Some(10.0);
        assert!(c.grp_efficiency().is_none());

        c.expected_grps = Some(100.0);
        c.achieved_grps = Some(75.0);
        assert!((c.grp_efficiency().unwrap() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_patch_revalidates_dates() {
        let mut c = sample();
        let patch = CampaignPatch {
            end_date: Some(date(2024, 12, 15)),
            manager: Some("AB".into()),
            ..Default::default()
        };

        assert!(c.apply_patch(&patch).unwrap_err().is_validation());
        assert_eq!(c.end_date, date(2025, 1, 31));
        assert_eq!(c.manager, "");

        let shift = CampaignPatch {
            start_date: Some(date(2025, 2, 1)),
            end_date: Some(date(2025, 2, 28)),
            status: Some(CampaignStatus::Scheduled),
            ..Default::default()
        };
        c.apply_patch(&shift).unwrap();
        assert_eq!(c.start_date, date(2025, 2, 1));
        assert_eq!(c.status, CampaignStatus::Scheduled);
    }

    #[test]
    fn test_without_identity_clears_audit_fields() {
        let mut c = sample();
        c.id = Some(Uuid::new_v4());
        c.created_at = Some(Utc::now());
        c.updated_at = Some(Utc::now());

        let copy = c.without_identity();
        assert!(copy.id.is_none());
        assert!(copy.created_at.is_none());
        assert!(copy.updated_at.is_none());
        assert_eq!(copy.brand, c.brand);
        assert_eq!(copy.budget, c.budget);
    }
}
