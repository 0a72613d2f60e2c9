//! Working-subset selection over a campaign snapshot.

use campaign_core::{Campaign, CampaignStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::periods::{matches_range, Period};

/// Conjunctive filter applied to a snapshot. Unset criteria match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignFilter {
    /// Inclusive date range; overlapping campaigns are kept.
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub period: Option<Period>,
    pub status: Option<CampaignStatus>,
    pub channel: Option<String>,
    pub brand: Option<String>,
}

impl CampaignFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_status(mut self, status: CampaignStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn matches(&self, campaign: &Campaign) -> bool {
        if let Some((start, end)) = self.range {
            if !matches_range(campaign, start, end) {
                return false;
            }
        }
        if let Some(period) = &self.period {
            if !period.contains_campaign(campaign) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if &campaign.status != status {
                return false;
            }
        }
        if let Some(channel) = &self.channel {
            if &campaign.channel != channel {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if &campaign.brand != brand {
                return false;
            }
        }
        true
    }

    /// Matching campaigns in snapshot order.
    pub fn apply<'a>(&self, snapshot: &'a [Campaign]) -> Vec<&'a Campaign> {
        snapshot.iter().filter(|c| self.matches(c)).collect()
    }

    /// Owned copy of the matching campaigns, for handing to other engines.
    pub fn select(&self, snapshot: &[Campaign]) -> Vec<Campaign> {
        snapshot.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}

/// The duplication cohort: every campaign whose brand *and* channel match.
pub fn cohort_of<'a>(snapshot: &'a [Campaign], brand: &str, channel: &str) -> Vec<&'a Campaign> {
    snapshot
        .iter()
        .filter(|c| c.brand == brand && c.channel == channel)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot() -> Vec<Campaign> {
        let mut a = Campaign::new("FC", "Meta", date(2025, 1, 5), date(2025, 1, 25));
        a.status = CampaignStatus::Completed;
        let mut b = Campaign::new("FC", "Google", date(2025, 2, 1), date(2025, 2, 28));
        b.status = CampaignStatus::Active;
        let mut c = Campaign::new("Acme", "Meta", date(2025, 3, 1), date(2025, 4, 15));
        c.status = CampaignStatus::Planned;
        let d = Campaign::new("FC", "Meta", date(2025, 4, 1), date(2025, 4, 30));
        vec![a, b, c, d]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let campaigns = snapshot();
        assert_eq!(CampaignFilter::new().apply(&campaigns).len(), 4);
    }

    #[test]
    fn test_filters_combine_conjunctively() {
        let campaigns = snapshot();
        let filter = CampaignFilter::new()
            .with_channel("Meta")
            .with_range(date(2025, 3, 15), date(2025, 4, 10));
        let hits = filter.apply(&campaigns);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].brand, "Acme");
        assert_eq!(hits[1].brand, "FC");
    }

    #[test]
    fn test_status_and_period_filters() {
        let campaigns = snapshot();
        let q1 = Period::Quarter { year: 2025, quarter: 1 };

        let in_q1 = CampaignFilter::new().with_period(q1).apply(&campaigns);
        assert_eq!(in_q1.len(), 3);

        let active = CampaignFilter::new()
            .with_period(q1)
            .with_status(CampaignStatus::Active)
            .select(&campaigns);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].channel, "Google");
    }

    #[test]
    fn test_cohort_requires_brand_and_channel() {
        let campaigns = snapshot();
        let cohort = cohort_of(&campaigns, "FC", "Meta");
        assert_eq!(cohort.len(), 2);
        assert!(cohort.iter().all(|c| c.brand == "FC" && c.channel == "Meta"));

        assert!(cohort_of(&campaigns, "FC", "TV").is_empty());
        assert!(cohort_of(&campaigns, "fc", "Meta").is_empty());
    }
}
