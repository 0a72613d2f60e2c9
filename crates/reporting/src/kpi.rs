//! Channel rollups and the cross-channel KPI set.
//!
//! Optional channel metrics are summed only over campaigns that carry
//! them; an absent metric never counts as zero, so per-metric sample
//! counts stay correct.

use campaign_core::config::{AlertThresholds, ChannelConfig};
use campaign_core::{AppConfig, Campaign, ChannelDirectory, KpiKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Sum of one optional metric and how many campaigns contributed to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTotal {
    pub sum: f64,
    pub samples: usize,
}

impl MetricTotal {
    pub fn average(&self) -> Option<f64> {
        if self.samples > 0 {
            Some(self.sum / self.samples as f64)
        } else {
            None
        }
    }
}

/// Per-channel accumulation over a campaign subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRollup {
    pub channel: String,
    pub campaigns: usize,
    pub budget: f64,
    pub leads: u64,
    /// `budget / leads`, 0 when there are no leads.
    pub cpl: f64,
    /// Only metrics at least one campaign reported.
    pub metrics: BTreeMap<KpiKey, MetricTotal>,
}

impl ChannelRollup {
    fn empty(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            campaigns: 0,
            budget: 0.0,
            leads: 0,
            cpl: 0.0,
            metrics: BTreeMap::new(),
        }
    }

    pub fn metric(&self, key: KpiKey) -> Option<f64> {
        self.metrics.get(&key).map(|t| t.sum)
    }
}

/// Cross-channel KPIs for a campaign subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub total_budget: f64,
    pub total_leads: u64,
    #[serde(rename = "avgCPL")]
    pub avg_cpl: f64,
    pub total_campaigns: usize,
    pub extra_social_budget: f64,
    pub grp_shortfall_campaigns: usize,
    #[serde(rename = "highCPLCampaigns")]
    pub high_cpl_campaigns: usize,
    /// Mean achieved/expected GRP ratio; 1.0 when no TV campaign reports GRPs.
    #[serde(rename = "avgGRPEfficiency")]
    pub avg_grp_efficiency: f64,
}

// ---------------------------------------------------------------------------
// KpiEngine
// ---------------------------------------------------------------------------

/// Pure folds over a campaign snapshot. Holds thresholds only, never data.
#[derive(Debug, Clone, Default)]
pub struct KpiEngine {
    thresholds: AlertThresholds,
    channels: ChannelConfig,
}

impl KpiEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            thresholds: config.alerts.clone(),
            channels: config.channels.clone(),
        }
    }

    pub fn compute_kpis(&self, subset: &[Campaign]) -> KpiSet {
        let total_budget: f64 = subset.iter().map(|c| c.budget).sum();
        let total_leads: u64 = subset.iter().map(|c| c.leads).sum();

        let extra_social_budget: f64 = subset
            .iter()
            .filter(|c| self.channels.is_social(&c.channel))
            .filter_map(|c| c.extra_social_budget)
            .sum();

        let efficiencies: Vec<f64> = subset
            .iter()
            .filter(|c| self.channels.is_tv(&c.channel))
            .filter_map(Campaign::grp_efficiency)
            .collect();
        let grp_shortfall_campaigns = efficiencies
            .iter()
            .filter(|e| **e < self.thresholds.grp_efficiency)
            .count();
        let avg_grp_efficiency = if efficiencies.is_empty() {
            1.0
        } else {
            efficiencies.iter().sum::<f64>() / efficiencies.len() as f64
        };

        let high_cpl_campaigns = subset
            .iter()
            .filter(|c| c.effective_cost_per_lead() > self.thresholds.cpl)
            .count();

        KpiSet {
            total_budget,
            total_leads,
            avg_cpl: ratio(total_budget, total_leads),
            total_campaigns: subset.len(),
            extra_social_budget,
            grp_shortfall_campaigns,
            high_cpl_campaigns,
            avg_grp_efficiency,
        }
    }

    /// Roll up every campaign on `channel`, summing whichever optional
    /// metrics they carry.
    pub fn compute_channel_rollup(&self, subset: &[Campaign], channel: &str) -> ChannelRollup {
        self.rollup_with_keys(subset, channel, &KpiKey::ALL)
    }

    /// One rollup per active directory channel, in directory order, keeping
    /// only the KPI keys the directory shows for that channel.
    pub fn compute_channel_rollups(
        &self,
        subset: &[Campaign],
        directory: &ChannelDirectory,
    ) -> Vec<ChannelRollup> {
        directory
            .active()
            .map(|info| self.rollup_with_keys(subset, &info.name, &info.kpis))
            .collect()
    }

    fn rollup_with_keys(
        &self,
        subset: &[Campaign],
        channel: &str,
        keys: &[KpiKey],
    ) -> ChannelRollup {
        let mut rollup = ChannelRollup::empty(channel);
        for campaign in subset.iter().filter(|c| c.channel == channel) {
            rollup.campaigns += 1;
            rollup.budget += campaign.budget;
            rollup.leads += campaign.leads;
            for key in keys {
                if let Some(value) = campaign.metric(*key) {
                    let total = rollup.metrics.entry(*key).or_default();
                    total.sum += value;
                    total.samples += 1;
                }
            }
        }
        rollup.cpl = ratio(rollup.budget, rollup.leads);
        rollup
    }
}

fn ratio(budget: f64, leads: u64) -> f64 {
    if leads > 0 {
        budget / leads as f64
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn campaign(channel: &str, budget: f64, leads: u64) -> Campaign {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        let mut c = Campaign::new("FC", channel, start, end);
        c.budget = budget;
        c.leads = leads;
        c
    }

    fn tv(expected: Option<f64>, achieved: Option<f64>) -> Campaign {
        let mut c = campaign("TV", 10_000.0, 100);
        c.expected_grps = expected;
        c.achieved_grps = achieved;
        c
    }

    #[test]
    fn test_empty_subset_defaults() {
        let kpis = KpiEngine::default().compute_kpis(&[]);
        assert_eq!(kpis.total_budget, 0.0);
        assert_eq!(kpis.total_leads, 0);
        assert_eq!(kpis.avg_cpl, 0.0);
        assert_eq!(kpis.total_campaigns, 0);
        assert!((kpis.avg_grp_efficiency - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_totals_and_average_cpl() {
        let subset = vec![
            campaign("Meta", 3_000.0, 30),
            campaign("Google", 5_000.0, 70),
            campaign("Radio", 2_000.0, 0),
        ];
        let kpis = KpiEngine::default().compute_kpis(&subset);

        assert!((kpis.total_budget - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(kpis.total_leads, 100);
        assert!((kpis.avg_cpl - 100.0).abs() < f64::EPSILON);
        assert_eq!(kpis.total_campaigns, 3);
    }

    #[test]
    fn test_grp_efficiency_ignores_incomplete_campaigns() {
        let subset = vec![
            tv(Some(100.0), Some(80.0)),
            tv(Some(100.0), Some(100.0)),
            tv(Some(100.0), None),
            tv(Some(0.0), Some(50.0)),
            tv(None, None),
        ];
        let kpis = KpiEngine::default().compute_kpis(&subset);

        assert!((kpis.avg_grp_efficiency - 0.9).abs() < 1e-9);
        assert_eq!(kpis.grp_shortfall_campaigns, 1);
    }

    #[test]
    fn test_grp_fields_outside_tv_are_ignored() {
        let mut radio = campaign("Radio", 1_000.0, 10);
        radio.expected_grps = Some(100.0);
        radio.achieved_grps = Some(10.0);

        let kpis = KpiEngine::default().compute_kpis(&[radio]);
        assert_eq!(kpis.grp_shortfall_campaigns, 0);
        assert!((kpis.avg_grp_efficiency - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_social_budget_and_high_cpl_counts() {
        let mut meta = campaign("Meta", 4_000.0, 10);
        meta.extra_social_budget = Some(1_500.0);
        let mut google = campaign("Google", 4_000.0, 40);
        google.extra_social_budget = Some(900.0);
        let mut stored_cpl = campaign("TikTok", 100.0, 1);
        stored_cpl.cost_per_lead = Some(151.0);

        let kpis = KpiEngine::default().compute_kpis(&[meta, google, stored_cpl]);
        assert!((kpis.extra_social_budget - 1_500.0).abs() < f64::EPSILON);
        // Meta at 400/lead and TikTok's stored 151.
        assert_eq!(kpis.high_cpl_campaigns, 2);
    }

    #[test]
    fn test_channel_rollup_sums_only_present_metrics() {
        let mut r1 = campaign("Radio", 1_000.0, 10);
        r1.spots_purchased = Some(40);
        r1.impressions = Some(120_000);
        let mut r2 = campaign("Radio", 3_000.0, 30);
        r2.spots_purchased = Some(60);
        let other = campaign("TV", 50_000.0, 5);

        let rollup = KpiEngine::default().compute_channel_rollup(&[r1, r2, other], "Radio");
        assert_eq!(rollup.campaigns, 2);
        assert!((rollup.budget - 4_000.0).abs() < f64::EPSILON);
        assert_eq!(rollup.leads, 40);
        assert!((rollup.cpl - 100.0).abs() < f64::EPSILON);

        let spots = rollup.metrics[&KpiKey::SpotsPurchased];
        assert_eq!(spots.samples, 2);
        assert!((spots.sum - 100.0).abs() < f64::EPSILON);
        let impressions = rollup.metrics[&KpiKey::Impressions];
        assert_eq!(impressions.samples, 1);
        assert_eq!(impressions.average(), Some(120_000.0));
        assert!(rollup.metric(KpiKey::ExpectedGrps).is_none());
    }

    #[test]
    fn test_rollup_without_leads_has_zero_cpl() {
        let rollup =
            KpiEngine::default().compute_channel_rollup(&[campaign("OOH", 8_000.0, 0)], "OOH");
        assert_eq!(rollup.cpl, 0.0);

        let none = KpiEngine::default().compute_channel_rollup(&[], "OOH");
        assert_eq!(none.campaigns, 0);
        assert_eq!(none.cpl, 0.0);
    }

    #[test]
    fn test_directory_rollups_follow_kpi_visibility() {
        let mut t = tv(Some(200.0), Some(180.0));
        t.impressions = Some(5_000);
        let subset = vec![t, campaign("Meta", 1_000.0, 10)];

        let rollups =
            KpiEngine::default().compute_channel_rollups(&subset, &ChannelDirectory::standard());
        let names: Vec<&str> = rollups.iter().map(|r| r.channel.as_str()).collect();
        assert_eq!(names[0], "TV");
        assert_eq!(rollups.len(), ChannelDirectory::standard().active().count());

        let tv_rollup = &rollups[0];
        assert_eq!(tv_rollup.metric(KpiKey::ExpectedGrps), Some(200.0));
        // TV does not list impressions in the standard directory.
        assert!(tv_rollup.metric(KpiKey::Impressions).is_none());
    }

    #[test]
    fn test_kpi_serialized_names() {
        let json = serde_json::to_value(KpiEngine::default().compute_kpis(&[])).unwrap();
        assert!(json.get("avgCPL").is_some());
        assert!(json.get("avgGRPEfficiency").is_some());
        assert!(json.get("highCPLCampaigns").is_some());
        assert!(json.get("grpShortfallCampaigns").is_some());
    }
}
