//! Dashboard summary: KPIs, channel rollups and alerts for one subset.

use crate::alerts::{Alert, AlertDetector, Severity};
use crate::kpi::{ChannelRollup, KpiEngine, KpiSet};
use campaign_core::{AppConfig, Campaign, ChannelDirectory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub kpis: KpiSet,
    pub channels: Vec<ChannelRollup>,
    pub alerts: Vec<Alert>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSummary {
    pub fn alerts_at_least(&self, severity: Severity) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(move |a| a.severity >= severity)
    }
}

pub struct CampaignDashboard {
    kpis: KpiEngine,
    alerts: AlertDetector,
    directory: ChannelDirectory,
}

impl CampaignDashboard {
    pub fn new(config: &AppConfig, directory: ChannelDirectory) -> Self {
        Self {
            kpis: KpiEngine::new(config),
            alerts: AlertDetector::new(config),
            directory,
        }
    }

    pub fn summarize(&self, subset: &[Campaign]) -> DashboardSummary {
        let summary = DashboardSummary {
            kpis: self.kpis.compute_kpis(subset),
            channels: self.kpis.compute_channel_rollups(subset, &self.directory),
            alerts: self.alerts.detect_alerts(subset),
            generated_at: Utc::now(),
        };
        debug!(
            campaigns = summary.kpis.total_campaigns,
            alerts = summary.alerts.len(),
            "Dashboard summary computed"
        );
        summary
    }
}

impl Default for CampaignDashboard {
    fn default() -> Self {
        Self::new(&AppConfig::default(), ChannelDirectory::standard())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_summary_of_empty_subset() {
        let summary = CampaignDashboard::default().summarize(&[]);
        assert_eq!(summary.kpis.total_campaigns, 0);
        assert!(summary.alerts.is_empty());
        assert!(summary.channels.iter().all(|r| r.campaigns == 0));
    }

    #[test]
    fn test_alerts_at_least_filters_by_severity() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let mut tv = Campaign::new("FC", "TV", start, end);
        tv.expected_grps = Some(100.0);
        tv.achieved_grps = Some(88.0);
        let mut search = Campaign::new("FC", "Google", start, end);
        search.cost_per_lead = Some(400.0);

        let summary = CampaignDashboard::default().summarize(&[tv, search]);
        assert_eq!(summary.alerts.len(), 2);
        assert_eq!(summary.alerts_at_least(Severity::High).count(), 1);
        assert_eq!(summary.alerts_at_least(Severity::Medium).count(), 2);
    }
}
