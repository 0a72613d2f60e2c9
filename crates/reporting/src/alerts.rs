//! Per-campaign performance alerts with graded severity.

use campaign_core::config::{AlertThresholds, ChannelConfig};
use campaign_core::{AppConfig, Campaign, CampaignId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// TV delivered fewer GRPs than booked.
    Grp,
    HighCpl,
    /// Extra social spend is a large share of the campaign budget.
    SocialSpend,
}

/// Ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub campaign_id: Option<CampaignId>,
    pub brand: String,
    pub channel: String,
    pub message: String,
    /// Observed value: efficiency, CPL, or spend ratio.
    pub value: f64,
    pub threshold: f64,
}

impl Alert {
    fn for_campaign(
        campaign: &Campaign,
        kind: AlertKind,
        severity: Severity,
        value: f64,
        threshold: f64,
        message: String,
    ) -> Self {
        Self {
            kind,
            severity,
            campaign_id: campaign.id,
            brand: campaign.brand.clone(),
            channel: campaign.channel.clone(),
            message,
            value,
            threshold,
        }
    }
}

/// Scans a campaign subset and emits alerts, most severe first.
#[derive(Debug, Clone, Default)]
pub struct AlertDetector {
    thresholds: AlertThresholds,
    channels: ChannelConfig,
}

impl AlertDetector {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            thresholds: config.alerts.clone(),
            channels: config.channels.clone(),
        }
    }

    pub fn detect_alerts(&self, subset: &[Campaign]) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for campaign in subset {
            alerts.extend(self.grp_alert(campaign));
            alerts.extend(self.cpl_alert(campaign));
            alerts.extend(self.social_alert(campaign));
        }
        // Stable: equal severities keep detection order.
        alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
        alerts
    }

    fn grp_alert(&self, campaign: &Campaign) -> Option<Alert> {
        if !self.channels.is_tv(&campaign.channel) {
            return None;
        }
        let efficiency = campaign.grp_efficiency()?;
        if efficiency >= self.thresholds.grp_efficiency {
            return None;
        }
        let gap = (1.0 - efficiency) * 100.0;
        let severity = if gap > self.thresholds.grp_gap_high {
            Severity::High
        } else if gap > self.thresholds.grp_gap_medium {
            Severity::Medium
        } else {
            Severity::Low
        };
        Some(Alert::for_campaign(
            campaign,
            AlertKind::Grp,
            severity,
            efficiency,
            self.thresholds.grp_efficiency,
            format!(
                "{} GRP delivery at {:.0}% of plan ({:.1} pt shortfall)",
                campaign.label(),
                efficiency * 100.0,
                gap
            ),
        ))
    }

    fn cpl_alert(&self, campaign: &Campaign) -> Option<Alert> {
        let cpl = campaign.effective_cost_per_lead();
        if cpl <= self.thresholds.cpl {
            return None;
        }
        let severity = if cpl > self.thresholds.cpl_high {
            Severity::High
        } else if cpl > self.thresholds.cpl_medium {
            Severity::Medium
        } else {
            Severity::Low
        };
        Some(Alert::for_campaign(
            campaign,
            AlertKind::HighCpl,
            severity,
            cpl,
            self.thresholds.cpl,
            format!(
                "{} cost per lead {:.2} above {:.2}",
                campaign.label(),
                cpl,
                self.thresholds.cpl
            ),
        ))
    }

    fn social_alert(&self, campaign: &Campaign) -> Option<Alert> {
        if !self.channels.is_social(&campaign.channel) {
            return None;
        }
        let ratio = campaign.social_spend_ratio()?;
        if ratio <= self.thresholds.social_ratio {
            return None;
        }
        let severity = if ratio > self.thresholds.social_ratio_high {
            Severity::High
        } else {
            Severity::Medium
        };
        Some(Alert::for_campaign(
            campaign,
            AlertKind::SocialSpend,
            severity,
            ratio,
            self.thresholds.social_ratio,
            format!(
                "{} extra social spend is {:.0}% of budget",
                campaign.label(),
                ratio * 100.0
            ),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn campaign(channel: &str) -> Campaign {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        let mut c = Campaign::new("FC", channel, start, end);
        c.budget = 10_000.0;
        c.leads = 100;
        c
    }

    fn tv(expected: f64, achieved: f64) -> Campaign {
        let mut c = campaign("TV");
        c.expected_grps = Some(expected);
        c.achieved_grps = Some(achieved);
        c
    }

    fn with_cpl(cpl: f64) -> Campaign {
        let mut c = campaign("Google");
        c.cost_per_lead = Some(cpl);
        c
    }

    #[test]
    fn test_quiet_campaigns_raise_nothing() {
        let subset = vec![tv(100.0, 95.0), campaign("Meta"), campaign("Radio")];
        assert!(AlertDetector::default().detect_alerts(&subset).is_empty());
    }

    #[test]
    fn test_grp_shortfall_severity_bands() {
        let detector = AlertDetector::default();

        let high = detector.detect_alerts(&[tv(100.0, 75.0)]);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].kind, AlertKind::Grp);
        assert_eq!(high[0].severity, Severity::High);
        assert!((high[0].value - 0.75).abs() < f64::EPSILON);

        let medium = detector.detect_alerts(&[tv(100.0, 85.0)]);
        assert_eq!(medium[0].severity, Severity::Medium);

        // Just under the 0.9 threshold is already a 10.5 point gap.
        let near_miss = detector.detect_alerts(&[tv(100.0, 89.5)]);
        assert_eq!(near_miss[0].severity, Severity::Medium);
    }

    #[test]
    fn test_grp_low_band_with_wider_medium_gap() {
        let mut config = AppConfig::default();
        config.alerts.grp_gap_medium = 15.0;
        let alerts = AlertDetector::new(&config).detect_alerts(&[tv(100.0, 88.0)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Grp);
        assert_eq!(alerts[0].severity, Severity::Low);
    }

    #[test]
    fn test_grp_requires_tv_and_positive_expectation() {
        let detector = AlertDetector::default();
        let mut radio = campaign("Radio");
        radio.expected_grps = Some(100.0);
        radio.achieved_grps = Some(10.0);

        assert!(detector.detect_alerts(&[radio]).is_empty());
        assert!(detector.detect_alerts(&[tv(0.0, 10.0)]).is_empty());

        let mut missing = campaign("TV");
        missing.expected_grps = Some(100.0);
        assert!(detector.detect_alerts(&[missing]).is_empty());
    }

    #[test]
    fn test_cpl_severity_bands() {
        let detector = AlertDetector::default();
        assert!(detector.detect_alerts(&[with_cpl(150.0)]).is_empty());
        assert_eq!(detector.detect_alerts(&[with_cpl(180.0)])[0].severity, Severity::Low);
        assert_eq!(detector.detect_alerts(&[with_cpl(250.0)])[0].severity, Severity::Medium);
        assert_eq!(detector.detect_alerts(&[with_cpl(301.0)])[0].severity, Severity::High);
    }

    #[test]
    fn test_cpl_derived_from_budget_when_not_stored() {
        let mut c = campaign("Meta");
        c.leads = 20;
        let alerts = AlertDetector::default().detect_alerts(&[c]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::HighCpl);
        assert!((alerts[0].value - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_social_spend_bands() {
        let detector = AlertDetector::default();

        let mut medium = campaign("Meta");
        medium.extra_social_budget = Some(4_000.0);
        let mut high = campaign("Meta");
        high.extra_social_budget = Some(6_000.0);
        let mut under = campaign("Meta");
        under.extra_social_budget = Some(3_000.0);
        let mut no_budget = campaign("Meta");
        no_budget.budget = 0.0;
        no_budget.extra_social_budget = Some(500.0);

        assert_eq!(detector.detect_alerts(&[medium])[0].severity, Severity::Medium);
        assert_eq!(detector.detect_alerts(&[high])[0].severity, Severity::High);
        assert!(detector.detect_alerts(&[under]).is_empty());
        assert!(detector.detect_alerts(&[no_budget]).is_empty());
    }

    #[test]
    fn test_social_spend_ignored_outside_social_channels() {
        let detector = AlertDetector::default();
        for channel in ["Google", "TV", "Radio"] {
            let mut c = campaign(channel);
            c.extra_social_budget = Some(6_000.0);
            let alerts = detector.detect_alerts(&[c]);
            assert!(
                alerts.iter().all(|a| a.kind != AlertKind::SocialSpend),
                "{} raised a social spend alert",
                channel
            );
        }
    }

    #[test]
    fn test_sorted_by_severity_descending_and_stable() {
        let subset = vec![
            with_cpl(180.0),
            tv(100.0, 70.0),
            with_cpl(250.0),
            with_cpl(190.0),
        ];
        let alerts = AlertDetector::default().detect_alerts(&subset);

        let severities: Vec<Severity> = alerts.iter().map(|a| a.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::High, Severity::Medium, Severity::Low, Severity::Low]
        );
        assert!((alerts[2].value - 180.0).abs() < f64::EPSILON);
        assert!((alerts[3].value - 190.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_thresholds() {
        let mut config = AppConfig::default();
        config.alerts.cpl = 50.0;
        let alerts = AlertDetector::new(&config).detect_alerts(&[with_cpl(60.0)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Low);
        assert!((alerts[0].threshold - 50.0).abs() < f64::EPSILON);
    }
}
