//! Campaign reporting: cross-channel KPIs, per-channel rollups, and
//! performance alerts over a filtered campaign subset.

pub mod alerts;
pub mod dashboard;
pub mod kpi;

pub use alerts::{Alert, AlertDetector, AlertKind, Severity};
pub use dashboard::{CampaignDashboard, DashboardSummary};
pub use kpi::{ChannelRollup, KpiEngine, KpiSet, MetricTotal};
