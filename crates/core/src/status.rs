//! Campaign lifecycle status: canonical labels, legacy migration, and
//! date-driven derivation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a campaign.
///
/// Deserialization routes every stored label through [`migrate_status`],
/// so deprecated labels never reach downstream code. A label nobody
/// recognizes is kept verbatim in `Unrecognized` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CampaignStatus {
    Planned,
    Scheduled,
    Active,
    Completed,
    Unrecognized(String),
}

impl CampaignStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CampaignStatus::Planned => "PLANNED",
            CampaignStatus::Scheduled => "SCHEDULED",
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Completed => "COMPLETED",
            CampaignStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, CampaignStatus::Unrecognized(_))
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        CampaignStatus::Planned
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for CampaignStatus {
    fn from(raw: String) -> Self {
        migrate_status(&raw)
    }
}

impl From<&str> for CampaignStatus {
    fn from(raw: &str) -> Self {
        migrate_status(raw)
    }
}

impl From<CampaignStatus> for String {
    fn from(status: CampaignStatus) -> String {
        match status {
            CampaignStatus::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

/// Map any stored status label onto the canonical set.
///
/// Matching ignores case, surrounding whitespace, and `-`/space vs `_`.
/// Unknown labels pass through unchanged, so the function is total and
/// idempotent.
pub fn migrate_status(raw: &str) -> CampaignStatus {
    let key = raw.trim().to_ascii_lowercase().replace(|c: char| c == '-' || c == ' ', "_");
    match key.as_str() {
        "planned" | "planning" | "draft" | "pending" | "upcoming" | "not_started" | "proposed" => {
            CampaignStatus::Planned
        }
        "scheduled" | "ready" | "booked" | "confirmed" | "approved" => CampaignStatus::Scheduled,
        "active" | "live" | "running" | "ongoing" | "in_progress" | "in_flight" | "on_air" => {
            CampaignStatus::Active
        }
        "completed" | "complete" | "done" | "finished" | "ended" | "closed" | "archived" => {
            CampaignStatus::Completed
        }
        _ => CampaignStatus::Unrecognized(raw.to_string()),
    }
}

/// Date-driven status for `today` against an inclusive `[start, end]` window.
///
/// Never yields `Scheduled`; that label is only reachable by override.
pub fn auto_status(today: NaiveDate, start: NaiveDate, end: NaiveDate) -> CampaignStatus {
    if today < start {
        CampaignStatus::Planned
    } else if today <= end {
        CampaignStatus::Active
    } else {
        CampaignStatus::Completed
    }
}

/// Resolve a status with operator intent taking precedence over dates:
/// an explicit override wins, then `force_planned`, then [`auto_status`].
pub fn derive_status(
    today: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
    status_override: Option<&CampaignStatus>,
    force_planned: bool,
) -> CampaignStatus {
    if let Some(status) = status_override {
        return status.clone();
    }
    if force_planned {
        return CampaignStatus::Planned;
    }
    auto_status(today, start, end)
}
