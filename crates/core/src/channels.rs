//! Read-only reference data: active channels and managers.
//!
//! The channel catalog decides which KPI keys a channel exposes and how
//! channels group together in reports. Both directories are snapshots; the
//! owning service edits them, this crate only reads.

use serde::{Deserialize, Serialize};

use crate::types::KpiKey;

/// Subgroup key of the channels that may carry extra social spend.
pub const SOCIAL_SUBGROUP: &str = "social";

// ─── Channels ───────────────────────────────────────────────────────────────

/// Display metadata for one active channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub name: String,
    pub color: String,
    pub icon: String,
    /// KPI keys rolled up and shown for this channel.
    #[serde(default)]
    pub kpis: Vec<KpiKey>,
    /// Sub-grouping key, e.g. `"broadcast"` or `"social"`.
    #[serde(default)]
    pub subgroup: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ChannelInfo {
    pub fn new(name: &str, color: &str, icon: &str, kpis: &[KpiKey], subgroup: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            kpis: kpis.to_vec(),
            subgroup: Some(subgroup.to_string()),
            active: true,
        }
    }

    pub fn shows(&self, key: KpiKey) -> bool {
        self.kpis.contains(&key)
    }
}

/// Ordered catalog of channels. Lookups only ever see active entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelDirectory {
    channels: Vec<ChannelInfo>,
}

impl ChannelDirectory {
    pub fn new(channels: Vec<ChannelInfo>) -> Self {
        Self { channels }
    }

    /// Active channels in catalog order.
    pub fn active(&self) -> impl Iterator<Item = &ChannelInfo> {
        self.channels.iter().filter(|c| c.active)
    }

    pub fn get(&self, name: &str) -> Option<&ChannelInfo> {
        self.active().find(|c| c.name == name)
    }

    /// KPI keys shown for `channel`; empty for unknown or inactive channels.
    pub fn kpis_for(&self, channel: &str) -> &[KpiKey] {
        self.get(channel).map(|c| c.kpis.as_slice()).unwrap_or(&[])
    }

    pub fn subgroup_of(&self, channel: &str) -> Option<&str> {
        self.get(channel).and_then(|c| c.subgroup.as_deref())
    }

    /// Active channel names sharing a sub-grouping key.
    pub fn channels_in_subgroup<'a>(
        &'a self,
        subgroup: &'a str,
    ) -> impl Iterator<Item = &'a str> {
        self.active()
            .filter(move |c| c.subgroup.as_deref() == Some(subgroup))
            .map(|c| c.name.as_str())
    }
}

impl ChannelDirectory {
    /// The stock channel catalog used when no directory is supplied.
    pub fn standard() -> Self {
        use KpiKey::*;
        Self::new(vec![
            ChannelInfo::new(
                "TV",
                "#1f77b4",
                "tv",
                &[ExpectedGrps, AchievedGrps, SpotsPurchased],
                "broadcast",
            ),
            ChannelInfo::new(
                "Radio",
                "#ff7f0e",
                "radio",
                &[SpotsPurchased, Impressions],
                "broadcast",
            ),
            ChannelInfo::new(
                "CTV",
                "#17becf",
                "monitor",
                &[ExpectedViewers, Impressions],
                "broadcast",
            ),
            ChannelInfo::new("YouTube", "#d62728", "play", &[ExpectedViews, Impressions], "video"),
            ChannelInfo::new("Meta", "#3b5998", "thumbs-up", &[Impressions], SOCIAL_SUBGROUP),
            ChannelInfo::new(
                "TikTok",
                "#010101",
                "music",
                &[Impressions, ExpectedViews],
                SOCIAL_SUBGROUP,
            ),
            ChannelInfo::new("LinkedIn", "#0a66c2", "briefcase", &[Impressions], SOCIAL_SUBGROUP),
            ChannelInfo::new("Snapchat", "#fffc00", "ghost", &[Impressions], SOCIAL_SUBGROUP),
            ChannelInfo::new("Google", "#34a853", "search", &[Impressions], "search"),
            ChannelInfo::new("OOH", "#8c564b", "billboard", &[Impressions], "outdoor"),
        ])
    }
}

// ─── Managers ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerInfo {
    pub id: String,
    pub initials: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerDirectory {
    managers: Vec<ManagerInfo>,
}

impl ManagerDirectory {
    pub fn new(managers: Vec<ManagerInfo>) -> Self {
        Self { managers }
    }

    pub fn active(&self) -> impl Iterator<Item = &ManagerInfo> {
        self.managers.iter().filter(|m| m.active)
    }

    pub fn get(&self, id: &str) -> Option<&ManagerInfo> {
        self.active().find(|m| m.id == id)
    }

    /// Whether `initials` belong to an active manager.
    pub fn is_active_initials(&self, initials: &str) -> bool {
        self.active().any(|m| m.initials == initials)
    }
}
