use serde::Deserialize;

use crate::channels::{ChannelDirectory, SOCIAL_SUBGROUP};

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_PLANNER__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub alerts: AlertThresholds,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub duplication: DuplicationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ─── Alert Thresholds ───────────────────────────────────────────────────────

/// Thresholds used by KPI rollups and alert detection.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertThresholds {
    /// TV campaigns delivering below this achieved/expected GRP ratio are flagged.
    #[serde(default = "default_grp_efficiency")]
    pub grp_efficiency: f64,
    /// Shortfall gap, in percentage points, above which a GRP alert is `medium`.
    #[serde(default = "default_grp_gap_medium")]
    pub grp_gap_medium: f64,
    #[serde(default = "default_grp_gap_high")]
    pub grp_gap_high: f64,
    #[serde(default = "default_cpl")]
    pub cpl: f64,
    #[serde(default = "default_cpl_medium")]
    pub cpl_medium: f64,
    #[serde(default = "default_cpl_high")]
    pub cpl_high: f64,
    /// Extra social spend as a fraction of budget.
    #[serde(default = "default_social_ratio")]
    pub social_ratio: f64,
    #[serde(default = "default_social_ratio_high")]
    pub social_ratio_high: f64,
}

fn default_grp_efficiency() -> f64 { 0.9 }
fn default_grp_gap_medium() -> f64 { 10.0 }
fn default_grp_gap_high() -> f64 { 20.0 }
fn default_cpl() -> f64 { 150.0 }
fn default_cpl_medium() -> f64 { 200.0 }
fn default_cpl_high() -> f64 { 300.0 }
fn default_social_ratio() -> f64 { 0.3 }
fn default_social_ratio_high() -> f64 { 0.5 }

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            grp_efficiency: default_grp_efficiency(),
            grp_gap_medium: default_grp_gap_medium(),
            grp_gap_high: default_grp_gap_high(),
            cpl: default_cpl(),
            cpl_medium: default_cpl_medium(),
            cpl_high: default_cpl_high(),
            social_ratio: default_social_ratio(),
            social_ratio_high: default_social_ratio_high(),
        }
    }
}

// ─── Channel Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_tv_channel")]
    pub tv: String,
    /// Channels allowed to carry `extraSocialBudget` / `extraSocialNotes`.
    /// Defaults to the `social` subgroup of the standard directory. KPI and
    /// alert classification read this list, never the directory subgroup.
    #[serde(default = "default_social_channels")]
    pub social: Vec<String>,
}

fn default_tv_channel() -> String {
    "TV".to_string()
}
fn default_social_channels() -> Vec<String> {
    ChannelDirectory::standard()
        .channels_in_subgroup(SOCIAL_SUBGROUP)
        .map(str::to_string)
        .collect()
}

impl ChannelConfig {
    pub fn is_tv(&self, channel: &str) -> bool {
        self.tv == channel
    }

    pub fn is_social(&self, channel: &str) -> bool {
        self.social.iter().any(|c| c == channel)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            tv: default_tv_channel(),
            social: default_social_channels(),
        }
    }
}

// ─── Duplication Config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DuplicationConfig {
    /// Appended to a copied note when no replacement note is supplied.
    #[serde(default = "default_copy_suffix")]
    pub copy_suffix: String,
}

fn default_copy_suffix() -> String {
    "(Copy)".to_string()
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            copy_suffix: default_copy_suffix(),
        }
    }
}

// ─── Logging Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "campaign_planner=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_PLANNER")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("channels.social"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
