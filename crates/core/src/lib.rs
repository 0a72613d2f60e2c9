pub mod channels;
pub mod config;
pub mod error;
pub mod status;
pub mod timestamp;
pub mod types;

pub use channels::{ChannelDirectory, ChannelInfo, ManagerDirectory, ManagerInfo};
pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use status::{auto_status, derive_status, migrate_status, CampaignStatus};
pub use types::{Campaign, CampaignId, CampaignPatch, KpiKey};
