use chrono::NaiveDate;
use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("No campaigns found for brand '{brand}' on channel '{channel}'")]
    EmptyCohort { brand: String, channel: String },

    #[error("Unrecognized period label: {0}")]
    UnparseablePeriod(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Campaign not found: {0}")]
    NotFound(String),

    #[error("Malformed campaign record: {0}")]
    DataShape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    /// Validation failures are raised before any write is attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CampaignError::InvalidDateRange { .. }
                | CampaignError::EmptyCohort { .. }
                | CampaignError::UnparseablePeriod(_)
                | CampaignError::Validation(_)
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, CampaignError::Persistence(_) | CampaignError::NotFound(_))
    }
}

/// Reject an inverted `[start, end]` pair.
pub fn ensure_date_order(start: NaiveDate, end: NaiveDate) -> CampaignResult<()> {
    if start > end {
        return Err(CampaignError::InvalidDateRange { start, end });
    }
    Ok(())
}
