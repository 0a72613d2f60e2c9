//! Campaign record management: the repository seam over the document
//! store, and bulk duplication of campaign cohorts.

pub mod duplication;
pub mod store;

pub use duplication::{DuplicationEngine, DuplicationFailure, DuplicationOutcome, DuplicationTarget};
pub use store::{CampaignRepository, InMemoryCampaignStore};
