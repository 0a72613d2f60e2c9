//! Campaign planning views: calendar periods, date presets, and the
//! filters that carve a working subset out of a campaign snapshot.

pub mod filters;
pub mod periods;

pub use filters::{cohort_of, CampaignFilter};
pub use periods::{
    generate_period_catalog, matches_period, matches_range, DatePreset, Period, PeriodCatalog,
    PeriodOption, PeriodType,
};
