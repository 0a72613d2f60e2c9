//! Calendar periods: quarter/month catalogs, label parsing, and the
//! closed-interval overlap test used by every time-windowed view.

use campaign_core::{Campaign, CampaignError, CampaignResult};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Month names in calendar order. Labels are parsed against this table only.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a period label should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Quarter,
    Month,
    /// `"YYYY-MM-DD to YYYY-MM-DD"` (or `..` as separator).
    Custom,
}

impl FromStr for PeriodType {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quarter" | "quarterly" => Ok(PeriodType::Quarter),
            "month" | "monthly" => Ok(PeriodType::Month),
            "custom" | "range" => Ok(PeriodType::Custom),
            other => Err(CampaignError::Validation(format!(
                "unknown period type '{}'",
                other
            ))),
        }
    }
}

/// A resolved calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Period {
    Quarter { year: i32, quarter: u32 },
    Month { year: i32, month: u32 },
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Parse a catalog label such as `"Q3 2025"` or `"March 2025"`.
    ///
    /// Anything outside the fixed name tables is rejected instead of
    /// being widened to a catch-all period.
    pub fn parse(label: &str, period_type: PeriodType) -> CampaignResult<Period> {
        let unparseable = || CampaignError::UnparseablePeriod(label.to_string());

        if period_type == PeriodType::Custom {
            return parse_custom(label).ok_or_else(unparseable);
        }

        let mut parts = label.split_whitespace();
        let (name, year) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(year), None) => (name, year),
            _ => return Err(unparseable()),
        };
        let year: i32 = year.parse().map_err(|_| unparseable())?;

        let period = match period_type {
            PeriodType::Quarter => {
                let quarter = quarter_index(name).ok_or_else(unparseable)?;
                Period::Quarter { year, quarter }
            }
            PeriodType::Month => {
                let month = month_index(name).ok_or_else(unparseable)?;
                Period::Month { year, month }
            }
            PeriodType::Custom => return Err(unparseable()),
        };
        // Rejects years chrono cannot represent.
        period.bounds()?;
        Ok(period)
    }

    /// Inclusive `[start, end]` dates covered by the period.
    pub fn bounds(&self) -> CampaignResult<(NaiveDate, NaiveDate)> {
        let bounds = match *self {
            Period::Quarter { year, quarter } if (1..=4).contains(&quarter) => {
                month_span(year, (quarter - 1) * 3 + 1, (quarter - 1) * 3 + 3)
            }
            Period::Month { year, month } => month_span(year, month, month),
            Period::Custom { start, end } if start <= end => Some((start, end)),
            _ => None,
        };
        bounds.ok_or_else(|| CampaignError::UnparseablePeriod(self.label()))
    }

    pub fn label(&self) -> String {
        match *self {
            Period::Quarter { year, quarter } => format!("Q{} {}", quarter, year),
            Period::Month { year, month } => {
                let name = (month as usize)
                    .checked_sub(1)
                    .and_then(|i| MONTH_NAMES.get(i))
                    .copied()
                    .unwrap_or("Month?");
                format!("{} {}", name, year)
            }
            Period::Custom { start, end } => format!("{} to {}", start, end),
        }
    }

    pub fn period_type(&self) -> PeriodType {
        match self {
            Period::Quarter { .. } => PeriodType::Quarter,
            Period::Month { .. } => PeriodType::Month,
            Period::Custom { .. } => PeriodType::Custom,
        }
    }

    /// A period whose bounds cannot be resolved contains nothing.
    pub fn contains_campaign(&self, campaign: &Campaign) -> bool {
        match self.bounds() {
            Ok((start, end)) => matches_range(campaign, start, end),
            Err(_) => false,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One selectable entry in a period picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOption {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TryFrom<Period> for PeriodOption {
    type Error = CampaignError;

    fn try_from(period: Period) -> Result<Self, Self::Error> {
        let (start, end) = period.bounds()?;
        Ok(Self {
            label: period.label(),
            start,
            end,
        })
    }
}

/// The quarter and month pickers for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCatalog {
    pub year: i32,
    pub quarters: Vec<PeriodOption>,
    pub months: Vec<PeriodOption>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Build the four quarter and twelve month options for `year`.
pub fn generate_period_catalog(year: i32) -> PeriodCatalog {
    PeriodCatalog {
        year,
        quarters: (1..=4)
            .filter_map(|quarter| Period::Quarter { year, quarter }.try_into().ok())
            .collect(),
        months: (1..=12)
            .filter_map(|month| Period::Month { year, month }.try_into().ok())
            .collect(),
    }
}

/// Closed-interval overlap: the campaign matches when any day of its
/// window falls inside `[start, end]`, not only when it is fully contained.
pub fn matches_range(campaign: &Campaign, start: NaiveDate, end: NaiveDate) -> bool {
    campaign.start_date <= end && campaign.end_date >= start
}

/// Whether `campaign` overlaps the period named by `label`.
/// An unparseable label never matches.
pub fn matches_period(campaign: &Campaign, label: &str, period_type: PeriodType) -> bool {
    match Period::parse(label, period_type) {
        Ok(period) => period.contains_campaign(campaign),
        Err(e) => {
            tracing::debug!(error = %e, "Period label rejected, excluding campaign");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Quick date-range presets offered next to free-form filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    Last7Days,
    Last30Days,
    Last90Days,
    ThisMonth,
    ThisQuarter,
    ThisYear,
}

impl DatePreset {
    /// Inclusive `[start, end]` relative to `today`. The trailing presets
    /// cover exactly N days ending today.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        // Clamps to `today` at the lower edge of chrono's calendar.
        let trailing = |days: i64| {
            let start = today
                .checked_sub_signed(Duration::days(days - 1))
                .unwrap_or(today);
            (start, today)
        };
        let span = match self {
            DatePreset::Last7Days => return trailing(7),
            DatePreset::Last30Days => return trailing(30),
            DatePreset::Last90Days => return trailing(90),
            DatePreset::ThisMonth => month_span(today.year(), today.month(), today.month()),
            DatePreset::ThisQuarter => {
                let first = (today.month() - 1) / 3 * 3 + 1;
                month_span(today.year(), first, first + 2)
            }
            DatePreset::ThisYear => month_span(today.year(), 1, 12),
        };
        // Only unresolvable at the edge of chrono's calendar.
        span.unwrap_or((today, today))
    }
}

impl FromStr for DatePreset {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_7_days" | "7d" => Ok(DatePreset::Last7Days),
            "last_30_days" | "30d" => Ok(DatePreset::Last30Days),
            "last_90_days" | "90d" => Ok(DatePreset::Last90Days),
            "this_month" => Ok(DatePreset::ThisMonth),
            "this_quarter" => Ok(DatePreset::ThisQuarter),
            "this_year" => Ok(DatePreset::ThisYear),
            other => Err(CampaignError::Validation(format!(
                "unknown date preset '{}'",
                other
            ))),
        }
    }
}

// -- internal helpers ---------------------------------------------------

fn quarter_index(name: &str) -> Option<u32> {
    match name.to_ascii_uppercase().as_str() {
        "Q1" => Some(1),
        "Q2" => Some(2),
        "Q3" => Some(3),
        "Q4" => Some(4),
        _ => None,
    }
}

fn month_index(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// First day of `first_month` through the last day of `last_month`.
fn month_span(year: i32, first_month: u32, last_month: u32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, first_month, 1)?,
        last_day_of_month(year, last_month)?,
    ))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn parse_custom(label: &str) -> Option<Period> {
    let (start, end) = label
        .split_once(" to ")
        .or_else(|| label.split_once(".."))?;
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").ok()?;
    if start > end {
        return None;
    }
    Some(Period::Custom { start, end })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
