//! Audit timestamp normalization.
//!
//! Records may carry `createdAt` / `updatedAt` either as an already-parsed
//! RFC 3339 string or as the store's native `{ seconds, nanoseconds }`
//! wrapper. Both collapse to `DateTime<Utc>` before anything reads them.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CampaignError, CampaignResult};

/// Server-native timestamp wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTimestamp {
    #[serde(alias = "_seconds")]
    pub seconds: i64,
    #[serde(alias = "_nanoseconds", default)]
    pub nanoseconds: u32,
}

/// Any timestamp shape accepted from the persistence layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Parsed(DateTime<Utc>),
    Server(ServerTimestamp),
}

impl RawTimestamp {
    pub fn normalize(self) -> CampaignResult<DateTime<Utc>> {
        match self {
            RawTimestamp::Parsed(dt) => Ok(dt),
            RawTimestamp::Server(ts) => Utc
                .timestamp_opt(ts.seconds, ts.nanoseconds)
                .single()
                .ok_or_else(|| {
                    CampaignError::DataShape(format!(
                        "timestamp out of range: {}s {}ns",
                        ts.seconds, ts.nanoseconds
                    ))
                }),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        RawTimestamp::Parsed(dt)
    }
}

/// `deserialize_with` helper for optional audit fields.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    raw.map(RawTimestamp::normalize)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_opt")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_parsed_and_server_forms_agree() {
        let parsed: Holder = serde_json::from_str(r#"{"at": "2025-03-01T12:00:00Z"}"#).unwrap();
        let server: Holder =
            serde_json::from_str(r#"{"at": {"seconds": 1740830400, "nanoseconds": 0}}"#).unwrap();
        let legacy: Holder =
            serde_json::from_str(r#"{"at": {"_seconds": 1740830400, "_nanoseconds": 0}}"#).unwrap();

        assert!(parsed.at.is_some());
        assert_eq!(parsed.at, server.at);
        assert_eq!(server.at, legacy.at);
    }

    #[test]
    fn test_missing_or_null_timestamp() {
        let missing: Holder = serde_json::from_str("{}").unwrap();
        let null: Holder = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(missing.at.is_none());
        assert!(null.at.is_none());
    }

    #[test]
    fn test_out_of_range_server_timestamp() {
        let raw = RawTimestamp::Server(ServerTimestamp {
            seconds: i64::MAX,
            nanoseconds: 0,
        });
        assert!(matches!(raw.normalize(), Err(CampaignError::DataShape(_))));
    }
}
