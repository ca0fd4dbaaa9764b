use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Bad request parameters (blank id, empty torrent list, unknown sync type).
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Movie not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Which sync to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    All,
    Upcoming,
    Latest,
    Popular,
    UpdateTorrents,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::All => "all",
            SyncType::Upcoming => "upcoming",
            SyncType::Latest => "latest",
            SyncType::Popular => "popular",
            SyncType::UpdateTorrents => "update_torrents",
        }
    }
}

impl fmt::Display for SyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SyncType::All),
            "upcoming" => Ok(SyncType::Upcoming),
            "latest" => Ok(SyncType::Latest),
            "popular" => Ok(SyncType::Popular),
            "update_torrents" => Ok(SyncType::UpdateTorrents),
            other => Err(SyncError::InvalidRequest(format!(
                "Unknown sync type: {}",
                other
            ))),
        }
    }
}

/// Outcome counters for one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub added: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: u32,
    /// Set when the upstream list itself could not be fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl SyncCounts {
    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: 1,
            failure: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Result of a combined run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSyncResult {
    pub upcoming: SyncCounts,
    pub latest: SyncCounts,
    pub popular: SyncCounts,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_type_wire_names() {
        for kind in [
            SyncType::All,
            SyncType::Upcoming,
            SyncType::Latest,
            SyncType::Popular,
            SyncType::UpdateTorrents,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<SyncType>().unwrap(), kind);
        }
        assert!("weekly".parse::<SyncType>().is_err());
    }

    #[test]
    fn test_failure_omitted_when_absent() {
        let json = serde_json::to_value(SyncCounts::default()).unwrap();
        assert!(json.get("failure").is_none());

        let json = serde_json::to_value(SyncCounts::failed("boom")).unwrap();
        assert_eq!(json["errors"], 1);
        assert_eq!(json["failure"], "boom");
    }
}
