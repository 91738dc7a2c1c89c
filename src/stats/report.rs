use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDuration {
    pub seconds: f64,
    pub minutes: f64,
    pub hours: f64,
}

impl SessionDuration {
    pub fn from_elapsed(elapsed: Duration) -> Self {
        let seconds = elapsed.as_secs_f64();
        Self {
            seconds: round_to(seconds, 1),
            minutes: round_to(seconds / 60.0, 1),
            hours: round_to(seconds / 3600.0, 2),
        }
    }
}

/// Counts and events-per-minute for one family of events, keyed by kind name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindReport {
    pub counts: BTreeMap<String, u64>,
    pub frequencies: BTreeMap<String, f64>,
}

impl KindReport {
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Point-in-time view of a stats session; the persisted JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub session_id: Uuid,
    pub session_started: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub session_duration: SessionDuration,
    pub gestures: KindReport,
    pub expressions: KindReport,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
