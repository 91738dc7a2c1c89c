use super::report::{round_to, KindReport, SessionDuration, StatsReport};
use super::storage::{JsonFileStore, StatsStore};
use super::window::FrequencyWindow;
use crate::config::StatsConfig;
use crate::error::StatsError;
use crate::expression::ExpressionKind;
use crate::gesture::GestureKind;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Anything the aggregator counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Gesture(GestureKind),
    Expression(ExpressionKind),
}

impl From<GestureKind> for EventKind {
    fn from(kind: GestureKind) -> Self {
        EventKind::Gesture(kind)
    }
}

impl From<ExpressionKind> for EventKind {
    fn from(kind: ExpressionKind) -> Self {
        EventKind::Expression(kind)
    }
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Gesture(kind) => kind.as_str(),
            EventKind::Expression(kind) => kind.as_str(),
        }
    }
}

/// A recognized gesture or expression at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionEvent {
    pub kind: EventKind,
    pub timestamp: Instant,
}

impl RecognitionEvent {
    pub fn now(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            timestamp: Instant::now(),
        }
    }
}

#[derive(Debug)]
struct KindStats {
    count: u64,
    window: FrequencyWindow,
}

#[derive(Debug)]
struct StatsState {
    session_id: Uuid,
    started: Instant,
    started_at: DateTime<Utc>,
    kinds: BTreeMap<EventKind, KindStats>,
}

impl StatsState {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started: Instant::now(),
            started_at: Utc::now(),
            kinds: BTreeMap::new(),
        }
    }

    fn key(&self) -> String {
        format!("stats_{}", self.started_at.format("%Y%m%d_%H%M%S"))
    }
}

/// Session-wide event counts and rolling frequencies.
///
/// Cloning yields another handle to the same session; all updates go through
/// one mutex so several pipelines may record concurrently.
#[derive(Clone)]
pub struct StatsAggregator {
    state: Arc<Mutex<StatsState>>,
    store: Arc<dyn StatsStore>,
    window: Duration,
    history_capacity: usize,
}

impl StatsAggregator {
    pub fn new(config: &StatsConfig, store: Arc<dyn StatsStore>) -> Self {
        let state = StatsState::new();
        info!("Stats session {} started", state.session_id);
        Self {
            state: Arc::new(Mutex::new(state)),
            store,
            window: config.window(),
            history_capacity: config.history_capacity,
        }
    }

    /// Aggregator persisting to JSON files under the configured directory
    pub fn with_json_store(config: &StatsConfig) -> Self {
        Self::new(config, Arc::new(JsonFileStore::new(config.directory())))
    }

    pub fn record(&self, event: &RecognitionEvent) {
        let mut state = self.state.lock();
        let entry = state.kinds.entry(event.kind).or_insert_with(|| KindStats {
            count: 0,
            window: FrequencyWindow::new(self.history_capacity),
        });
        entry.count += 1;
        entry.window.record(event.timestamp);
    }

    pub fn record_gestures(&self, gestures: &[GestureKind]) {
        let now = Instant::now();
        for kind in gestures {
            self.record(&RecognitionEvent {
                kind: (*kind).into(),
                timestamp: now,
            });
        }
    }

    pub fn record_expressions(&self, expressions: &[ExpressionKind]) {
        let now = Instant::now();
        for kind in expressions {
            self.record(&RecognitionEvent {
                kind: (*kind).into(),
                timestamp: now,
            });
        }
    }

    /// Events per minute over the rolling window; 0.0 for unseen kinds
    pub fn frequency(&self, kind: impl Into<EventKind>) -> f64 {
        self.frequency_at(kind, Instant::now())
    }

    pub fn frequency_at(&self, kind: impl Into<EventKind>, now: Instant) -> f64 {
        let kind = kind.into();
        let state = self.state.lock();
        state
            .kinds
            .get(&kind)
            .map(|stats| stats.window.per_minute(now, self.window))
            .unwrap_or(0.0)
    }

    /// Lifetime count for this session
    pub fn count(&self, kind: impl Into<EventKind>) -> u64 {
        let kind = kind.into();
        self.state
            .lock()
            .kinds
            .get(&kind)
            .map(|stats| stats.count)
            .unwrap_or(0)
    }

    pub fn session_id(&self) -> Uuid {
        self.state.lock().session_id
    }

    /// Storage key for the current session, e.g. `stats_20240101_120000`
    pub fn session_key(&self) -> String {
        self.state.lock().key()
    }

    pub fn snapshot(&self) -> StatsReport {
        let state = self.state.lock();
        self.build_report(&state, Instant::now())
    }

    /// Write the current snapshot under the session key
    pub async fn persist(&self) -> Result<PathBuf, StatsError> {
        let (key, report) = {
            let state = self.state.lock();
            (state.key(), self.build_report(&state, Instant::now()))
        };

        self.store.persist(&key, &report).await
    }

    /// Persist the current session, then start a fresh one.
    ///
    /// The session is cleared even when persisting fails; the error is logged
    /// and returned.
    pub async fn reset(&self) -> Result<PathBuf, StatsError> {
        let (key, report) = {
            let mut state = self.state.lock();
            let key = state.key();
            let report = self.build_report(&state, Instant::now());
            *state = StatsState::new();
            info!("Stats session reset, new session {}", state.session_id);
            (key, report)
        };

        let result = self.store.persist(&key, &report).await;
        if let Err(e) = &result {
            warn!("Failed to persist stats before reset: {}", e);
        }
        result
    }

    fn build_report(&self, state: &StatsState, now: Instant) -> StatsReport {
        let mut gestures = KindReport::default();
        let mut expressions = KindReport::default();

        for (kind, stats) in &state.kinds {
            let report = match kind {
                EventKind::Gesture(_) => &mut gestures,
                EventKind::Expression(_) => &mut expressions,
            };
            let name = kind.name().to_string();
            report.counts.insert(name.clone(), stats.count);
            report.frequencies.insert(
                name,
                round_to(stats.window.per_minute(now, self.window), 1),
            );
        }

        debug!(
            "Stats snapshot: {} gestures, {} expressions",
            gestures.total(),
            expressions.total()
        );

        StatsReport {
            session_id: state.session_id,
            session_started: state.started_at,
            generated_at: Utc::now(),
            session_duration: SessionDuration::from_elapsed(
                now.saturating_duration_since(state.started),
            ),
            gestures,
            expressions,
        }
    }
}
