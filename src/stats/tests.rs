use super::*;
use crate::config::StatsConfig;
use crate::error::StatsError;
use crate::expression::ExpressionKind;
use crate::gesture::GestureKind;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn create_test_config(path: &str) -> StatsConfig {
    StatsConfig {
        path: path.to_string(),
        window_seconds: 60,
        history_capacity: 100,
        persist_every_frames: 100,
    }
}

fn create_memory_aggregator() -> (StatsAggregator, Arc<MemoryStatsStore>) {
    let store = Arc::new(MemoryStatsStore::new());
    let aggregator = StatsAggregator::new(&create_test_config("unused"), store.clone());
    (aggregator, store)
}

struct FailingStore;

#[async_trait]
impl StatsStore for FailingStore {
    async fn persist(&self, key: &str, _report: &StatsReport) -> Result<PathBuf, StatsError> {
        Err(StatsError::Write {
            path: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn test_window_counts_recent_only() {
    let mut window = FrequencyWindow::new(10);
    let start = Instant::now();
    window.record(start);
    window.record(start + Duration::from_secs(30));
    window.record(start + Duration::from_secs(50));

    let now = start + Duration::from_secs(70);
    assert_eq!(window.count_within(now, Duration::from_secs(60)), 2);
    assert_eq!(window.per_minute(now, Duration::from_secs(60)), 2.0);
    // One event inside a 30s window, scaled to a minute
    assert_eq!(window.per_minute(now, Duration::from_secs(30)), 2.0);
}

#[test]
fn test_window_keeps_timestamps_monotonic() {
    let mut window = FrequencyWindow::new(10);
    let start = Instant::now();
    window.record(start + Duration::from_secs(100));
    window.record(start);

    // The late entry was clamped forward, so both are still in the window
    let now = start + Duration::from_secs(120);
    assert_eq!(window.count_within(now, Duration::from_secs(60)), 2);
}

#[test]
fn test_window_capacity_evicts_oldest() {
    let mut window = FrequencyWindow::new(100);
    let now = Instant::now();
    for _ in 0..150 {
        window.record(now);
    }

    assert_eq!(window.len(), 100);
    assert_eq!(window.per_minute(now, Duration::from_secs(60)), 100.0);
}

#[test]
fn test_frequency_of_unseen_kind_is_zero() {
    let (aggregator, _) = create_memory_aggregator();

    assert_eq!(aggregator.frequency(GestureKind::Palm), 0.0);
    assert_eq!(aggregator.frequency(ExpressionKind::Blink), 0.0);
    assert_eq!(aggregator.count(GestureKind::Palm), 0);
}

#[test]
fn test_frequency_matches_events_in_window() {
    let (aggregator, _) = create_memory_aggregator();

    for _ in 0..7 {
        aggregator.record_gestures(&[GestureKind::Peace]);
    }

    assert_eq!(aggregator.count(GestureKind::Peace), 7);
    assert!((aggregator.frequency(GestureKind::Peace) - 7.0).abs() < 1e-9);

    let later = Instant::now() + Duration::from_secs(61);
    assert_eq!(aggregator.frequency_at(GestureKind::Peace, later), 0.0);
    assert_eq!(aggregator.count(GestureKind::Peace), 7);
}

#[test]
fn test_frequency_window_includes_its_edge() {
    let (aggregator, _) = create_memory_aggregator();
    let recorded = Instant::now();
    aggregator.record(&RecognitionEvent {
        kind: GestureKind::Fist.into(),
        timestamp: recorded,
    });

    let edge = recorded + Duration::from_secs(60);
    assert_eq!(aggregator.frequency_at(GestureKind::Fist, edge), 1.0);
    let past_edge = edge + Duration::from_millis(1);
    assert_eq!(aggregator.frequency_at(GestureKind::Fist, past_edge), 0.0);
}

#[test]
fn test_frequency_scales_with_window() {
    let store = Arc::new(MemoryStatsStore::new());
    let mut config = create_test_config("unused");
    config.window_seconds = 30;
    let aggregator = StatsAggregator::new(&config, store);

    aggregator.record_expressions(&[ExpressionKind::Smile, ExpressionKind::Smile]);
    aggregator.record_expressions(&[ExpressionKind::Smile]);

    assert!((aggregator.frequency(ExpressionKind::Smile) - 6.0).abs() < 1e-9);
}

#[test]
fn test_lifetime_count_outlives_history_capacity() {
    let (aggregator, _) = create_memory_aggregator();

    for _ in 0..150 {
        aggregator.record(&RecognitionEvent::now(GestureKind::Fist));
    }

    assert_eq!(aggregator.count(GestureKind::Fist), 150);
    assert!((aggregator.frequency(GestureKind::Fist) - 100.0).abs() < 1e-9);
}

#[test]
fn test_snapshot_shape() {
    let (aggregator, _) = create_memory_aggregator();
    aggregator.record_gestures(&[GestureKind::ThumbUp, GestureKind::ZoomIn]);
    aggregator.record_gestures(&[GestureKind::ThumbUp]);
    aggregator.record_expressions(&[ExpressionKind::Blink]);

    let report = aggregator.snapshot();

    assert_eq!(report.session_id, aggregator.session_id());
    assert_eq!(report.gestures.counts.get("thumb_up"), Some(&2));
    assert_eq!(report.gestures.counts.get("zoom_in"), Some(&1));
    assert_eq!(report.gestures.frequencies.get("thumb_up"), Some(&2.0));
    assert!(report.gestures.frequencies.get("palm").is_none());
    assert_eq!(report.expressions.counts.get("blink"), Some(&1));
    assert_eq!(report.gestures.total(), 3);
    assert!(report.session_duration.seconds >= 0.0);
    assert!(report.session_duration.hours < 1.0);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["session_duration"]["minutes"].is_number());
    assert_eq!(json["gestures"]["counts"]["thumb_up"], 2);
}

#[test]
fn test_session_duration_rounding() {
    let duration = SessionDuration::from_elapsed(Duration::from_millis(5_432_100));

    assert_eq!(duration.seconds, 5432.1);
    assert_eq!(duration.minutes, 90.5);
    assert_eq!(duration.hours, 1.51);
}

#[test]
fn test_session_key_format() {
    let (aggregator, _) = create_memory_aggregator();

    let key = aggregator.session_key();

    assert!(key.starts_with("stats_"));
    assert_eq!(key.len(), "stats_YYYYmmdd_HHMMSS".len());
}

#[tokio::test]
async fn test_persist_writes_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let stats_dir = temp_dir.path().join("stats");
    let config = create_test_config(&stats_dir.to_string_lossy());
    let aggregator = StatsAggregator::with_json_store(&config);
    aggregator.record_gestures(&[GestureKind::Palm]);

    let path = aggregator.persist().await.unwrap();

    assert_eq!(
        path,
        stats_dir.join(format!("{}.json", aggregator.session_key()))
    );
    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let report: StatsReport = serde_json::from_str(&contents).unwrap();
    assert_eq!(report.gestures.counts.get("palm"), Some(&1));

    // Same session, same file
    aggregator.record_gestures(&[GestureKind::Palm]);
    let again = aggregator.persist().await.unwrap();
    assert_eq!(again, path);
}

#[tokio::test]
async fn test_reset_persists_then_clears() {
    let (aggregator, store) = create_memory_aggregator();
    aggregator.record_gestures(&[GestureKind::Peace]);
    let old_session = aggregator.session_id();
    let old_key = aggregator.session_key();

    aggregator.reset().await.unwrap();

    let saved = store.get(&old_key).unwrap();
    assert_eq!(saved.session_id, old_session);
    assert_eq!(saved.gestures.counts.get("peace"), Some(&1));

    assert_ne!(aggregator.session_id(), old_session);
    assert_eq!(aggregator.count(GestureKind::Peace), 0);
    assert_eq!(aggregator.frequency(GestureKind::Peace), 0.0);
    assert!(aggregator.snapshot().gestures.counts.is_empty());
}

#[tokio::test]
async fn test_persistence_failure_is_reported_not_fatal() {
    let aggregator = StatsAggregator::new(&create_test_config("unused"), Arc::new(FailingStore));
    aggregator.record_gestures(&[GestureKind::Fist]);

    assert!(aggregator.persist().await.is_err());
    assert_eq!(aggregator.count(GestureKind::Fist), 1);

    assert!(aggregator.reset().await.is_err());
    assert_eq!(aggregator.count(GestureKind::Fist), 0);

    aggregator.record_gestures(&[GestureKind::Fist]);
    assert_eq!(aggregator.count(GestureKind::Fist), 1);
}

#[tokio::test]
async fn test_handles_share_one_session() {
    let (aggregator, _) = create_memory_aggregator();

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let handle = aggregator.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..250 {
                handle.record_gestures(&[GestureKind::Pointing]);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(aggregator.count(GestureKind::Pointing), 1000);
}
