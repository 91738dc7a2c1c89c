use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Bounded per-kind timestamp history used for events-per-minute figures
#[derive(Debug, Clone)]
pub struct FrequencyWindow {
    timestamps: VecDeque<Instant>,
    capacity: usize,
}

impl FrequencyWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            timestamps: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an occurrence. Timestamps stay non-decreasing: one older than
    /// the latest recorded is stored as the latest.
    pub fn record(&mut self, at: Instant) {
        let at = match self.timestamps.back() {
            Some(last) if at < *last => *last,
            _ => at,
        };

        if self.timestamps.len() == self.capacity {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(at);
    }

    /// Occurrences at most `window` old as seen from `now`
    pub fn count_within(&self, now: Instant, window: Duration) -> usize {
        self.timestamps
            .iter()
            .rev()
            .take_while(|ts| now.saturating_duration_since(**ts) <= window)
            .count()
    }

    /// Events per minute over `window`
    pub fn per_minute(&self, now: Instant, window: Duration) -> f64 {
        if self.timestamps.is_empty() || window.is_zero() {
            return 0.0;
        }
        self.count_within(now, window) as f64 * (60.0 / window.as_secs_f64())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
