use super::geometry::FaceMetrics;
use super::history::StateHistory;
use crate::config::ExpressionConfig;
use crate::landmarks::FaceObservation;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    Blink,
    Smile,
}

impl ExpressionKind {
    pub const ALL: [ExpressionKind; 2] = [ExpressionKind::Blink, ExpressionKind::Smile];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionKind::Blink => "blink",
            ExpressionKind::Smile => "smile",
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debounced blink and smile detection over a short history of face states
pub struct ExpressionDetector {
    config: ExpressionConfig,
    left_eye_closed: StateHistory,
    right_eye_closed: StateHistory,
    smiling: StateHistory,
    blink_cooldown: u32,
    smile_cooldown: u32,
    last_metrics: Option<FaceMetrics>,
}

impl ExpressionDetector {
    pub fn new(config: ExpressionConfig) -> Self {
        let capacity = config.history_capacity;
        Self {
            config,
            left_eye_closed: StateHistory::new(capacity),
            right_eye_closed: StateHistory::new(capacity),
            smiling: StateHistory::new(capacity),
            blink_cooldown: 0,
            smile_cooldown: 0,
            last_metrics: None,
        }
    }

    /// Process one tick on a frame of `frame` (width, height) pixels.
    /// Cooldowns advance even when no face is present; without a face nothing
    /// is recorded and nothing fires.
    pub fn detect(
        &mut self,
        face: Option<&FaceObservation>,
        frame: (u32, u32),
    ) -> Vec<ExpressionKind> {
        self.blink_cooldown = self.blink_cooldown.saturating_sub(1);
        self.smile_cooldown = self.smile_cooldown.saturating_sub(1);

        let Some(observation) = face else {
            self.last_metrics = None;
            return Vec::new();
        };

        let metrics = FaceMetrics::measure(
            observation,
            frame,
            self.config.eye_closed_ratio,
            self.config.smile_ratio,
        );
        trace!(
            "Face metrics: left {:.3}, right {:.3}, mouth {:.3}",
            metrics.left_eye_ratio,
            metrics.right_eye_ratio,
            metrics.mouth_ratio
        );

        self.left_eye_closed.push(metrics.left_eye_closed);
        self.right_eye_closed.push(metrics.right_eye_closed);
        self.smiling.push(metrics.smiling);
        self.last_metrics = Some(metrics);

        let mut expressions = Vec::new();

        if self.blink_cooldown == 0 && self.blink_ready() {
            self.blink_cooldown = self.config.cooldown_ticks;
            info!("Blink detected");
            expressions.push(ExpressionKind::Blink);
        }

        if self.smile_cooldown == 0 && self.smile_ready() {
            self.smile_cooldown = self.config.cooldown_ticks;
            info!("Smile detected");
            expressions.push(ExpressionKind::Smile);
        }

        expressions
    }

    /// Metrics from the most recent tick that had a face
    pub fn last_metrics(&self) -> Option<FaceMetrics> {
        self.last_metrics
    }

    pub fn cooldowns(&self) -> (u32, u32) {
        (self.blink_cooldown, self.smile_cooldown)
    }

    pub fn history_len(&self) -> usize {
        self.smiling.len()
    }

    pub fn reset(&mut self) {
        self.left_eye_closed.clear();
        self.right_eye_closed.clear();
        self.smiling.clear();
        self.blink_cooldown = 0;
        self.smile_cooldown = 0;
        self.last_metrics = None;
    }

    // Both eyes need a full window; either eye may produce the blink
    fn blink_ready(&self) -> bool {
        let window = self.config.blink_window;
        if self.left_eye_closed.len() < window || self.right_eye_closed.len() < window {
            return false;
        }

        [&self.left_eye_closed, &self.right_eye_closed]
            .into_iter()
            .any(|eye| eye.count_recent(window) + 1 >= window && eye.latest() == Some(false))
    }

    fn smile_ready(&self) -> bool {
        let window = self.config.smile_window;
        self.smiling.len() >= window && self.smiling.count_recent(window) + 1 >= window
    }
}
