use super::direction::pointing_direction;
use super::types::{ClassifierState, GestureKind, GestureResult};
use crate::config::GestureConfig;
use crate::landmarks::{hand, HandObservation};
use tracing::{debug, trace};

/// Extended state of each finger, thumb first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    /// A finger is extended when its tip sits above its reference joint in image space
    pub fn of(observation: &HandObservation) -> Self {
        let extended =
            |tip: usize, joint: usize| observation.point(tip).y < observation.point(joint).y;
        Self {
            thumb: extended(hand::THUMB_TIP, hand::THUMB_IP),
            index: extended(hand::INDEX_TIP, hand::INDEX_PIP),
            middle: extended(hand::MIDDLE_TIP, hand::MIDDLE_PIP),
            ring: extended(hand::RING_TIP, hand::RING_PIP),
            pinky: extended(hand::PINKY_TIP, hand::PINKY_PIP),
        }
    }

    pub fn from_array(fingers: [bool; 5]) -> Self {
        let [thumb, index, middle, ring, pinky] = fingers;
        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    /// Decision table; first match wins
    pub fn gesture(&self) -> Option<GestureKind> {
        match (self.thumb, self.index, self.middle, self.ring, self.pinky) {
            (false, false, false, false, false) => Some(GestureKind::Fist),
            (true, true, true, true, true) => Some(GestureKind::Palm),
            (true, false, false, false, false) => Some(GestureKind::ThumbUp),
            (false, true, true, false, false) => Some(GestureKind::Peace),
            (false, true, false, false, false) => Some(GestureKind::Pointing),
            _ => None,
        }
    }
}

/// Per-hand gesture classification plus two-hand zoom detection.
///
/// Holds zoom state between calls, so each pipeline owns its own instance.
pub struct GestureClassifier {
    config: GestureConfig,
    state: ClassifierState,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: ClassifierState::default(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    /// Classify the hands observed in one tick
    pub fn classify(&mut self, hands: &[HandObservation]) -> GestureResult {
        self.state.zoom_cooldown = self.state.zoom_cooldown.saturating_sub(1);

        let mut result = GestureResult::default();

        if let Some(zoom) = self.detect_zoom(hands) {
            result.push_unique(zoom);
        }

        for observation in hands {
            if let Some(kind) = FingerStates::of(observation).gesture() {
                result.push_unique(kind);
            }

            // Last hand wins
            if let Some(direction) =
                pointing_direction(observation, self.config.direction_dominance)
            {
                result.direction = Some(direction);
            }
        }

        if !result.gestures.is_empty() {
            trace!("Classified gestures: {:?}", result.gestures);
        }

        result
    }

    pub fn reset(&mut self) {
        self.state = ClassifierState::default();
    }

    fn detect_zoom(&mut self, hands: &[HandObservation]) -> Option<GestureKind> {
        let [first, second] = hands else {
            self.state.previous_two_hand_distance = None;
            return None;
        };

        let distance = first.centroid().distance(&second.centroid());
        let previous = self.state.previous_two_hand_distance.replace(distance)?;

        if self.state.zoom_cooldown > 0 {
            return None;
        }

        let delta = distance - previous;
        if delta.abs() <= self.config.zoom_threshold {
            return None;
        }

        self.state.zoom_cooldown = self.config.zoom_cooldown_ticks;
        let kind = if delta > 0.0 {
            GestureKind::ZoomIn
        } else {
            GestureKind::ZoomOut
        };
        debug!("Detected {} (distance {:.3} -> {:.3})", kind, previous, distance);

        Some(kind)
    }
}
