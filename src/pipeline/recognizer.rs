use crate::config::{ExpressionConfig, GestureConfig};
use crate::error::DetectorError;
use crate::expression::{ExpressionDetector, ExpressionKind, FaceMetrics};
use crate::gesture::{GestureClassifier, GestureResult};
use crate::landmarks::{face_from_detection, hands_from_detection, LandmarkDetector, LandmarkSet};
use image::RgbImage;
use tracing::{debug, warn};

/// What one frame produced
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub landmarks: LandmarkSet,
    pub gestures: GestureResult,
    pub expressions: Vec<ExpressionKind>,
    pub face_metrics: Option<FaceMetrics>,
    /// A detector failed and its state was reset this tick
    pub failed: bool,
}

impl Recognition {
    fn failed() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }
}

/// Detectors plus the stateful classifiers that consume their output.
/// Owned by one orchestrator and never shared.
pub struct Recognizer {
    hand_detector: Box<dyn LandmarkDetector>,
    face_detector: Box<dyn LandmarkDetector>,
    classifier: GestureClassifier,
    expressions: ExpressionDetector,
    failures: u64,
}

impl Recognizer {
    pub fn new(
        hand_detector: Box<dyn LandmarkDetector>,
        face_detector: Box<dyn LandmarkDetector>,
        gesture_config: GestureConfig,
        expression_config: ExpressionConfig,
    ) -> Self {
        debug!(
            "Recognizer using '{}' for hands and '{}' for faces",
            hand_detector.name(),
            face_detector.name()
        );

        Self {
            hand_detector,
            face_detector,
            classifier: GestureClassifier::new(gesture_config),
            expressions: ExpressionDetector::new(expression_config),
            failures: 0,
        }
    }

    /// Run detection and classification on one frame. Detector failures reset
    /// the detectors and yield an empty, failed recognition.
    pub fn recognize(&mut self, image: &RgbImage, detect_face: bool) -> Recognition {
        let landmarks = match self.observe(image, detect_face) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                self.failures += 1;
                warn!("Landmark detection failed, resetting detectors: {}", e);
                self.reset_detectors();
                return Recognition::failed();
            }
        };

        let gestures = self.classifier.classify(&landmarks.hands);
        let (expressions, face_metrics) = if detect_face {
            let expressions = self.expressions.detect(landmarks.face.as_ref(), image.dimensions());
            let metrics = landmarks
                .face
                .as_ref()
                .and(self.expressions.last_metrics());
            (expressions, metrics)
        } else {
            (Vec::new(), None)
        };

        Recognition {
            landmarks,
            gestures,
            expressions,
            face_metrics,
            failed: false,
        }
    }

    fn observe(&mut self, image: &RgbImage, detect_face: bool) -> Result<LandmarkSet, DetectorError> {
        let hands = hands_from_detection(&self.hand_detector.process(image)?)?;
        let face = if detect_face {
            face_from_detection(&self.face_detector.process(image)?)?
        } else {
            None
        };

        Ok(LandmarkSet { hands, face })
    }

    fn reset_detectors(&mut self) {
        self.hand_detector.reset();
        self.face_detector.reset();
    }

    /// Drop expression history, e.g. when face recognition is toggled
    pub fn reset_expressions(&mut self) {
        self.expressions.reset();
    }

    /// Reset detectors and all temporal state
    pub fn reset(&mut self) {
        self.reset_detectors();
        self.classifier.reset();
        self.expressions.reset();
    }

    /// Detector failures since creation
    pub fn failures(&self) -> u64 {
        self.failures
    }
}
