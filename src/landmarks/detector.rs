use super::types::Landmark;
use crate::error::DetectorError;
use image::RgbImage;

/// One landmark list as reported by a detection model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLandmarkList {
    pub points: Vec<Landmark>,
    /// Classification label, e.g. "Left" for hands
    pub label: Option<String>,
}

impl RawLandmarkList {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self {
            points,
            label: None,
        }
    }

    pub fn labelled(points: Vec<Landmark>, label: &str) -> Self {
        Self {
            points,
            label: Some(label.to_string()),
        }
    }
}

/// Per-frame output of a detection model: zero or more ordered landmark lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub lists: Vec<RawLandmarkList>,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_lists(lists: Vec<RawLandmarkList>) -> Self {
        Self { lists }
    }
}

/// External landmark model for one modality (hands or face).
///
/// Implementations hold model state and are owned by a single pipeline;
/// `reset` discards that state after a failure so the next frame starts clean.
pub trait LandmarkDetector: Send + Sync {
    fn name(&self) -> &str;

    fn process(&mut self, image: &RgbImage) -> Result<DetectionResult, DetectorError>;

    fn reset(&mut self);
}

impl<T: LandmarkDetector + ?Sized> LandmarkDetector for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn process(&mut self, image: &RgbImage) -> Result<DetectionResult, DetectorError> {
        (**self).process(image)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Detector for a disabled modality; always reports nothing
#[derive(Debug, Default)]
pub struct NullDetector;

impl LandmarkDetector for NullDetector {
    fn name(&self) -> &str {
        "null"
    }

    fn process(&mut self, _image: &RgbImage) -> Result<DetectionResult, DetectorError> {
        Ok(DetectionResult::empty())
    }

    fn reset(&mut self) {}
}
