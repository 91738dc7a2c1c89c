mod adapter;
mod detector;
mod scripted;
pub mod synthetic;
mod types;
#[cfg(test)]
mod tests;

pub use adapter::{face_from_detection, hands_from_detection};
pub use detector::{DetectionResult, LandmarkDetector, NullDetector, RawLandmarkList};
pub use scripted::{DetectorProbe, ScriptedDetector};
pub use types::{
    face, hand, FaceObservation, HandObservation, Handedness, Landmark, LandmarkSet,
    FACE_LANDMARK_COUNT, HAND_LANDMARK_COUNT,
};
