mod detector;
mod geometry;
mod history;
#[cfg(test)]
mod tests;

pub use detector::{ExpressionDetector, ExpressionKind};
pub use geometry::{eye_aspect_ratio, mouth_aspect_ratio, FaceMetrics};
pub use history::StateHistory;
