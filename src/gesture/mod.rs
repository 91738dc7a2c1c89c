mod classifier;
mod direction;
mod types;

pub use classifier::{FingerStates, GestureClassifier};
pub use direction::{direction_label, pointing_direction};
pub use types::{ClassifierState, DirectionLabel, GestureKind, GestureResult, PointingDirection};
