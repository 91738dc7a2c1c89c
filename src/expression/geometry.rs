use crate::landmarks::{face, FaceObservation};
use serde::{Deserialize, Serialize};

/// Geometric signals measured on one face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMetrics {
    pub left_eye_ratio: f32,
    pub right_eye_ratio: f32,
    pub mouth_ratio: f32,
    pub left_eye_closed: bool,
    pub right_eye_closed: bool,
    pub smiling: bool,
}

impl FaceMetrics {
    /// Measure on a frame of `frame` (width, height) pixels. Thresholds apply
    /// to pixel-space ratios, so the frame aspect matters.
    pub fn measure(
        observation: &FaceObservation,
        frame: (u32, u32),
        eye_closed_ratio: f32,
        smile_ratio: f32,
    ) -> Self {
        let left_eye_ratio = eye_aspect_ratio(
            observation,
            frame,
            face::LEFT_EYE_UPPER,
            face::LEFT_EYE_LOWER,
            face::LEFT_EYE_INNER,
            face::LEFT_EYE_OUTER,
        );
        let right_eye_ratio = eye_aspect_ratio(
            observation,
            frame,
            face::RIGHT_EYE_UPPER,
            face::RIGHT_EYE_LOWER,
            face::RIGHT_EYE_OUTER,
            face::RIGHT_EYE_INNER,
        );
        let mouth_ratio = mouth_aspect_ratio(observation, frame);

        Self {
            left_eye_ratio,
            right_eye_ratio,
            mouth_ratio,
            left_eye_closed: left_eye_ratio < eye_closed_ratio,
            right_eye_closed: right_eye_ratio < eye_closed_ratio,
            smiling: mouth_ratio > smile_ratio,
        }
    }
}

fn pixel_distance(observation: &FaceObservation, a: usize, b: usize, frame: (u32, u32)) -> f32 {
    let (ax, ay) = observation.point(a).to_pixel(frame.0, frame.1);
    let (bx, by) = observation.point(b).to_pixel(frame.0, frame.1);
    (ax - bx).hypot(ay - by)
}

/// Mean lid opening over the upper/lower landmark pairs (`upper[i]` with
/// `lower[i]`) divided by the corner-to-corner width, in pixels. A degenerate
/// width reads as fully open (1.0).
pub fn eye_aspect_ratio(
    observation: &FaceObservation,
    frame: (u32, u32),
    upper: [usize; 2],
    lower: [usize; 2],
    corner_a: usize,
    corner_b: usize,
) -> f32 {
    let width = pixel_distance(observation, corner_a, corner_b, frame);
    if width <= f32::EPSILON {
        return 1.0;
    }

    let height = upper
        .iter()
        .zip(lower.iter())
        .map(|(top, bottom)| pixel_distance(observation, *top, *bottom, frame))
        .sum::<f32>()
        / upper.len() as f32;

    height / width
}

/// Mouth corner distance divided by the inner-lip opening, in pixels.
/// A closed opening of zero reads as 0.0.
pub fn mouth_aspect_ratio(observation: &FaceObservation, frame: (u32, u32)) -> f32 {
    let width = pixel_distance(observation, face::MOUTH_LEFT, face::MOUTH_RIGHT, frame);
    let height = pixel_distance(
        observation,
        face::MOUTH_UPPER_INNER,
        face::MOUTH_LOWER_INNER,
        frame,
    );

    if height <= f32::EPSILON {
        return 0.0;
    }

    width / height
}
