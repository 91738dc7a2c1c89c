use super::detector::{DetectionResult, RawLandmarkList};
use super::types::{
    FaceObservation, HandObservation, Handedness, Landmark, FACE_LANDMARK_COUNT,
    HAND_LANDMARK_COUNT,
};
use crate::error::DetectorError;
use tracing::trace;

/// Converts raw detector output into hand observations.
/// Every list must hold exactly 21 finite points.
pub fn hands_from_detection(
    result: &DetectionResult,
) -> Result<Vec<HandObservation>, DetectorError> {
    result.lists.iter().map(hand_from_list).collect()
}

/// Converts raw detector output into at most one face observation.
/// Only the first face is tracked; extra faces are ignored.
pub fn face_from_detection(
    result: &DetectionResult,
) -> Result<Option<FaceObservation>, DetectorError> {
    let Some(list) = result.lists.first() else {
        return Ok(None);
    };

    if result.lists.len() > 1 {
        trace!("Ignoring {} additional faces", result.lists.len() - 1);
    }

    if list.points.len() < FACE_LANDMARK_COUNT {
        return Err(DetectorError::MalformedObservation {
            modality: "face",
            details: format!(
                "expected at least {} landmarks, got {}",
                FACE_LANDMARK_COUNT,
                list.points.len()
            ),
        });
    }

    ensure_finite("face", &list.points)?;

    Ok(Some(FaceObservation::from_validated(list.points.clone())))
}

fn hand_from_list(list: &RawLandmarkList) -> Result<HandObservation, DetectorError> {
    let points: [Landmark; HAND_LANDMARK_COUNT] =
        list.points
            .as_slice()
            .try_into()
            .map_err(|_| DetectorError::MalformedObservation {
                modality: "hand",
                details: format!(
                    "expected {} landmarks, got {}",
                    HAND_LANDMARK_COUNT,
                    list.points.len()
                ),
            })?;

    ensure_finite("hand", &points)?;

    let handedness = list
        .label
        .as_deref()
        .map(Handedness::from_label)
        .unwrap_or_default();

    Ok(HandObservation::new(points, handedness))
}

fn ensure_finite(modality: &'static str, points: &[Landmark]) -> Result<(), DetectorError> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(DetectorError::MalformedObservation {
            modality,
            details: format!("landmark {} is not finite", index),
        }),
        None => Ok(()),
    }
}
