use super::synthetic::{FacePose, HandPose};
use super::*;
use crate::error::DetectorError;
use image::RgbImage;

#[test]
fn test_hand_adapter_accepts_21_points() {
    let result = DetectionResult::with_lists(vec![HandPose::palm().raw(), HandPose::fist().raw()]);

    let hands = hands_from_detection(&result).unwrap();

    assert_eq!(hands.len(), 2);
    assert_eq!(hands[0].handedness, Handedness::Right);
    assert_eq!(hands[0], HandPose::palm().observation());
}

#[test]
fn test_hand_adapter_rejects_wrong_length() {
    let mut raw = HandPose::palm().raw();
    raw.points.pop();

    let result = hands_from_detection(&DetectionResult::with_lists(vec![raw]));

    assert!(matches!(
        result,
        Err(DetectorError::MalformedObservation {
            modality: "hand",
            ..
        })
    ));
}

#[test]
fn test_hand_adapter_rejects_nan() {
    let mut raw = HandPose::palm().raw();
    raw.points[hand::INDEX_TIP].y = f32::NAN;

    assert!(hands_from_detection(&DetectionResult::with_lists(vec![raw])).is_err());
}

#[test]
fn test_missing_handedness_label_is_unknown() {
    let raw = RawLandmarkList::new(HandPose::palm().points().to_vec());

    let hands = hands_from_detection(&DetectionResult::with_lists(vec![raw])).unwrap();

    assert_eq!(hands[0].handedness, Handedness::Unknown);
}

#[test]
fn test_face_adapter_tracks_first_face_only() {
    let result = DetectionResult::with_lists(vec![
        FacePose::smiling().raw(),
        FacePose::neutral().raw(),
    ]);

    let face = face_from_detection(&result).unwrap().unwrap();

    assert_eq!(face, FacePose::smiling().observation());
}

#[test]
fn test_face_adapter_requires_full_mesh() {
    let raw = RawLandmarkList::new(vec![Landmark::new(0.5, 0.5); 100]);

    let result = face_from_detection(&DetectionResult::with_lists(vec![raw]));

    assert!(matches!(
        result,
        Err(DetectorError::MalformedObservation {
            modality: "face",
            ..
        })
    ));
    assert!(face_from_detection(&DetectionResult::empty()).unwrap().is_none());
}

#[test]
fn test_centroid_is_mean_of_points() {
    let observation = HandPose::palm().at(0.3, 0.7).observation();
    let shifted = HandPose::palm().at(0.5, 0.7).observation();

    let delta = shifted.centroid().x - observation.centroid().x;

    assert!((delta - 0.2).abs() < 1e-5);
}

#[test]
fn test_scripted_detector_replays_then_goes_quiet() {
    let image = RgbImage::new(4, 4);
    let mut detector = ScriptedDetector::new(
        "hands",
        vec![
            Ok(DetectionResult::with_lists(vec![HandPose::fist().raw()])),
            Err(DetectorError::Inference {
                details: "boom".to_string(),
            }),
        ],
    );
    let probe = detector.probe();

    assert_eq!(detector.process(&image).unwrap().lists.len(), 1);
    assert!(detector.process(&image).is_err());
    assert!(detector.process(&image).unwrap().lists.is_empty());

    detector.reset();
    assert_eq!(probe.calls(), 3);
    assert_eq!(probe.resets(), 1);
}

#[test]
fn test_cycling_detector_wraps_around() {
    let image = RgbImage::new(4, 4);
    let mut detector = ScriptedDetector::cycling(
        "hands",
        vec![
            Ok(DetectionResult::with_lists(vec![HandPose::fist().raw()])),
            Ok(DetectionResult::empty()),
        ],
    );

    let sizes: Vec<usize> = (0..4)
        .map(|_| detector.process(&image).unwrap().lists.len())
        .collect();

    assert_eq!(sizes, vec![1, 0, 1, 0]);
}
