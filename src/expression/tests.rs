use super::*;
use crate::config::ExpressionConfig;
use crate::landmarks::synthetic::FacePose;
use crate::landmarks::{face, FaceObservation, Landmark};

const FRAME: (u32, u32) = (640, 480);

fn create_test_detector() -> ExpressionDetector {
    ExpressionDetector::new(ExpressionConfig::default())
}

fn run(detector: &mut ExpressionDetector, poses: &[FacePose]) -> Vec<(usize, ExpressionKind)> {
    let mut fired = Vec::new();
    for (i, pose) in poses.iter().enumerate() {
        let observation = pose.observation();
        for kind in detector.detect(Some(&observation), FRAME) {
            fired.push((i + 1, kind));
        }
    }
    fired
}

#[test]
fn test_history_evicts_oldest() {
    let mut history = StateHistory::new(3);
    for value in [true, true, false, false] {
        history.push(value);
    }

    assert_eq!(history.len(), 3);
    assert_eq!(history.count_recent(3), 1);
    assert_eq!(history.count_recent(1), 0);
    assert_eq!(history.latest(), Some(false));

    history.clear();
    assert!(history.is_empty());
    assert_eq!(history.latest(), None);
}

#[test]
fn test_face_metrics_for_synthetic_poses() {
    let open = FaceMetrics::measure(&FacePose::neutral().observation(), FRAME, 0.2, 3.5);
    assert!((open.left_eye_ratio - 0.25).abs() < 1e-3);
    assert!((open.right_eye_ratio - 0.25).abs() < 1e-3);
    assert!(!open.left_eye_closed && !open.right_eye_closed);
    assert!((open.mouth_ratio - 2.6667).abs() < 1e-3);
    assert!(!open.smiling);

    let closed = FaceMetrics::measure(&FacePose::eyes_closed().observation(), FRAME, 0.2, 3.5);
    assert!((closed.left_eye_ratio - 0.05).abs() < 1e-3);
    assert!(closed.left_eye_closed && closed.right_eye_closed);

    let smiling = FaceMetrics::measure(&FacePose::smiling().observation(), FRAME, 0.2, 3.5);
    assert!((smiling.mouth_ratio - 6.6667).abs() < 1e-3);
    assert!(smiling.smiling);
}

#[test]
fn test_ratios_are_measured_in_pixels() {
    let mut points = FacePose::neutral().points();
    points[face::MOUTH_LEFT] = Landmark::new(0.455, 0.6);
    points[face::MOUTH_RIGHT] = Landmark::new(0.545, 0.6);
    points[face::MOUTH_UPPER_INNER] = Landmark::new(0.5, 0.585);
    points[face::MOUTH_LOWER_INNER] = Landmark::new(0.5, 0.615);
    let observation = FaceObservation::from_validated(points);

    // 0.09 wide and 0.03 tall: 57.6px / 14.4px on 640x480, 30px / 10px on 333x333
    assert!((mouth_aspect_ratio(&observation, (640, 480)) - 4.0).abs() < 1e-3);
    assert!((mouth_aspect_ratio(&observation, (333, 333)) - 3.0).abs() < 1e-2);

    assert!(FaceMetrics::measure(&observation, (640, 480), 0.2, 3.5).smiling);
    assert!(!FaceMetrics::measure(&observation, (480, 480), 0.2, 3.5).smiling);
}

#[test]
fn test_eye_ratio_averages_matched_lid_pairs() {
    let mut points = FacePose::neutral().points();
    let [upper_a, upper_b] = face::LEFT_EYE_UPPER;
    let [lower_a, lower_b] = face::LEFT_EYE_LOWER;
    points[face::LEFT_EYE_INNER] = Landmark::new(0.45, 0.5);
    points[face::LEFT_EYE_OUTER] = Landmark::new(0.55, 0.5);
    points[upper_a] = Landmark::new(0.47, 0.49);
    points[lower_a] = Landmark::new(0.47, 0.51);
    points[upper_b] = Landmark::new(0.53, 0.48);
    points[lower_b] = Landmark::new(0.53, 0.52);
    let observation = FaceObservation::from_validated(points);

    let ratio = eye_aspect_ratio(
        &observation,
        (100, 100),
        face::LEFT_EYE_UPPER,
        face::LEFT_EYE_LOWER,
        face::LEFT_EYE_INNER,
        face::LEFT_EYE_OUTER,
    );

    // Pairs open 2px and 4px over a 10px width
    assert!((ratio - 0.3).abs() < 1e-4);
}

#[test]
fn test_degenerate_geometry() {
    let mut points = FacePose::neutral().points();
    points[face::LEFT_EYE_OUTER] = points[face::LEFT_EYE_INNER];
    points[face::MOUTH_LOWER_INNER] = points[face::MOUTH_UPPER_INNER];
    let observation = FaceObservation::from_validated(points);

    let eye = eye_aspect_ratio(
        &observation,
        FRAME,
        face::LEFT_EYE_UPPER,
        face::LEFT_EYE_LOWER,
        face::LEFT_EYE_INNER,
        face::LEFT_EYE_OUTER,
    );

    assert_eq!(eye, 1.0);
    assert_eq!(mouth_aspect_ratio(&observation, FRAME), 0.0);
}

#[test]
fn test_steady_closure_is_not_a_blink() {
    let mut detector = create_test_detector();

    let fired = run(&mut detector, &[FacePose::eyes_closed(); 30]);

    assert!(fired.is_empty());
}

#[test]
fn test_blink_requires_reopening() {
    let mut detector = create_test_detector();
    let poses = [
        FacePose::eyes_closed(),
        FacePose::eyes_closed(),
        FacePose::eyes_closed(),
        FacePose::neutral(),
    ];

    let fired = run(&mut detector, &poses);

    assert_eq!(fired, vec![(4, ExpressionKind::Blink)]);
    assert_eq!(detector.cooldowns().0, 15);
}

#[test]
fn test_single_eye_wink_counts_as_blink() {
    let mut detector = create_test_detector();
    let wink = FacePose {
        left_eye_open: false,
        ..FacePose::neutral()
    };

    let fired = run(
        &mut detector,
        &[FacePose::neutral(), wink, wink, FacePose::neutral()],
    );

    assert_eq!(fired, vec![(4, ExpressionKind::Blink)]);
}

#[test]
fn test_blink_needs_full_window() {
    let mut detector = create_test_detector();

    let fired = run(
        &mut detector,
        &[FacePose::eyes_closed(), FacePose::neutral()],
    );

    assert!(fired.is_empty());
}

#[test]
fn test_blink_cooldown_suppresses_repeats() {
    let mut detector = create_test_detector();
    let mut poses = Vec::new();
    for _ in 0..5 {
        poses.extend([
            FacePose::eyes_closed(),
            FacePose::eyes_closed(),
            FacePose::neutral(),
        ]);
    }

    let fired = run(&mut detector, &poses);

    // Blinks complete at ticks 3, 6, 9, 12, 15; the cooldown admits 3 and 18+
    assert_eq!(fired, vec![(3, ExpressionKind::Blink)]);
}

#[test]
fn test_continuous_smile_fires_at_5_and_20() {
    let mut detector = create_test_detector();

    let fired = run(&mut detector, &[FacePose::smiling(); 20]);

    assert_eq!(
        fired,
        vec![(5, ExpressionKind::Smile), (20, ExpressionKind::Smile)]
    );
}

#[test]
fn test_smile_rate_limit_over_50_ticks() {
    let mut detector = create_test_detector();

    let fired = run(&mut detector, &[FacePose::smiling(); 50]);

    assert_eq!(fired.len(), 4);
    assert!(fired.iter().all(|(_, kind)| *kind == ExpressionKind::Smile));
}

#[test]
fn test_smile_tolerates_one_flicker() {
    let mut detector = create_test_detector();
    let poses = [
        FacePose::smiling(),
        FacePose::smiling(),
        FacePose::neutral(),
        FacePose::smiling(),
        FacePose::smiling(),
    ];

    let fired = run(&mut detector, &poses);

    assert_eq!(fired, vec![(5, ExpressionKind::Smile)]);
}

#[test]
fn test_missing_face_advances_cooldown_only() {
    let mut detector = create_test_detector();
    run(&mut detector, &[FacePose::smiling(); 5]);
    assert_eq!(detector.cooldowns().1, 15);
    let recorded = detector.history_len();

    for _ in 0..15 {
        assert!(detector.detect(None, FRAME).is_empty());
    }

    assert_eq!(detector.cooldowns(), (0, 0));
    assert_eq!(detector.history_len(), recorded);
    assert!(detector.last_metrics().is_none());

    // History still holds five smiles, so the next smiling face fires at once
    let observation = FacePose::smiling().observation();
    assert_eq!(detector.detect(Some(&observation), FRAME), vec![ExpressionKind::Smile]);
}

#[test]
fn test_reset_clears_history_and_cooldowns() {
    let mut detector = create_test_detector();
    run(&mut detector, &[FacePose::smiling(); 5]);

    detector.reset();

    assert_eq!(detector.cooldowns(), (0, 0));
    assert_eq!(detector.history_len(), 0);
    let fired = run(&mut detector, &[FacePose::smiling(); 4]);
    assert!(fired.is_empty());
}
