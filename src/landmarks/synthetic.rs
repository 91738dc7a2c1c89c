//! Landmark layouts with known geometry, for the demo binary and tests.

use super::detector::RawLandmarkList;
use super::types::{
    face, hand, FaceObservation, HandObservation, Handedness, Landmark, FACE_LANDMARK_COUNT,
    HAND_LANDMARK_COUNT,
};

const FINGER_LENGTH: f32 = 0.1;
const JOINT_OFFSET: f32 = 0.03;

/// Hand pose described by which fingers are extended and where the index finger points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    pub center: (f32, f32),
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
    /// Index finger direction in image space; (0,0) places the tip on its base
    pub pointing: (f32, f32),
    pub handedness: Handedness,
}

impl HandPose {
    pub fn new(fingers: [bool; 5]) -> Self {
        let [thumb, index, middle, ring, pinky] = fingers;
        Self {
            center: (0.5, 0.5),
            thumb,
            index,
            middle,
            ring,
            pinky,
            pointing: (0.0, -1.0),
            handedness: Handedness::Right,
        }
    }

    pub fn fist() -> Self {
        Self::new([false; 5])
    }

    pub fn palm() -> Self {
        Self::new([true; 5])
    }

    pub fn pointing(dx: f32, dy: f32) -> Self {
        Self::new([false, true, false, false, false]).toward(dx, dy)
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.center = (x, y);
        self
    }

    pub fn toward(mut self, dx: f32, dy: f32) -> Self {
        self.pointing = (dx, dy);
        self
    }

    pub fn points(&self) -> [Landmark; HAND_LANDMARK_COUNT] {
        let (cx, cy) = self.center;
        let mut points = [Landmark::new(cx, cy); HAND_LANDMARK_COUNT];

        let fingers = [
            (hand::THUMB_IP, hand::THUMB_TIP, self.thumb, -0.06),
            (hand::MIDDLE_PIP, hand::MIDDLE_TIP, self.middle, 0.02),
            (hand::RING_PIP, hand::RING_TIP, self.ring, 0.04),
            (hand::PINKY_PIP, hand::PINKY_TIP, self.pinky, 0.06),
        ];
        for (joint, tip, extended, x_offset) in fingers {
            let tip_point = Landmark::new(cx + x_offset, cy - FINGER_LENGTH);
            points[tip] = tip_point;
            points[joint] = Landmark::new(tip_point.x, joint_y(tip_point.y, extended));
        }

        let (dx, dy) = self.pointing;
        let len = (dx * dx + dy * dy).sqrt();
        let mcp = Landmark::new(cx, cy);
        let tip = if len > 0.0 {
            Landmark::new(
                cx + dx / len * FINGER_LENGTH,
                cy + dy / len * FINGER_LENGTH,
            )
        } else {
            mcp
        };
        points[hand::INDEX_MCP] = mcp;
        points[hand::INDEX_TIP] = tip;
        points[hand::INDEX_PIP] = Landmark::new(tip.x, joint_y(tip.y, self.index));

        points
    }

    pub fn observation(&self) -> HandObservation {
        HandObservation::new(self.points(), self.handedness)
    }

    pub fn raw(&self) -> RawLandmarkList {
        let label = match self.handedness {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
            Handedness::Unknown => "Unknown",
        };
        RawLandmarkList::labelled(self.points().to_vec(), label)
    }
}

fn joint_y(tip_y: f32, extended: bool) -> f32 {
    if extended {
        tip_y + JOINT_OFFSET
    } else {
        tip_y - JOINT_OFFSET
    }
}

/// Face pose with eye and mouth state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePose {
    pub left_eye_open: bool,
    pub right_eye_open: bool,
    pub smiling: bool,
}

impl FacePose {
    pub fn neutral() -> Self {
        Self {
            left_eye_open: true,
            right_eye_open: true,
            smiling: false,
        }
    }

    pub fn eyes_closed() -> Self {
        Self {
            left_eye_open: false,
            right_eye_open: false,
            smiling: false,
        }
    }

    pub fn smiling() -> Self {
        Self {
            smiling: true,
            ..Self::neutral()
        }
    }

    pub fn points(&self) -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.5); FACE_LANDMARK_COUNT];

        place_eye(
            &mut points,
            0.56,
            self.left_eye_open,
            (face::LEFT_EYE_INNER, face::LEFT_EYE_OUTER),
            face::LEFT_EYE_UPPER,
            face::LEFT_EYE_LOWER,
        );
        place_eye(
            &mut points,
            0.44,
            self.right_eye_open,
            (face::RIGHT_EYE_OUTER, face::RIGHT_EYE_INNER),
            face::RIGHT_EYE_UPPER,
            face::RIGHT_EYE_LOWER,
        );

        // On a 4:3 frame opening 0.02 gives ratio 6.67, opening 0.05 gives 2.67
        let opening = if self.smiling { 0.02 } else { 0.05 };
        points[face::MOUTH_LEFT] = Landmark::new(0.45, 0.6);
        points[face::MOUTH_RIGHT] = Landmark::new(0.55, 0.6);
        points[face::MOUTH_UPPER_INNER] = Landmark::new(0.5, 0.6 - opening / 2.0);
        points[face::MOUTH_LOWER_INNER] = Landmark::new(0.5, 0.6 + opening / 2.0);

        points
    }

    pub fn observation(&self) -> FaceObservation {
        FaceObservation::from_validated(self.points())
    }

    pub fn raw(&self) -> RawLandmarkList {
        RawLandmarkList::new(self.points())
    }
}

// Eye width 0.06; on a 4:3 frame open gap 0.02 gives ratio 0.25, closed gap 0.004 gives 0.05
fn place_eye(
    points: &mut [Landmark],
    center_x: f32,
    open: bool,
    corners: (usize, usize),
    upper: [usize; 2],
    lower: [usize; 2],
) {
    let center_y = 0.4;
    let gap = if open { 0.02 } else { 0.004 };

    points[corners.0] = Landmark::new(center_x - 0.03, center_y);
    points[corners.1] = Landmark::new(center_x + 0.03, center_y);

    for (i, (top, bottom)) in upper.iter().zip(lower.iter()).enumerate() {
        let x = center_x - 0.01 + 0.02 * i as f32;
        points[*top] = Landmark::new(x, center_y - gap / 2.0);
        points[*bottom] = Landmark::new(x, center_y + gap / 2.0);
    }
}
