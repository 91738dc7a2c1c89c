use serde::{Deserialize, Serialize};

/// Hand landmarks per observation
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Minimum landmarks per face observation
pub const FACE_LANDMARK_COUNT: usize = 468;

/// Indices into a hand observation
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Bone connections used for drawing the hand skeleton
    pub const CONNECTIONS: [(usize, usize); 21] = [
        (WRIST, THUMB_CMC),
        (THUMB_CMC, THUMB_MCP),
        (THUMB_MCP, THUMB_IP),
        (THUMB_IP, THUMB_TIP),
        (WRIST, INDEX_MCP),
        (INDEX_MCP, INDEX_PIP),
        (INDEX_PIP, INDEX_DIP),
        (INDEX_DIP, INDEX_TIP),
        (INDEX_MCP, MIDDLE_MCP),
        (MIDDLE_MCP, MIDDLE_PIP),
        (MIDDLE_PIP, MIDDLE_DIP),
        (MIDDLE_DIP, MIDDLE_TIP),
        (MIDDLE_MCP, RING_MCP),
        (RING_MCP, RING_PIP),
        (RING_PIP, RING_DIP),
        (RING_DIP, RING_TIP),
        (RING_MCP, PINKY_MCP),
        (WRIST, PINKY_MCP),
        (PINKY_MCP, PINKY_PIP),
        (PINKY_PIP, PINKY_DIP),
        (PINKY_DIP, PINKY_TIP),
    ];
}

/// Indices into a face mesh observation
pub mod face {
    pub const LEFT_EYE_OUTER: usize = 263;
    pub const LEFT_EYE_INNER: usize = 362;
    pub const LEFT_EYE_UPPER: [usize; 2] = [385, 387];
    pub const LEFT_EYE_LOWER: [usize; 2] = [380, 373];

    pub const RIGHT_EYE_OUTER: usize = 33;
    pub const RIGHT_EYE_INNER: usize = 133;
    pub const RIGHT_EYE_UPPER: [usize; 2] = [160, 158];
    pub const RIGHT_EYE_LOWER: [usize; 2] = [144, 153];

    pub const MOUTH_LEFT: usize = 61;
    pub const MOUTH_RIGHT: usize = 291;
    pub const MOUTH_UPPER_INNER: usize = 13;
    pub const MOUTH_LOWER_INNER: usize = 14;
}

/// Normalized image-relative keypoint; x and y in [0,1], z is relative depth
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar distance, ignoring depth
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Pixel position for a frame of the given size
    pub fn to_pixel(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "left" => Handedness::Left,
            "right" => Handedness::Right,
            _ => Handedness::Unknown,
        }
    }
}

/// Exactly 21 landmarks for one detected hand
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    landmarks: [Landmark; HAND_LANDMARK_COUNT],
    pub handedness: Handedness,
}

impl HandObservation {
    pub fn new(landmarks: [Landmark; HAND_LANDMARK_COUNT], handedness: Handedness) -> Self {
        Self {
            landmarks,
            handedness,
        }
    }

    pub fn landmarks(&self) -> &[Landmark; HAND_LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn centroid(&self) -> Landmark {
        let n = HAND_LANDMARK_COUNT as f32;
        let (sx, sy, sz) = self
            .landmarks
            .iter()
            .fold((0.0, 0.0, 0.0), |(sx, sy, sz), p| (sx + p.x, sy + p.y, sz + p.z));
        Landmark::with_depth(sx / n, sy / n, sz / n)
    }
}

/// Face mesh landmarks for one detected face (at least 468 points)
#[derive(Debug, Clone, PartialEq)]
pub struct FaceObservation {
    landmarks: Vec<Landmark>,
}

impl FaceObservation {
    /// Caller guarantees at least [`FACE_LANDMARK_COUNT`] points; the adapter checks this
    pub(crate) fn from_validated(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }
}

/// Normalized observations for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    pub hands: Vec<HandObservation>,
    pub face: Option<FaceObservation>,
}
