use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete gesture labels produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Fist,
    Palm,
    ThumbUp,
    Peace,
    Pointing,
    ZoomIn,
    ZoomOut,
}

impl GestureKind {
    pub const ALL: [GestureKind; 7] = [
        GestureKind::Fist,
        GestureKind::Palm,
        GestureKind::ThumbUp,
        GestureKind::Peace,
        GestureKind::Pointing,
        GestureKind::ZoomIn,
        GestureKind::ZoomOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureKind::Fist => "fist",
            GestureKind::Palm => "palm",
            GestureKind::ThumbUp => "thumb_up",
            GestureKind::Peace => "peace",
            GestureKind::Pointing => "pointing",
            GestureKind::ZoomIn => "zoom_in",
            GestureKind::ZoomOut => "zoom_out",
        }
    }

    pub fn is_zoom(&self) -> bool {
        matches!(self, GestureKind::ZoomIn | GestureKind::ZoomOut)
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eight-way pointing direction in image coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionLabel {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl DirectionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionLabel::Up => "up",
            DirectionLabel::Down => "down",
            DirectionLabel::Left => "left",
            DirectionLabel::Right => "right",
            DirectionLabel::UpLeft => "up_left",
            DirectionLabel::UpRight => "up_right",
            DirectionLabel::DownLeft => "down_left",
            DirectionLabel::DownRight => "down_right",
        }
    }
}

impl fmt::Display for DirectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit vector from the index finger base to its tip, with its bucketed label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointingDirection {
    pub dx: f32,
    pub dy: f32,
    pub label: DirectionLabel,
}

/// Output of one classification tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureResult {
    /// Zoom kinds first, then single-hand kinds; each kind at most once
    pub gestures: Vec<GestureKind>,
    pub direction: Option<PointingDirection>,
}

impl GestureResult {
    pub fn direction_label(&self) -> Option<DirectionLabel> {
        self.direction.map(|d| d.label)
    }

    pub fn pointing_vector(&self) -> Option<(f32, f32)> {
        self.direction.map(|d| (d.dx, d.dy))
    }

    pub(super) fn push_unique(&mut self, kind: GestureKind) {
        if !self.gestures.contains(&kind) {
            self.gestures.push(kind);
        }
    }
}

/// Zoom state carried between ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierState {
    pub previous_two_hand_distance: Option<f32>,
    pub zoom_cooldown: u32,
}
