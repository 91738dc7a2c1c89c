use super::types::{DirectionLabel, PointingDirection};
use crate::landmarks::{hand, HandObservation};

/// Unit vector from the index finger base to its tip.
/// Returns `None` when the two points coincide.
pub fn pointing_direction(
    observation: &HandObservation,
    dominance: f32,
) -> Option<PointingDirection> {
    let base = observation.point(hand::INDEX_MCP);
    let tip = observation.point(hand::INDEX_TIP);
    let dx = tip.x - base.x;
    let dy = tip.y - base.y;

    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return None;
    }

    let (dx, dy) = (dx / length, dy / length);
    let label = direction_label(dx, dy, dominance)?;

    Some(PointingDirection { dx, dy, label })
}

/// Buckets a vector into one of eight compass labels.
///
/// A component must exceed the other by `dominance` to produce a straight
/// label; otherwise the signs pick a diagonal. Image y grows downward.
pub fn direction_label(dx: f32, dy: f32, dominance: f32) -> Option<DirectionLabel> {
    if !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
        return None;
    }

    let label = if dx.abs() > dominance * dy.abs() {
        if dx > 0.0 {
            DirectionLabel::Right
        } else {
            DirectionLabel::Left
        }
    } else if dy.abs() > dominance * dx.abs() {
        if dy > 0.0 {
            DirectionLabel::Down
        } else {
            DirectionLabel::Up
        }
    } else {
        match (dx > 0.0, dy > 0.0) {
            (true, true) => DirectionLabel::DownRight,
            (true, false) => DirectionLabel::UpRight,
            (false, true) => DirectionLabel::DownLeft,
            (false, false) => DirectionLabel::UpLeft,
        }
    };

    Some(label)
}
