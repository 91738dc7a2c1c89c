use super::recognizer::Recognition;
use image::RgbImage;

/// Draw hand skeletons, pointing arrows, the two-hand connection and face
/// status markers onto `image`
#[cfg(feature = "annotation")]
pub fn annotate(image: &mut RgbImage, recognition: &Recognition) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let hands = &recognition.landmarks.hands;
    for observation in hands {
        drawing::hand(image, observation);
    }
    if let [first, second] = hands.as_slice() {
        drawing::connection(image, &first.centroid(), &second.centroid());
    }

    if let Some(face) = &recognition.landmarks.face {
        drawing::face_points(image, face);
    }
    if let Some(metrics) = &recognition.face_metrics {
        drawing::status_markers(image, metrics);
    }
}

#[cfg(not(feature = "annotation"))]
pub fn annotate(_image: &mut RgbImage, _recognition: &Recognition) {}

#[cfg(feature = "annotation")]
mod drawing {
    use crate::expression::FaceMetrics;
    use crate::landmarks::{hand, FaceObservation, HandObservation, Landmark};
    use image::{Rgb, RgbImage};
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
    use imageproc::rect::Rect;

    const JOINT: Rgb<u8> = Rgb([255, 0, 0]);
    const BONE: Rgb<u8> = Rgb([255, 255, 255]);
    const ARROW: Rgb<u8> = Rgb([255, 255, 0]);
    const LINK: Rgb<u8> = Rgb([255, 0, 255]);
    const MESH: Rgb<u8> = Rgb([0, 255, 0]);
    const ACTIVE: Rgb<u8> = Rgb([255, 0, 0]);
    const IDLE: Rgb<u8> = Rgb([0, 200, 0]);

    const ARROW_TIP_RATIO: f32 = 0.3;
    const ARROW_TIP_ANGLE: f32 = 0.45;

    fn pixel(image: &RgbImage, landmark: &Landmark) -> (f32, f32) {
        landmark.to_pixel(image.width(), image.height())
    }

    pub(super) fn hand(image: &mut RgbImage, observation: &HandObservation) {
        for &(from, to) in hand::CONNECTIONS.iter() {
            let start = pixel(image, &observation.point(from));
            let end = pixel(image, &observation.point(to));
            draw_line_segment_mut(image, start, end, BONE);
        }

        for landmark in observation.landmarks() {
            let (x, y) = pixel(image, landmark);
            draw_filled_circle_mut(image, (x as i32, y as i32), 3, JOINT);
        }

        let base = pixel(image, &observation.point(hand::INDEX_MCP));
        let tip = pixel(image, &observation.point(hand::INDEX_TIP));
        arrow(image, base, tip);
    }

    fn arrow(image: &mut RgbImage, start: (f32, f32), end: (f32, f32)) {
        draw_line_segment_mut(image, start, end, ARROW);

        let (dx, dy) = (start.0 - end.0, start.1 - end.1);
        let length = (dx * dx + dy * dy).sqrt() * ARROW_TIP_RATIO;
        if length < 1.0 {
            return;
        }

        let back = dy.atan2(dx);
        for angle in [back - ARROW_TIP_ANGLE, back + ARROW_TIP_ANGLE] {
            let barb = (end.0 + length * angle.cos(), end.1 + length * angle.sin());
            draw_line_segment_mut(image, end, barb, ARROW);
        }
    }

    pub(super) fn connection(image: &mut RgbImage, first: &Landmark, second: &Landmark) {
        let start = pixel(image, first);
        let end = pixel(image, second);
        draw_line_segment_mut(image, start, end, LINK);
    }

    pub(super) fn face_points(image: &mut RgbImage, face: &FaceObservation) {
        let (width, height) = image.dimensions();
        for landmark in face.landmarks() {
            let (x, y) = pixel(image, landmark);
            if x >= 0.0 && y >= 0.0 && (x as u32) < width && (y as u32) < height {
                image.put_pixel(x as u32, y as u32, MESH);
            }
        }
    }

    /// Left eye, right eye and mouth as small squares in the top-left corner
    pub(super) fn status_markers(image: &mut RgbImage, metrics: &FaceMetrics) {
        let states = [metrics.left_eye_closed, metrics.right_eye_closed, metrics.smiling];
        for (slot, active) in states.into_iter().enumerate() {
            let color = if active { ACTIVE } else { IDLE };
            let rect = Rect::at(10 + slot as i32 * 16, 10).of_size(12, 12);
            draw_filled_rect_mut(image, rect, color);
        }
    }
}
