//! .
//!
//! All positions are expressed in pixel units, with the origin of the
//! coordinate system in the top-left corner of the image.

use euclid::{Point2D, Vector2D};

/// Pixel coordinate basis
#[derive(Debug, Copy, Clone)]
pub struct PixelSpace;

pub type Point = Point2D<f32, PixelSpace>;
pub type Vector = Vector2D<f32, PixelSpace>;

/// Distance from `point` to the segment `[a, b]`.
pub fn segment_distance(point: Point, a: Point, b: Point) -> f32 {
  let ab = b - a;
  let ap = point - a;
  let len2 = ab.square_length();
  let t = if len2 > 0.0 {
    (ap.dot(ab) / len2).clamp(0.0, 1.0)
  } else {
    0.0
  };
  (ap - ab * t).length()
}
