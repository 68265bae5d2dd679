use {
  crate::{canvas::PixelBuffer, geometry::Point},
  image::Rgb
};

/// A chain of connected segments that trails behind the brush anchor,
/// simulating the lagging motion of a physical bristle. Segment rest lengths
/// and thicknesses are fixed at construction.
#[derive(Clone)]
pub struct Bristle {
  positions: Vec<Point>,
  lengths: Vec<f32>,
  thicknesses: Vec<f32>,
}

impl Bristle {
  pub fn new(n_elements: usize, element_length: f32, thickness: f32) -> Self {
    let n_positions = n_elements + 1;
    let mut lengths = Vec::with_capacity(n_positions);
    let mut thicknesses = Vec::with_capacity(n_positions);

    // the chain thins out towards the tip
    for element in 0..n_positions {
      lengths.push(element_length.max(1.0));
      let taper = 1.0 - 0.8 * element as f32 / n_positions as f32;
      thicknesses.push((thickness * taper).max(0.1));
    }

    Self {
      positions: vec![Point::zero(); n_positions],
      lengths,
      thicknesses,
    }
  }

  /// Snaps every joint of the chain to a single point.
  pub fn set_position(&mut self, position: Point) {
    for joint in &mut self.positions {
      *joint = position;
    }
  }

  /// Moves the anchor to a new position and pulls the rest of the chain
  /// behind it, keeping each segment at its rest length.
  pub fn update_position(&mut self, position: Point) {
    self.positions[0] = position;
    let mut previous = position;

    for joint in 1..self.positions.len() {
      let current = self.positions[joint];
      let angle = (previous.y - current.y).atan2(previous.x - current.x);
      previous = Point::new(
        previous.x - self.lengths[joint] * angle.cos(),
        previous.y - self.lengths[joint] * angle.sin(),
      );
      self.positions[joint] = previous;
    }
  }

  /// Paints the chain segments on the canvas.
  pub fn paint(&self, color: Rgb<u8>, alpha: f32, canvas: &mut PixelBuffer) {
    for joint in 1..self.positions.len() {
      canvas.paint_segment(
        self.positions[joint - 1],
        self.positions[joint],
        self.thicknesses[joint],
        color,
        alpha,
      );
    }
  }

  pub(crate) fn joint_positions(&self) -> &[Point] {
    &self.positions
  }

  pub(crate) fn rest_lengths(&self) -> &[f32] {
    &self.lengths
  }
}
