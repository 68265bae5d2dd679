//! .
//!
//! A brush is a bundle of bristle chains spread perpendicular to the travel
//! direction. The brush anchor follows the trace trajectory; a short position
//! history smooths the heading, and per-bristle noise jitters the spread so
//! strokes do not look machine-drawn.

use {
  crate::{
    canvas::PixelBuffer,
    config::PaintingConfig,
    geometry::{Point, Vector},
    noise::SmoothNoise
  },
  image::Rgb,
  rand::Rng,
  std::f32::consts::FRAC_PI_2
};

mod bristle;
pub use bristle::Bristle;

/// The number of positions used to calculate the brush average position
const POSITIONS_FOR_AVERAGE: usize = 4;

/// The noise range of the bristles vertical offsets on the brush
const BRISTLE_VERTICAL_NOISE: f32 = 8.0;

/// The maximum horizontal jitter added to the bristle offsets on each update
const MAX_BRISTLE_HORIZONTAL_NOISE: f32 = 4.0;

/// Controls the bristles horizontal jitter speed
const NOISE_SPEED_FACTOR: f32 = 0.04;

/// Noise phase shift between two consecutive bristles
const BRISTLE_PHASE_SHIFT: f32 = 0.1;

/// A collection of bristle chains with per-bristle offsets from the brush
/// center, plus the smoothing state used to orient them.
#[derive(Clone)]
pub struct Brush {
  position: Point,
  bristles: Vec<Bristle>,
  offsets: Vec<Vector>,
  bristle_positions: Vec<Point>,
  history: Vec<Point>,
  average_position: Point,
  noise: SmoothNoise,
  updates: usize,
  horizontal_noise: f32,
}

impl Brush {
  /// Creates a brush of the given size. The bristle count, the per-bristle
  /// offsets and the jitter noise track are drawn from the run's RNG.
  pub fn new(rng: &mut impl Rng, size: f32, config: &PaintingConfig) -> Self {
    let (density_lo, density_hi) = config.bristle_density_range;
    let n_bristles = (size * rng.gen_range(density_lo..density_hi)).max(1.0) as usize;

    let bristle_length = size.min(config.max_bristle_length);
    let n_elements = ((2.0 * bristle_length).sqrt().round() as usize).max(1);
    let bristle_thickness = (0.8 * bristle_length).min(config.max_bristle_thickness);
    let element_length = bristle_length / n_elements as f32;

    let bristles = (0..n_bristles)
      .map(|_| Bristle::new(n_elements, element_length, bristle_thickness))
      .collect();
    let offsets = (0..n_bristles)
      .map(|_| {
        Vector::new(
          size * rng.gen_range(-0.5..0.5),
          BRISTLE_VERTICAL_NOISE * rng.gen_range(-0.5..0.5),
        )
      })
      .collect();

    Self {
      position: Point::zero(),
      bristles,
      offsets,
      bristle_positions: vec![Point::zero(); n_bristles],
      history: Vec::with_capacity(POSITIONS_FOR_AVERAGE),
      average_position: Point::zero(),
      noise: SmoothNoise::new(rng.gen(), rng.gen_range(0.0..1000.0)),
      updates: 0,
      horizontal_noise: (0.3 * size).min(MAX_BRISTLE_HORIZONTAL_NOISE),
    }
  }

  pub fn n_bristles(&self) -> usize {
    self.bristles.len()
  }

  /// Moves the brush back to a starting position, clearing the smoothing
  /// history.
  pub fn reset(&mut self, position: Point) {
    self.position = position;
    self.history.clear();
    self.average_position = position;
    self.updates = 0;
  }

  /// Moves the brush anchor to a new position.
  ///
  /// With `move_bristle_chains` the bristle joint chains trail behind their
  /// new targets; without it only the target positions are computed, which is
  /// what the color probe needs.
  pub fn update(&mut self, new_position: Point, move_bristle_chains: bool) {
    self.position = new_position;

    if self.history.len() < POSITIONS_FOR_AVERAGE {
      self.history.push(new_position);
    } else {
      self.history[self.updates % POSITIONS_FOR_AVERAGE] = new_position;
    }

    let mut average = Vector::zero();
    for &position in &self.history {
      average += position.to_vector();
    }
    let average = (average / self.history.len() as f32).to_point();

    // orient the bristle spread perpendicular to the smoothed travel direction
    let direction_angle = FRAC_PI_2
      + (average.y - self.average_position.y).atan2(average.x - self.average_position.x);
    self.average_position = average;

    self.update_bristle_positions(direction_angle);

    if move_bristle_chains {
      if self.history.len() == POSITIONS_FOR_AVERAGE {
        for (bristle, &target) in self.bristles.iter_mut().zip(&self.bristle_positions) {
          bristle.update_position(target);
        }
      } else if self.history.len() == POSITIONS_FOR_AVERAGE - 1 {
        for (bristle, &target) in self.bristles.iter_mut().zip(&self.bristle_positions) {
          bristle.set_position(target);
        }
      }
    }

    self.updates += 1;
  }

  fn update_bristle_positions(&mut self, direction_angle: f32) {
    if self.history.len() < POSITIONS_FOR_AVERAGE - 1 {
      return;
    }

    let (sin, cos) = direction_angle.sin_cos();
    let phase = NOISE_SPEED_FACTOR * self.updates as f32;

    for (index, offset) in self.offsets.iter().enumerate() {
      let jitter =
        self.noise.sample(phase + BRISTLE_PHASE_SHIFT * index as f32) - 0.5;
      let x = offset.x + self.horizontal_noise * jitter;
      let y = offset.y;

      // rotate the offset vector and add it to the anchor position
      self.bristle_positions[index] = Point::new(
        self.position.x + x * cos - y * sin,
        self.position.y + x * sin + y * cos,
      );
    }
  }

  /// The current bristle target positions. `None` until the smoothing window
  /// has accumulated enough samples to make the positions meaningful.
  pub fn positions(&self) -> Option<&[Point]> {
    (self.history.len() == POSITIONS_FOR_AVERAGE)
      .then(|| self.bristle_positions.as_slice())
  }

  /// Paints every bristle chain on the canvas with its own color.
  pub fn paint(&self, colors: &[Rgb<u8>], alpha: f32, canvas: &mut PixelBuffer) {
    if self.history.len() == POSITIONS_FOR_AVERAGE {
      for (bristle, &color) in self.bristles.iter().zip(colors) {
        bristle.paint(color, alpha, canvas);
      }
    }
  }

  #[cfg(test)]
  pub(crate) fn bristles(&self) -> &[Bristle] {
    &self.bristles
  }
}
