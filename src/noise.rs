//! .
//!
//! Smooth, phase-correlated noise drives both the stroke trajectory meander
//! and the bristle jitter. Consecutive samples along the phase axis are
//! correlated, so small phase increments produce gentle variations instead of
//! a jagged random walk.

use noise::{NoiseFn, Perlin};

/// Deterministic 1-D smooth noise with output in `[0, 1]`.
///
/// Each consumer owns its own instance, keyed by a seed and a random phase
/// offset, so that two brushes (or two traces) never share a noise track.
#[derive(Clone)]
pub struct SmoothNoise {
  perlin: Perlin,
  offset: f64,
}

impl SmoothNoise {
  pub fn new(seed: u32, offset: f32) -> Self {
    Self {
      perlin: Perlin::new(seed),
      offset: offset as f64,
    }
  }

  /// Samples the noise track at the given phase.
  pub fn sample(&self, phase: f32) -> f32 {
    let value = self.perlin.get([self.offset + phase as f64, 0.0]) as f32;
    0.5 * (value + 1.0)
  }
}
