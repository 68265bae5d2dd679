use {
  anyhow::{ensure, Result},
  image::Rgb
};

/// Configuration of a painting run.
///
/// The defaults reproduce the classic look: white unpainted canvas, a color
/// tolerance of 40 per channel, and a brush that starts at a sixth of the
/// largest image side and shrinks down to 4 pixels.
#[derive(Debug, Clone)]
pub struct PaintingConfig {
  /// The maximum per-channel RGB difference to consider a pixel correctly painted
  pub max_color_diff: [i32; 3],
  /// The canvas background color, used as the "unpainted" sentinel
  pub background_color: Rgb<u8>,
  /// The smallest brush size allowed
  pub smaller_brush_size: f32,
  /// The brush size decrement ratio
  pub brush_size_decrement: f32,
  /// The maximum number of invalid trajectories allowed before the brush size is reduced
  pub max_invalid_trajectories: u32,
  /// The maximum number of invalid trajectories allowed for the smallest brush size
  /// before the painting is stopped
  pub max_invalid_trajectories_for_smaller_size: u32,
  /// The maximum number of invalid traces allowed before the brush size is reduced
  pub max_invalid_traces: u32,
  /// The maximum number of invalid traces allowed for the smallest brush size before
  /// the painting is stopped
  pub max_invalid_traces_for_smaller_size: u32,
  /// The trace moving speed, in pixels per step
  pub trace_speed: f32,
  /// The typical trace length, relative to the brush size
  pub relative_trace_length: f32,
  /// The minimum trace length allowed, in pixels
  pub min_trace_length: f32,
  /// Avoid painting on areas with the same color as the canvas background.
  ///
  /// When enabled, untouched background pixels whose source pixel also equals
  /// the background color count as well painted and are masked as visited, so
  /// no strokes are seeded there. Different engine variants disagree on this
  /// behavior, hence the explicit switch.
  pub avoid_background_regions: bool,
  /// Optional gate on the per-channel standard deviation of the source colors
  /// under a candidate trajectory. Trajectories crossing regions with a larger
  /// spread are rejected, keeping each stroke on a color-coherent area.
  /// Disabled by default.
  pub max_color_stddev_in_trajectory: Option<f32>,
  /// The maximum bristle length, in pixels
  pub max_bristle_length: f32,
  /// The maximum bristle thickness, in pixels
  pub max_bristle_thickness: f32,
  /// Bristle count per unit of brush size, drawn uniformly from this range
  pub bristle_density_range: (f32, f32),
  /// Seed for the run's random number generator and noise tracks
  pub seed: u64,
}

impl Default for PaintingConfig {
  fn default() -> Self {
    Self {
      max_color_diff: [40, 40, 40],
      background_color: Rgb([255, 255, 255]),
      smaller_brush_size: 4.0,
      brush_size_decrement: 1.3,
      max_invalid_trajectories: 5000,
      max_invalid_trajectories_for_smaller_size: 10000,
      max_invalid_traces: 250,
      max_invalid_traces_for_smaller_size: 350,
      trace_speed: 2.0,
      relative_trace_length: 2.3,
      min_trace_length: 16.0,
      avoid_background_regions: true,
      max_color_stddev_in_trajectory: None,
      max_bristle_length: 15.0,
      max_bristle_thickness: 5.0,
      bristle_density_range: (1.6, 1.9),
      seed: 0,
    }
  }
}

impl PaintingConfig {
  /// Checks the configuration for values that would make the painting loop
  /// degenerate or never terminate.
  pub fn validate(&self) -> Result<()> {
    ensure!(
      self.smaller_brush_size > 0.0,
      "smaller_brush_size must be positive, got {}",
      self.smaller_brush_size
    );
    ensure!(
      self.brush_size_decrement > 1.0,
      "brush_size_decrement must be greater than 1, got {}",
      self.brush_size_decrement
    );
    ensure!(
      self.trace_speed > 0.0,
      "trace_speed must be positive, got {}",
      self.trace_speed
    );
    ensure!(
      self.min_trace_length >= self.trace_speed,
      "min_trace_length ({}) must not be smaller than trace_speed ({}), \
       traces would have zero steps",
      self.min_trace_length,
      self.trace_speed
    );
    ensure!(
      self.relative_trace_length > 0.0,
      "relative_trace_length must be positive, got {}",
      self.relative_trace_length
    );
    let (lo, hi) = self.bristle_density_range;
    ensure!(
      0.0 < lo && lo < hi,
      "bristle_density_range must be a positive, non-empty range, got ({}, {})",
      lo,
      hi
    );
    ensure!(
      self.max_bristle_length > 0.0 && self.max_bristle_thickness > 0.0,
      "bristle length and thickness limits must be positive"
    );
    Ok(())
  }
}
