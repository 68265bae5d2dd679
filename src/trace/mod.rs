//! .
//!
//! A trace is one brush stroke: a noise-driven trajectory, a per-step opacity
//! ramp, and, once accepted, a color table for every bristle at every step.
//! Candidate traces go through two accept/reject stages before they are ever
//! painted: a cheap trajectory check and a full color probe.

use {
  crate::{
    brush::Brush,
    canvas::PixelBuffer,
    color,
    config::PaintingConfig,
    diff::{DiffTracker, VisitedMask},
    geometry::Point,
    noise::SmoothNoise
  },
  image::{Rgb, RgbImage},
  rand::Rng,
  std::f32::consts::TAU
};

#[cfg(test)] mod tests;

/// Sets how random the trace movement is
const NOISE_FACTOR: f32 = 0.007;

/// The maximum fraction of trajectory pixels already painted with similar colors
const MAX_SIMILAR_COLOR_FRACTION_IN_TRAJECTORY: f32 = 0.6;

/// The maximum fraction of trajectory pixels that have been visited before
const MAX_VISITS_FRACTION_IN_TRAJECTORY: f32 = 0.35;

/// The maximum fraction of trajectory pixels that fall outside the canvas
const MAX_OUTSIDE_FRACTION_IN_TRAJECTORY: f32 = 0.6;

/// The maximum fraction of trace pixels already painted with similar colors
const MAX_SIMILAR_COLOR_FRACTION: f32 = 0.85;

/// The maximum fraction of trace pixels that fall outside the canvas
const MAX_OUTSIDE_FRACTION: f32 = 0.3;

/// The fraction of the trace that needs paint under it to count as painted over
const MIN_PAINTED_FRACTION: f32 = 0.65;

/// The minimum color improvement factor required to paint over existing paint
const MIN_COLOR_IMPROVEMENT_FACTOR: f32 = 20.0;

/// The minimum well painted improvement fraction that accepts a trace even
/// without a significant color improvement
const BIG_WELL_PAINTED_IMPROVEMENT_FRACTION: f32 = 0.35;

/// The minimum reduction fraction in the number of badly painted pixels
const MIN_BAD_PAINTED_REDUCTION_FRACTION: f32 = 0.3;

/// The maximum fraction of previously well painted pixels the trace may ruin
const MAX_WELL_PAINTED_DESTRUCTION_FRACTION: f32 = 0.55;

/// The brightness relative change range between the bristles
const BRIGHTNESS_RELATIVE_CHANGE: f32 = 0.09;

/// The typical step where the color mixing starts
const TYPICAL_MIX_STARTING_STEP: usize = 5;

/// The color mixing strength
const MIX_STRENGTH: f32 = 0.015;

/// The minimum alpha value that still contributes to the painting
const MIN_ALPHA: u8 = 20;

/// A single brush stroke candidate.
pub struct Trace {
  n_steps: usize,
  positions: Vec<Point>,
  alphas: Vec<u8>,
  colors: Option<Vec<Rgb<u8>>>,
  brush: Option<Brush>,
  n_bristles: usize,
}

impl Trace {
  /// Creates a trace starting near the given position. The trajectory meanders
  /// with a smooth noise track and the opacity decreases with every step.
  pub fn new(rng: &mut impl Rng, position: Point, n_steps: usize, speed: f32) -> Self {
    let mut positions = Vec::with_capacity(n_steps);
    let mut alphas = Vec::with_capacity(n_steps);

    let init_angle = rng.gen_range(0.0..TAU);
    let noise = SmoothNoise::new(rng.gen(), rng.gen_range(0.0..1000.0));
    let alpha_decrement = (255.0 / n_steps as f32).min(25.0);
    let mut previous_position = position;
    let mut previous_alpha = 255.0 + alpha_decrement;

    for step in 0..n_steps {
      let angle = init_angle + TAU * (noise.sample(NOISE_FACTOR * step as f32) - 0.5);
      previous_position = Point::new(
        previous_position.x + speed * angle.cos(),
        previous_position.y + speed * angle.sin(),
      );
      previous_alpha -= alpha_decrement;
      positions.push(previous_position);
      alphas.push(previous_alpha.clamp(0.0, 255.0) as u8);
    }

    Self {
      n_steps,
      positions,
      alphas,
      colors: None,
      brush: None,
      n_bristles: 0,
    }
  }

  pub fn n_steps(&self) -> usize {
    self.n_steps
  }

  /// Checks the trajectory against the current painting state. A valid
  /// trajectory mostly crosses badly painted, unvisited pixels and does not
  /// spend too many steps outside the canvas.
  pub fn has_valid_trajectory(
    &self,
    diff: &DiffTracker,
    visited: &VisitedMask,
    source: &RgbImage,
    config: &PaintingConfig,
  ) -> bool {
    let width = source.width();
    let height = source.height();
    let mut similar_color = 0;
    let mut visits = 0;
    let mut outside = 0;

    for position in &self.positions {
      let x = position.x.floor();
      let y = position.y.floor();
      if x >= 0.0 && y >= 0.0 && (x as u32) < width && (y as u32) < height {
        let pixel = (x as u32 + y as u32 * width) as usize;
        if diff.is_well_painted(pixel) {
          similar_color += 1;
        }
        if visited.is_visited(pixel) {
          visits += 1;
        }
      } else {
        outside += 1;
      }
    }

    let n_steps = self.n_steps as f32;
    let badly_painted = similar_color as f32 <= MAX_SIMILAR_COLOR_FRACTION_IN_TRAJECTORY * n_steps;
    let not_visited = visits as f32 <= MAX_VISITS_FRACTION_IN_TRAJECTORY * n_steps;
    let inside_canvas = outside as f32 <= MAX_OUTSIDE_FRACTION_IN_TRAJECTORY * n_steps;

    badly_painted
      && not_visited
      && inside_canvas
      && self.has_coherent_colors(source, config)
  }

  /// Optional gate on the color spread of the source image under the
  /// trajectory. Always passes when the gate is disabled.
  fn has_coherent_colors(&self, source: &RgbImage, config: &PaintingConfig) -> bool {
    let max_stddev = match config.max_color_stddev_in_trajectory {
      Some(max_stddev) => max_stddev,
      None => return true,
    };

    let mut sum = [0.0f32; 3];
    let mut sum_squares = [0.0f32; 3];
    let mut count = 0;

    for position in &self.positions {
      let x = position.x.floor();
      let y = position.y.floor();
      if x >= 0.0 && y >= 0.0 && (x as u32) < source.width() && (y as u32) < source.height() {
        let color = source.get_pixel(x as u32, y as u32);
        for channel in 0..3 {
          sum[channel] += color[channel] as f32;
          sum_squares[channel] += (color[channel] as f32).powi(2);
        }
        count += 1;
      }
    }
    if count == 0 {
      return true;
    }

    (0..3).all(|channel| {
      let mean = sum[channel] / count as f32;
      let variance = (sum_squares[channel] / count as f32 - mean * mean).max(0.0);
      variance.sqrt() <= max_stddev
    })
  }

  /// Associates a brush to the trace.
  pub fn set_brush(&mut self, brush: Brush) {
    self.n_bristles = brush.n_bristles();
    self.brush = Some(brush);
  }

  /// Runs the full color probe: moves a throwaway copy of the brush along the
  /// trajectory, gathers the canvas and source colors under every bristle, and
  /// decides whether painting this trace improves the picture. On acceptance
  /// the per-step bristle colors are synthesized and stored.
  ///
  /// Returns `false` when the covered region is already well painted, the
  /// trace mostly leaves the canvas, or repainting would not improve it.
  pub fn calculate_colors(
    &mut self,
    diff: &DiffTracker,
    source: &RgbImage,
    canvas: &PixelBuffer,
    rng: &mut impl Rng,
    config: &PaintingConfig,
  ) -> bool {
    let brush = match &self.brush {
      Some(brush) => brush,
      None => return false,
    };
    if self.positions.is_empty() {
      return false;
    }
    let n_bristles = self.n_bristles;
    let n_samples = self.n_steps * n_bristles;

    // probe on a copy, the stored brush stays untouched for the commit
    let mut probe = brush.clone();
    probe.reset(self.positions[0]);

    let mut canvas_colors: Vec<Option<Rgb<u8>>> = vec![None; n_samples];
    let mut original_colors: Vec<Option<Rgb<u8>>> = vec![None; n_samples];
    let mut similar: Vec<bool> = vec![false; n_samples];
    let mut average = [0u32; 3];
    let mut inside = 0u32;
    let mut outside = 0u32;
    let mut similar_count = 0u32;

    for step in 0..self.n_steps {
      probe.update(self.positions[step], false);
      let bristle_positions = match probe.positions() {
        Some(positions) => positions,
        None => continue,
      };
      let high_alpha = self.alphas[step] >= MIN_ALPHA;

      for (bristle, &position) in bristle_positions.iter().enumerate() {
        let sample = step * n_bristles + bristle;
        match canvas.sample(position) {
          Some((x, y, canvas_color)) => {
            if canvas_color != canvas.background() {
              canvas_colors[sample] = Some(canvas_color);
            }
            let original = *source.get_pixel(x, y);
            original_colors[sample] = Some(original);

            if high_alpha {
              for channel in 0..3 {
                average[channel] += original[channel] as u32;
              }
              inside += 1;
              if diff.is_well_painted(canvas.index(x, y)) {
                similar[sample] = true;
                similar_count += 1;
              }
            }
          }
          None => {
            if high_alpha {
              outside += 1;
            }
          }
        }
      }
    }

    if inside == 0 {
      return false;
    }
    let average = Rgb([
      (average[0] / inside) as u8,
      (average[1] / inside) as u8,
      (average[2] / inside) as u8,
    ]);

    let well_painted = similar_count as f32 >= MAX_SIMILAR_COLOR_FRACTION * inside as f32;
    let outside_canvas = outside as f32 >= MAX_OUTSIDE_FRACTION * (inside + outside) as f32;
    if well_painted || outside_canvas {
      return false;
    }

    // second pass: would painting the average color improve the picture?
    let mut well_painted_count = 0i32;
    let mut destroyed_well_painted = 0i32;
    let mut already_painted = 0i32;
    let mut color_improvement = 0i32;

    for step in 0..self.n_steps {
      if self.alphas[step] < MIN_ALPHA {
        continue;
      }
      for bristle in 0..n_bristles {
        let sample = step * n_bristles + bristle;
        let original = match original_colors[sample] {
          Some(original) => original,
          None => continue,
        };

        let diff_to_average = color::channel_diff(original, average);
        if color::within_tolerance(original, average, config.max_color_diff) {
          well_painted_count += 1;
        } else if similar[sample] {
          destroyed_well_painted += 1;
        }

        if let Some(canvas_color) = canvas_colors[sample] {
          already_painted += 1;
          let diff_to_canvas = color::channel_diff(original, canvas_color);
          for channel in 0..3 {
            color_improvement += diff_to_canvas[channel] - diff_to_average[channel];
          }
        }
      }
    }

    let well_painted_improvement = well_painted_count - similar_count as i32;
    let previous_bad_painted = inside as i32 - similar_count as i32;

    let painted_over = already_painted as f32 >= MIN_PAINTED_FRACTION * inside as f32;
    let color_improves =
      color_improvement as f32 >= MIN_COLOR_IMPROVEMENT_FACTOR * already_painted as f32;
    let big_improvement =
      well_painted_improvement as f32 >= BIG_WELL_PAINTED_IMPROVEMENT_FRACTION * inside as f32;
    let reduced_bad_painted = well_painted_improvement as f32
      >= MIN_BAD_PAINTED_REDUCTION_FRACTION * previous_bad_painted as f32;
    let low_destruction = destroyed_well_painted as f32
      <= MAX_WELL_PAINTED_DESTRUCTION_FRACTION * well_painted_improvement as f32;
    let improves =
      (color_improves || big_improvement) && reduced_bad_painted && low_destruction;

    if painted_over && !improves {
      return false;
    }

    self.colors = Some(self.synthesize_colors(average, &canvas_colors, rng));
    true
  }

  /// Builds the per-step bristle color table. The first steps carry the
  /// average source color with a small per-bristle brightness variation; later
  /// steps slowly mix in the canvas colors the bristles pass over.
  fn synthesize_colors(
    &self,
    average: Rgb<u8>,
    canvas_colors: &[Option<Rgb<u8>>],
    rng: &mut impl Rng,
  ) -> Vec<Rgb<u8>> {
    let n_bristles = self.n_bristles;
    let mut colors = vec![Rgb([0u8, 0, 0]); self.n_steps * n_bristles];

    let [hue, saturation, brightness] = color::rgb_to_hsb(average);
    let noise = SmoothNoise::new(rng.gen(), rng.gen_range(0.0..1000.0));

    for bristle in 0..n_bristles {
      let delta = BRIGHTNESS_RELATIVE_CHANGE
        * brightness
        * (noise.sample(0.4 * bristle as f32) - 0.5);
      colors[bristle] = color::hsb_to_rgb(hue, saturation, brightness + delta);
    }

    let mix_start = TYPICAL_MIX_STARTING_STEP.clamp(1, self.n_steps);
    for step in 1..mix_start {
      for bristle in 0..n_bristles {
        colors[step * n_bristles + bristle] = colors[bristle];
      }
    }

    let mut previous: Vec<[f32; 3]> = (0..n_bristles)
      .map(|bristle| {
        let color = colors[(mix_start - 1) * n_bristles + bristle];
        [color[0] as f32, color[1] as f32, color[2] as f32]
      })
      .collect();
    let keep = 1.0 - MIX_STRENGTH;

    for step in mix_start..self.n_steps {
      for bristle in 0..n_bristles {
        let sample = step * n_bristles + bristle;
        // low opacity steps leave no visible paint, carry the color unchanged
        colors[sample] = match canvas_colors[sample]
          .filter(|_| self.alphas[step] >= MIN_ALPHA)
        {
          Some(canvas_color) => {
            for channel in 0..3 {
              previous[bristle][channel] = keep * previous[bristle][channel]
                + MIX_STRENGTH * canvas_color[channel] as f32;
            }
            Rgb([
              previous[bristle][0] as u8,
              previous[bristle][1] as u8,
              previous[bristle][2] as u8,
            ])
          }
          None => colors[sample - n_bristles],
        };
      }
    }

    colors
  }

  /// Paints the trace on the canvas and marks the covered pixels as visited.
  /// Does nothing until `calculate_colors` has accepted the trace.
  pub fn paint(&self, canvas: &mut PixelBuffer, visited: &mut VisitedMask) {
    let (colors, brush) = match (&self.colors, &self.brush) {
      (Some(colors), Some(brush)) => (colors, brush),
      _ => return,
    };

    let mut brush = brush.clone();
    brush.reset(self.positions[0]);

    for step in 0..self.n_steps {
      brush.update(self.positions[step], true);
      let step_colors = &colors[step * self.n_bristles..(step + 1) * self.n_bristles];
      let alpha = self.alphas[step] as f32 / 255.0;
      brush.paint(step_colors, alpha, canvas);

      if self.alphas[step] > MIN_ALPHA {
        if let Some(bristle_positions) = brush.positions() {
          for &position in bristle_positions {
            if let Some((x, y, _)) = canvas.sample(position) {
              visited.mark(canvas.index(x, y));
            }
          }
        }
      }
    }
  }

  #[cfg(test)]
  pub(crate) fn positions(&self) -> &[Point] {
    &self.positions
  }

  #[cfg(test)]
  pub(crate) fn alphas(&self) -> &[u8] {
    &self.alphas
  }

  #[cfg(test)]
  pub(crate) fn colors(&self) -> Option<&[Rgb<u8>]> {
    self.colors.as_deref()
  }
}
