//! .
//!
//! The painting loop: seed a stroke on a badly painted pixel, probe it, paint
//! it if it improves the picture, and shrink the brush when too many
//! candidates in a row get rejected. The loop is exposed one stroke at a time
//! through [`Painter::step`] so callers can watch the painting grow.

use {
  crate::{
    brush::Brush,
    canvas::PixelBuffer,
    config::PaintingConfig,
    diff::{DiffTracker, VisitedMask},
    geometry::Point,
    trace::Trace
  },
  anyhow::{ensure, Result},
  image::RgbImage,
  log::{debug, info},
  rand::{Rng, SeedableRng},
  rand_pcg::Pcg64
};


/// The trace length and brush size are re-drawn after this many consecutive
/// invalid trajectories
const TRAJECTORY_REDRAW_PERIOD: u32 = 500;

/// Every brush size reduction shrinks the size by at least this many pixels
const MIN_BRUSH_SIZE_STEP: f32 = 2.0;

/// The initial brush size, as a fraction of the largest image side
const INITIAL_SIZE_FRACTION: f32 = 1.0 / 6.0;

/// The outcome of a single painting step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
  /// A stroke was accepted and painted on the canvas
  Painted,
  /// Too many candidates were rejected and the average brush size was reduced
  BrushReduced { new_size: f32 },
  /// Even the smallest brush cannot place an improving stroke anymore
  Converged,
}

/// Paints a source image as a simulated oil painting.
pub struct Painter {
  config: PaintingConfig,
  source: RgbImage,
  canvas: PixelBuffer,
  diff: DiffTracker,
  visited: VisitedMask,
  rng: Pcg64,
  average_brush_size: f32,
  invalid_trajectories: u32,
  invalid_traces: u32,
  n_traces: u64,
  needs_refresh: bool,
  converged: bool,
}

impl Painter {
  /// Creates a painter for the given source image. The brush starts at a
  /// fraction of the largest image side and never goes below the configured
  /// smallest size.
  pub fn new(source: RgbImage, config: PaintingConfig) -> Result<Self> {
    config.validate()?;
    ensure!(
      source.width() > 0 && source.height() > 0,
      "the source image is empty"
    );

    let n_pixels = (source.width() * source.height()) as usize;
    let initial_size = config
      .smaller_brush_size
      .max(INITIAL_SIZE_FRACTION * source.width().max(source.height()) as f32);

    Ok(Self {
      canvas: PixelBuffer::new(source.width(), source.height(), config.background_color),
      diff: DiffTracker::new(n_pixels),
      visited: VisitedMask::new(n_pixels),
      rng: Pcg64::seed_from_u64(config.seed),
      average_brush_size: initial_size,
      invalid_trajectories: 0,
      invalid_traces: 0,
      n_traces: 0,
      needs_refresh: true,
      converged: false,
      source,
      config,
    })
  }

  /// The current state of the painting.
  pub fn canvas(&self) -> &RgbImage {
    self.canvas.image()
  }

  /// The number of strokes painted so far.
  pub fn n_traces(&self) -> u64 {
    self.n_traces
  }

  /// The current average brush size.
  pub fn average_brush_size(&self) -> f32 {
    self.average_brush_size
  }

  /// Advances the painting by one stroke.
  ///
  /// Searches for a stroke that improves the painting and commits it. When
  /// the search keeps failing the average brush size is reduced instead, and
  /// once the smallest brush also runs out of candidates the painting has
  /// converged. After convergence every further call returns
  /// [`Progress::Converged`] without touching the canvas.
  pub fn step(&mut self) -> Progress {
    if self.converged {
      return Progress::Converged;
    }

    loop {
      if self.needs_refresh {
        self.diff.refresh(&self.canvas, &self.source, &self.config);
        if self.n_traces == 0 && self.config.avoid_background_regions {
          self.visited.mask_background_regions(&self.canvas, &self.source);
        }
        self.needs_refresh = false;
      }

      if self.diff.bad_pixels().is_empty() {
        return self.finish();
      }

      let can_reduce = self.average_brush_size > self.config.smaller_brush_size;
      let (max_trajectories, max_traces) = if can_reduce {
        (self.config.max_invalid_trajectories, self.config.max_invalid_traces)
      } else {
        (
          self.config.max_invalid_trajectories_for_smaller_size,
          self.config.max_invalid_traces_for_smaller_size,
        )
      };

      if self.invalid_trajectories > max_trajectories || self.invalid_traces > max_traces {
        if !can_reduce {
          return self.finish();
        }
        return Progress::BrushReduced {
          new_size: self.reduce_brush_size(),
        };
      }

      if self.try_stroke() {
        return Progress::Painted;
      }
    }
  }

  /// Runs the painting to convergence and returns the finished canvas.
  pub fn paint(&mut self) -> &RgbImage {
    while self.step() != Progress::Converged {}
    self.canvas.image()
  }

  fn finish(&mut self) -> Progress {
    self.converged = true;
    info!("painting finished after {} traces", self.n_traces);
    Progress::Converged
  }

  /// Shrinks the average brush size and clears the per-size bookkeeping, so
  /// regions visited by the larger brush become available again.
  fn reduce_brush_size(&mut self) -> f32 {
    let floor = self.config.smaller_brush_size;
    self.average_brush_size = floor.max(
      (self.average_brush_size / self.config.brush_size_decrement)
        .min(self.average_brush_size - MIN_BRUSH_SIZE_STEP),
    );
    debug!(
      "traces = {}, new average brush size = {}",
      self.n_traces, self.average_brush_size
    );

    self.invalid_trajectories = 0;
    self.invalid_traces = 0;
    self.visited.clear();
    if self.config.avoid_background_regions {
      self.visited.mask_background_regions(&self.canvas, &self.source);
    }
    self.average_brush_size
  }

  /// Attempts to find and paint a single stroke. Returns `false` when the
  /// candidate was rejected, leaving the failure counters incremented.
  fn try_stroke(&mut self) -> bool {
    let brush_size = self
      .config
      .smaller_brush_size
      .max(self.average_brush_size * self.rng.gen_range(0.95..1.05));
    let n_steps = (self
      .config
      .min_trace_length
      .max(self.config.relative_trace_length * brush_size * self.rng.gen_range(0.9..1.1))
      / self.config.trace_speed) as usize;

    // trajectory search; the candidate length and size are re-drawn by the
    // caller after every redraw period
    let mut candidate = None;
    while candidate.is_none()
      && self.invalid_trajectories % TRAJECTORY_REDRAW_PERIOD != TRAJECTORY_REDRAW_PERIOD - 1
    {
      let bad_pixels = self.diff.bad_pixels();
      let pixel = bad_pixels[self.rng.gen_range(0..bad_pixels.len())];
      let position = Point::new(
        (pixel % self.source.width()) as f32,
        (pixel / self.source.width()) as f32,
      );

      let trace = Trace::new(&mut self.rng, position, n_steps, self.config.trace_speed);
      if trace.has_valid_trajectory(&self.diff, &self.visited, &self.source, &self.config) {
        candidate = Some(trace);
      } else {
        self.invalid_trajectories += 1;
      }
    }

    let mut trace = match candidate {
      Some(trace) => {
        self.invalid_trajectories = 0;
        trace
      }
      None => {
        self.invalid_trajectories += 1;
        self.invalid_traces += 1;
        return false;
      }
    };

    trace.set_brush(Brush::new(&mut self.rng, brush_size, &self.config));

    if trace.calculate_colors(&self.diff, &self.source, &self.canvas, &mut self.rng, &self.config)
    {
      trace.paint(&mut self.canvas, &mut self.visited);
      self.n_traces += 1;
      self.invalid_traces = 0;
      self.needs_refresh = true;
      true
    } else {
      self.invalid_traces += 1;
      false
    }
  }
}
