use {
  super::*,
  rand::SeedableRng,
  rand_pcg::Pcg64
};

fn config() -> PaintingConfig {
  PaintingConfig::default()
}

fn gray_source(side: u32) -> RgbImage {
  RgbImage::from_pixel(side, side, Rgb([100, 100, 100]))
}

fn cover_canvas(canvas: &mut PixelBuffer, color: Rgb<u8>) {
  let side = canvas.width().max(canvas.height()) as f32;
  canvas.paint_segment(
    Point::new(-side, 0.5 * side),
    Point::new(2.0 * side, 0.5 * side),
    4.0 * side,
    color,
    1.0,
  );
}

#[test]
fn trajectories_are_deterministic() {
  let mut rng_a = Pcg64::seed_from_u64(42);
  let mut rng_b = Pcg64::seed_from_u64(42);
  let trace_a = Trace::new(&mut rng_a, Point::new(32.0, 32.0), 24, 2.0);
  let trace_b = Trace::new(&mut rng_b, Point::new(32.0, 32.0), 24, 2.0);
  assert_eq!(trace_a.positions(), trace_b.positions());
  assert_eq!(trace_a.alphas(), trace_b.alphas());
}

#[test]
fn steps_are_spaced_by_the_speed() {
  let mut rng = Pcg64::seed_from_u64(7);
  let speed = 2.0;
  let trace = Trace::new(&mut rng, Point::new(32.0, 32.0), 30, speed);

  let positions = trace.positions();
  for step in 1..positions.len() {
    let distance = (positions[step] - positions[step - 1]).length();
    assert!((distance - speed).abs() < 1e-4, "step {}: {}", step, distance);
  }
}

#[test]
fn opacity_ramps_down() {
  let mut rng = Pcg64::seed_from_u64(11);
  let trace = Trace::new(&mut rng, Point::new(0.0, 0.0), 20, 2.0);

  let alphas = trace.alphas();
  assert_eq!(alphas[0], 255);
  for step in 1..alphas.len() {
    assert!(alphas[step] <= alphas[step - 1]);
  }
  assert!(*alphas.last().unwrap() < 255);
}

#[test]
fn trajectory_over_bad_pixels_is_valid() {
  let cfg = config();
  let source = gray_source(128);
  let canvas = PixelBuffer::new(128, 128, cfg.background_color);
  let mut diff = DiffTracker::new(128 * 128);
  diff.refresh(&canvas, &source, &cfg);
  let visited = VisitedMask::new(128 * 128);

  let mut rng = Pcg64::seed_from_u64(3);
  let trace = Trace::new(&mut rng, Point::new(64.0, 64.0), 16, 2.0);
  assert!(trace.has_valid_trajectory(&diff, &visited, &source, &cfg));
}

#[test]
fn trajectory_over_well_painted_pixels_is_invalid() {
  let cfg = config();
  let source = gray_source(64);
  let mut canvas = PixelBuffer::new(64, 64, cfg.background_color);
  cover_canvas(&mut canvas, Rgb([100, 100, 100]));
  let mut diff = DiffTracker::new(64 * 64);
  diff.refresh(&canvas, &source, &cfg);
  assert!(diff.bad_pixels().is_empty());
  let visited = VisitedMask::new(64 * 64);

  let mut rng = Pcg64::seed_from_u64(3);
  let trace = Trace::new(&mut rng, Point::new(32.0, 32.0), 16, 2.0);
  assert!(!trace.has_valid_trajectory(&diff, &visited, &source, &cfg));
}

#[test]
fn trajectory_over_visited_pixels_is_invalid() {
  let cfg = config();
  let source = gray_source(64);
  let diff = DiffTracker::new(64 * 64);
  let mut visited = VisitedMask::new(64 * 64);
  for pixel in 0..64 * 64 {
    visited.mark(pixel);
  }

  let mut rng = Pcg64::seed_from_u64(3);
  let trace = Trace::new(&mut rng, Point::new(32.0, 32.0), 16, 2.0);
  assert!(!trace.has_valid_trajectory(&diff, &visited, &source, &cfg));
}

#[test]
fn trajectory_outside_the_canvas_is_invalid() {
  let cfg = config();
  let source = gray_source(64);
  let diff = DiffTracker::new(64 * 64);
  let visited = VisitedMask::new(64 * 64);

  let mut rng = Pcg64::seed_from_u64(3);
  let trace = Trace::new(&mut rng, Point::new(-1000.0, -1000.0), 16, 2.0);
  assert!(!trace.has_valid_trajectory(&diff, &visited, &source, &cfg));
}

#[test]
fn color_spread_gate_rejects_busy_regions() {
  let mut cfg = config();
  cfg.max_color_stddev_in_trajectory = Some(10.0);

  // checkerboard of black and white columns, stddev around 127 per channel
  let mut source = RgbImage::new(64, 64);
  for (x, _, pixel) in source.enumerate_pixels_mut() {
    *pixel = if x % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) };
  }
  let diff = DiffTracker::new(64 * 64);
  let visited = VisitedMask::new(64 * 64);

  let mut rng = Pcg64::seed_from_u64(3);
  let trace = Trace::new(&mut rng, Point::new(32.0, 32.0), 16, 2.0);
  assert!(!trace.has_valid_trajectory(&diff, &visited, &source, &cfg));

  cfg.max_color_stddev_in_trajectory = None;
  assert!(trace.has_valid_trajectory(&diff, &visited, &source, &cfg));
}

#[test]
fn blank_canvas_trace_is_accepted_with_source_colors() {
  let cfg = config();
  let source = gray_source(128);
  let canvas = PixelBuffer::new(128, 128, cfg.background_color);
  let mut diff = DiffTracker::new(128 * 128);
  diff.refresh(&canvas, &source, &cfg);

  let mut rng = Pcg64::seed_from_u64(21);
  let mut trace = Trace::new(&mut rng, Point::new(64.0, 64.0), 16, 2.0);
  let brush = Brush::new(&mut rng, 8.0, &cfg);
  trace.set_brush(brush);

  assert!(trace.calculate_colors(&diff, &source, &canvas, &mut rng, &cfg));

  // every synthesized color stays close to the flat source color
  for color in trace.colors().unwrap() {
    for channel in 0..3 {
      let diff = (color[channel] as i32 - 100).abs();
      assert!(diff <= 20, "{:?}", color);
    }
  }
}

#[test]
fn well_painted_region_is_rejected() {
  let cfg = config();
  let source = gray_source(64);
  let mut canvas = PixelBuffer::new(64, 64, cfg.background_color);
  cover_canvas(&mut canvas, Rgb([100, 100, 100]));
  let mut diff = DiffTracker::new(64 * 64);
  diff.refresh(&canvas, &source, &cfg);

  let mut rng = Pcg64::seed_from_u64(21);
  let mut trace = Trace::new(&mut rng, Point::new(32.0, 32.0), 16, 2.0);
  trace.set_brush(Brush::new(&mut rng, 8.0, &cfg));

  assert!(!trace.calculate_colors(&diff, &source, &canvas, &mut rng, &cfg));
  assert!(trace.colors().is_none());
}

#[test]
fn trace_entirely_off_canvas_is_rejected() {
  let cfg = config();
  let source = gray_source(32);
  let canvas = PixelBuffer::new(32, 32, cfg.background_color);
  let diff = DiffTracker::new(32 * 32);

  let mut rng = Pcg64::seed_from_u64(21);
  let mut trace = Trace::new(&mut rng, Point::new(500.0, 500.0), 16, 2.0);
  trace.set_brush(Brush::new(&mut rng, 8.0, &cfg));

  assert!(!trace.calculate_colors(&diff, &source, &canvas, &mut rng, &cfg));
}

#[test]
fn painting_marks_visited_pixels_and_touches_the_canvas() {
  let cfg = config();
  let source = gray_source(128);
  let mut canvas = PixelBuffer::new(128, 128, cfg.background_color);
  let mut diff = DiffTracker::new(128 * 128);
  diff.refresh(&canvas, &source, &cfg);
  let mut visited = VisitedMask::new(128 * 128);

  let mut rng = Pcg64::seed_from_u64(33);
  let mut trace = Trace::new(&mut rng, Point::new(64.0, 64.0), 20, 2.0);
  trace.set_brush(Brush::new(&mut rng, 10.0, &cfg));
  assert!(trace.calculate_colors(&diff, &source, &canvas, &mut rng, &cfg));

  trace.paint(&mut canvas, &mut visited);

  let painted = canvas
    .image()
    .pixels()
    .filter(|&&pixel| pixel != cfg.background_color)
    .count();
  assert!(painted > 0);
  assert!((0..128 * 128).any(|pixel| visited.is_visited(pixel)));
}

#[test]
fn zero_step_trace_is_rejected() {
  let cfg = config();
  let source = gray_source(32);
  let canvas = PixelBuffer::new(32, 32, cfg.background_color);
  let diff = DiffTracker::new(32 * 32);

  let mut rng = Pcg64::seed_from_u64(2);
  let mut trace = Trace::new(&mut rng, Point::new(16.0, 16.0), 0, 2.0);
  trace.set_brush(Brush::new(&mut rng, 8.0, &cfg));

  assert!(!trace.calculate_colors(&diff, &source, &canvas, &mut rng, &cfg));
  assert!(trace.colors().is_none());
}

#[test]
fn accepted_strokes_never_worsen_the_pixels_under_them() {
  let cfg = config();
  let mut source = RgbImage::from_pixel(128, 128, Rgb([160, 80, 40]));
  for (x, _, pixel) in source.enumerate_pixels_mut() {
    if x >= 64 {
      *pixel = Rgb([40, 80, 160]);
    }
  }
  let mut canvas = PixelBuffer::new(128, 128, cfg.background_color);
  let mut diff = DiffTracker::new(128 * 128);
  let mut rng = Pcg64::seed_from_u64(13);

  let mut accepted = 0;
  for _ in 0..200 {
    diff.refresh(&canvas, &source, &cfg);
    if diff.bad_pixels().is_empty() {
      break;
    }
    let pixel = diff.bad_pixels()[rng.gen_range(0..diff.bad_pixels().len())];
    let position = Point::new((pixel % 128) as f32, (pixel / 128) as f32);
    let mut trace = Trace::new(&mut rng, position, 16, 2.0);
    trace.set_brush(Brush::new(&mut rng, 8.0, &cfg));
    if !trace.calculate_colors(&diff, &source, &canvas, &mut rng, &cfg) {
      continue;
    }

    let mut visited = VisitedMask::new(128 * 128);
    trace.paint(&mut canvas, &mut visited);
    let mut after = DiffTracker::new(128 * 128);
    after.refresh(&canvas, &source, &cfg);

    // recount the bad pixels among the pixels this stroke covered
    let touched: Vec<usize> = (0..128 * 128).filter(|&p| visited.is_visited(p)).collect();
    let bad_before = touched.iter().filter(|&&p| !diff.is_well_painted(p)).count();
    let bad_after = touched.iter().filter(|&&p| !after.is_well_painted(p)).count();
    assert!(
      bad_after <= bad_before,
      "stroke raised the bad pixel count from {} to {}",
      bad_before,
      bad_after
    );
    accepted += 1;
  }
  assert!(accepted > 0);
}

#[test]
fn painting_without_colors_is_a_noop() {
  let cfg = config();
  let mut canvas = PixelBuffer::new(32, 32, cfg.background_color);
  let mut visited = VisitedMask::new(32 * 32);

  let mut rng = Pcg64::seed_from_u64(1);
  let trace = Trace::new(&mut rng, Point::new(16.0, 16.0), 16, 2.0);
  trace.paint(&mut canvas, &mut visited);

  assert!(canvas.image().pixels().all(|&pixel| pixel == cfg.background_color));
  assert!(!(0..32 * 32).any(|pixel| visited.is_visited(pixel)));
}
