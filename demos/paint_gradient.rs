use {
  anyhow::Result,
  image::{Rgb, RgbImage},
  oil_painting::{Painter, PaintingConfig, Progress}
};

/// Paint a synthetic color gradient, one stroke at a time, reporting every
/// brush size reduction.
fn main() -> Result<()> {
  env_logger::init();

  let (width, height) = (320, 240);
  let source = RgbImage::from_fn(width, height, |x, y| {
    let t = (x + y) as f32 / (width + height) as f32;
    Rgb([
      (240.0 - 200.0 * t) as u8,
      (80.0 + 60.0 * t) as u8,
      (40.0 + 180.0 * t) as u8,
    ])
  });

  let config = PaintingConfig {
    seed: 1,
    ..PaintingConfig::default()
  };
  let mut painter = Painter::new(source, config)?;

  loop {
    match painter.step() {
      Progress::Painted => {}
      Progress::BrushReduced { new_size } => println!(
        "#{} traces painted, brush size reduced to {:.1}",
        painter.n_traces(),
        new_size
      ),
      Progress::Converged => break,
    }
  }
  painter.canvas().save("gradient.png")?;
  Ok(())
}
