use {
  anyhow::{Context, Result},
  oil_painting::{Painter, PaintingConfig}
};

/// Paint a picture as an oil painting and save the result as `oil_paint.png`.
fn main() -> Result<()> {
  env_logger::init();

  let path = std::env::args()
    .nth(1)
    .context("please provide a picture path in arguments")?;
  let source = image::open(&path)
    .with_context(|| format!("unable to open {}", path))?
    .to_rgb8();

  let mut painter = Painter::new(source, PaintingConfig::default())?;
  painter.paint().save("oil_paint.png")?;
  Ok(())
}
