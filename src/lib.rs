//! This is a library for painting raster images as simulated oil paintings.
//!
//! The engine approximates a source image by placing brush strokes on an
//! initially blank canvas until no stroke can improve the result any further.
//! Each candidate stroke is a noise-perturbed random walk ([`trace::Trace`])
//! starting from a badly painted pixel; numeric heuristics decide whether the
//! stroke would improve the painting before it is committed through a
//! [`brush::Brush`] of trailing bristle chains. When too many candidates in a
//! row are rejected, the average brush size shrinks, down to a configured
//! floor; once even the smallest brush cannot find an acceptable stroke, the
//! painting is finished.
//!
//! Image decoding and encoding are the host's responsibility; the engine only
//! works on [`image::RgbImage`] buffers.
//!
//! # Basic usage
//! ```no_run
//! # use oil_painting::{Painter, PaintingConfig};
//! # fn main() -> anyhow::Result<()> {
//! let source = image::open("picture.jpg")?.to_rgb8();
//!
//! let config = PaintingConfig {
//!   seed: 42,
//!   ..PaintingConfig::default()
//! };
//!
//! // Paint the whole picture in one go...
//! let mut painter = Painter::new(source, config)?;
//! painter.paint().save("out.png")?;
//! # Ok(())
//! # }
//! ```
//! Or drive the loop one stroke at a time, for instance to export animation
//! frames:
//! ```no_run
//! # use oil_painting::{Painter, PaintingConfig, Progress};
//! # fn main() -> anyhow::Result<()> {
//! # let source = image::open("picture.jpg")?.to_rgb8();
//! let mut painter = Painter::new(source, PaintingConfig::default())?;
//! while painter.step() != Progress::Converged {
//!   // painter.canvas() holds the current state of the painting
//! }
//! # Ok(())
//! # }
//! ```

pub mod brush;
pub mod canvas;
pub mod color;
pub mod config;
pub mod diff;
pub mod geometry;
pub mod noise;
pub mod painter;
pub mod trace;

pub use {
  config::PaintingConfig,
  painter::{Painter, Progress}
};
