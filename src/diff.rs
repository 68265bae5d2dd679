use {
  crate::{canvas::PixelBuffer, color, config::PaintingConfig},
  image::RgbImage,
  rayon::prelude::*
};

/// Classifies every canvas pixel as well painted (close enough to the source
/// image) or bad, and keeps the list of bad pixels used to seed new strokes.
///
/// The tracker must be refreshed after every canvas mutation before its
/// contents are read again.
pub struct DiffTracker {
  well_painted: Vec<bool>,
  bad_pixels: Vec<u32>,
}

impl DiffTracker {
  /// Creates a tracker where every pixel starts out bad.
  pub fn new(n_pixels: usize) -> Self {
    Self {
      well_painted: vec![false; n_pixels],
      bad_pixels: (0..n_pixels as u32).collect(),
    }
  }

  /// Recomputes the per-pixel classification from the canvas and the source
  /// image, and rebuilds the bad pixel list.
  ///
  /// A pixel is well painted when its canvas color is not the background
  /// sentinel and every RGB channel is within the configured tolerance of the
  /// source color. Untouched background pixels whose source pixel also equals
  /// the background count as well painted only when
  /// `avoid_background_regions` is enabled.
  pub fn refresh(&mut self, canvas: &PixelBuffer, source: &RgbImage, config: &PaintingConfig) {
    let width = canvas.width() as usize;
    let background = canvas.background();

    self.well_painted
      .par_chunks_mut(width)
      .enumerate()
      .for_each(|(y, row)| {
        for (x, well) in row.iter_mut().enumerate() {
          let painted = *canvas.image().get_pixel(x as u32, y as u32);
          let original = *source.get_pixel(x as u32, y as u32);
          *well = if painted != background {
            color::within_tolerance(original, painted, config.max_color_diff)
          } else if original == background {
            config.avoid_background_regions
          } else {
            false
          };
        }
      });

    self.bad_pixels.clear();
    self.bad_pixels.extend(
      self.well_painted
        .iter()
        .enumerate()
        .filter(|(_, well)| !**well)
        .map(|(pixel, _)| pixel as u32),
    );
  }

  pub fn is_well_painted(&self, pixel: usize) -> bool {
    self.well_painted[pixel]
  }

  /// Indices of all pixels currently classified as bad.
  pub fn bad_pixels(&self) -> &[u32] {
    &self.bad_pixels
  }
}

/// Marks pixels already covered by a high-opacity bristle pass at the current
/// brush size, to keep strokes from piling up on the same spot. Cleared on
/// every brush size change.
pub struct VisitedMask {
  visited: Vec<bool>,
}

impl VisitedMask {
  pub fn new(n_pixels: usize) -> Self {
    Self {
      visited: vec![false; n_pixels],
    }
  }

  pub fn clear(&mut self) {
    self.visited.fill(false);
  }

  pub fn mark(&mut self, pixel: usize) {
    self.visited[pixel] = true;
  }

  pub fn is_visited(&self, pixel: usize) -> bool {
    self.visited[pixel]
  }

  /// Masks every pixel where both the canvas and the source image hold the
  /// background color, so no trajectories are seeded over genuine background
  /// regions.
  pub fn mask_background_regions(&mut self, canvas: &PixelBuffer, source: &RgbImage) {
    let background = canvas.background();
    for (x, y, &original) in source.enumerate_pixels() {
      if original == background && *canvas.image().get_pixel(x, y) == background {
        self.visited[canvas.index(x, y)] = true;
      }
    }
  }
}
