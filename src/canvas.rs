use {
  crate::geometry::{segment_distance, Point},
  image::{Rgb, RgbImage},
  itertools::iproduct
};

/// The working canvas: an RGB raster with a designated "unpainted" background
/// color. Strokes are the only thing that ever mutates it.
#[derive(Clone)]
pub struct PixelBuffer {
  image: RgbImage,
  background: Rgb<u8>,
}

impl PixelBuffer {
  /// Creates a canvas filled with the background color.
  pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
    Self {
      image: RgbImage::from_pixel(width, height, background),
      background,
    }
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn background(&self) -> Rgb<u8> {
    self.background
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }

  /// Index of a pixel in the flat bookkeeping arrays.
  pub fn index(&self, x: u32, y: u32) -> usize {
    (x + y * self.width()) as usize
  }

  /// Bounds-checked sample at a continuous position. Returns the pixel
  /// coordinates and the canvas color, or `None` outside the canvas.
  pub fn sample(&self, point: Point) -> Option<(u32, u32, Rgb<u8>)> {
    let x = point.x.floor();
    let y = point.y.floor();
    if x < 0.0 || y < 0.0 {
      return None;
    }
    let (x, y) = (x as u32, y as u32);
    (x < self.width() && y < self.height()).then(|| (x, y, *self.image.get_pixel(x, y)))
  }

  /// Paints a thick line segment, antialiased, blended source-over at the
  /// given opacity.
  pub fn paint_segment(&mut self, a: Point, b: Point, thickness: f32, color: Rgb<u8>, alpha: f32) {
    let radius = 0.5 * thickness.max(0.1);
    let margin = radius + 1.0;

    let x0 = (a.x.min(b.x) - margin).floor().max(0.0) as i64;
    let y0 = (a.y.min(b.y) - margin).floor().max(0.0) as i64;
    let x1 = (a.x.max(b.x) + margin).ceil().min(self.width() as f32 - 1.0) as i64;
    let y1 = (a.y.max(b.y) + margin).ceil().min(self.height() as f32 - 1.0) as i64;
    if x0 > x1 || y0 > y1 || a.x.max(b.x) + margin < 0.0 || a.y.max(b.y) + margin < 0.0 {
      return;
    }

    iproduct!(y0..=y1, x0..=x1).for_each(|(y, x)| {
      let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
      let sdf = segment_distance(center, a, b) - radius;
      // one-pixel antialias band around the capsule boundary
      let coverage = (0.5 - sdf).clamp(0.0, 1.0);
      if coverage > 0.0 {
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        *pixel = blend(*pixel, color, coverage * alpha);
      }
    });
  }
}

fn blend(dst: Rgb<u8>, src: Rgb<u8>, factor: f32) -> Rgb<u8> {
  let factor = factor.clamp(0.0, 1.0);
  let mix =
    |d: u8, s: u8| (d as f32 * (1.0 - factor) + s as f32 * factor).round() as u8;
  Rgb([
    mix(dst[0], src[0]),
    mix(dst[1], src[1]),
    mix(dst[2], src[2]),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sample_respects_bounds() {
    let canvas = PixelBuffer::new(4, 3, Rgb([255, 255, 255]));
    assert!(canvas.sample(Point::new(0.0, 0.0)).is_some());
    assert!(canvas.sample(Point::new(3.9, 2.9)).is_some());
    assert!(canvas.sample(Point::new(-0.1, 1.0)).is_none());
    assert!(canvas.sample(Point::new(4.0, 1.0)).is_none());
    assert!(canvas.sample(Point::new(1.0, 3.0)).is_none());
  }

  #[test]
  fn paint_segment_covers_the_line_core() {
    let mut canvas = PixelBuffer::new(16, 16, Rgb([255, 255, 255]));
    canvas.paint_segment(
      Point::new(2.0, 8.0),
      Point::new(14.0, 8.0),
      3.0,
      Rgb([0, 0, 0]),
      1.0,
    );
    // pixels on the segment axis receive full opacity
    for x in 3..13 {
      assert_eq!(*canvas.image().get_pixel(x, 8), Rgb([0, 0, 0]));
    }
    // pixels far away stay untouched
    assert_eq!(*canvas.image().get_pixel(8, 1), Rgb([255, 255, 255]));
  }

  #[test]
  fn paint_segment_outside_canvas_is_a_noop() {
    let mut canvas = PixelBuffer::new(8, 8, Rgb([10, 20, 30]));
    canvas.paint_segment(
      Point::new(-50.0, -50.0),
      Point::new(-40.0, -45.0),
      4.0,
      Rgb([0, 0, 0]),
      1.0,
    );
    canvas.paint_segment(
      Point::new(100.0, 3.0),
      Point::new(120.0, 3.0),
      4.0,
      Rgb([0, 0, 0]),
      1.0,
    );
    assert!(canvas
      .image()
      .pixels()
      .all(|&pixel| pixel == Rgb([10, 20, 30])));
  }
}
