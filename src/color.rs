//! Color channel utilities shared by the diff tracker and the stroke color
//! decision. All conversions work on the `[0, 255]` scale.

use image::Rgb;

/// Per-channel absolute difference between two colors.
pub fn channel_diff(a: Rgb<u8>, b: Rgb<u8>) -> [i32; 3] {
  [
    (a[0] as i32 - b[0] as i32).abs(),
    (a[1] as i32 - b[1] as i32).abs(),
    (a[2] as i32 - b[2] as i32).abs(),
  ]
}

/// True when every channel of `a` differs from `b` by strictly less than the
/// per-channel tolerance.
pub fn within_tolerance(a: Rgb<u8>, b: Rgb<u8>, max_diff: [i32; 3]) -> bool {
  let diff = channel_diff(a, b);
  diff[0] < max_diff[0] && diff[1] < max_diff[1] && diff[2] < max_diff[2]
}

/// Converts an RGB color to its `[hue, saturation, brightness]` decomposition.
pub fn rgb_to_hsb(color: Rgb<u8>) -> [f32; 3] {
  let r = color[0] as f32;
  let g = color[1] as f32;
  let b = color[2] as f32;
  let max = r.max(g).max(b);
  let min = r.min(g).min(b);
  let delta = max - min;

  let brightness = max;
  let saturation = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
  let hue = if delta == 0.0 {
    0.0
  } else {
    let sector = if max == r {
      (g - b) / delta
    } else if max == g {
      (b - r) / delta + 2.0
    } else {
      (r - g) / delta + 4.0
    };
    (sector.rem_euclid(6.0)) * 255.0 / 6.0
  };
  [hue, saturation, brightness]
}

/// Converts a `[hue, saturation, brightness]` triplet back to RGB.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb<u8> {
  let v = brightness.clamp(0.0, 255.0);
  let s = saturation.clamp(0.0, 255.0) / 255.0;
  if s == 0.0 {
    let v = v.round() as u8;
    return Rgb([v, v, v]);
  }

  let sector = (hue.rem_euclid(255.0)) / 255.0 * 6.0;
  let i = sector.floor();
  let f = sector - i;
  let p = v * (1.0 - s);
  let q = v * (1.0 - s * f);
  let t = v * (1.0 - s * (1.0 - f));

  let (r, g, b) = match i as u32 {
    0 => (v, t, p),
    1 => (q, v, p),
    2 => (p, v, t),
    3 => (p, q, v),
    4 => (t, p, v),
    _ => (v, p, q),
  };
  Rgb([r.round() as u8, g.round() as u8, b.round() as u8])
}
