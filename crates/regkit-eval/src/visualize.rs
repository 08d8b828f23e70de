//! Side-by-side comparison figure of the middle axial slice.

use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};
use ndarray::{ArrayView2, ArrayView3, Axis};

/// White gutter between panels, in pixels.
const GUTTER: u32 = 4;

/// Write a three-panel PNG: fixed and warped slices in gray, and their
/// absolute difference in a black-red-yellow-white ramp. Each panel is
/// scaled to its own intensity range. Both volumes must share a shape.
pub fn save_comparison(fixed: &ArrayView3<'_, f32>, warped: &ArrayView3<'_, f32>, path: &Path) -> ImageResult<()> {
    let z = fixed.len_of(Axis(0)) / 2;
    let fixed_slice = fixed.index_axis(Axis(0), z);
    let warped_slice = warped.index_axis(Axis(0), z);
    let difference = (&fixed_slice - &warped_slice).mapv(f32::abs);

    let (height, width) = fixed_slice.dim();
    let (w, h) = (width as u32, height as u32);
    let mut canvas = RgbImage::from_pixel(3 * w + 2 * GUTTER, h, Rgb([255, 255, 255]));

    draw_panel(&mut canvas, &fixed_slice, 0, gray);
    draw_panel(&mut canvas, &warped_slice, w + GUTTER, gray);
    draw_panel(&mut canvas, &difference.view(), 2 * (w + GUTTER), hot);

    tracing::info!("Writing comparison figure (slice z = {}) to {}", z, path.display());
    canvas.save(path)
}

fn draw_panel(canvas: &mut RgbImage, slice: &ArrayView2<'_, f32>, x0: u32, colormap: fn(f32) -> Rgb<u8>) {
    let (lo, hi) = slice
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = hi - lo;

    for ((y, x), &v) in slice.indexed_iter() {
        let t = if range > 0.0 { (v - lo) / range } else { 0.0 };
        canvas.put_pixel(x0 + x as u32, y as u32, colormap(t));
    }
}

fn gray(t: f32) -> Rgb<u8> {
    let g = to_u8(t);
    Rgb([g, g, g])
}

/// Matplotlib's "hot" colormap.
fn hot(t: f32) -> Rgb<u8> {
    let r = t / 0.365_079;
    let g = (t - 0.365_079) / (0.746_032 - 0.365_079);
    let b = (t - 0.746_032) / (1.0 - 0.746_032);
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}

fn to_u8(t: f32) -> u8 {
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}
