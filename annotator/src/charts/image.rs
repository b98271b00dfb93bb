use image::{ImageBuffer, Rgb};
use imageproc::drawing::draw_line_segment_mut;

/// Draw a horizontal dashed line at row `y` spanning `[x_start, x_end]`.
///
/// Thickness grows downward from `y`. Segments outside the canvas are
/// clipped by the line primitive, so callers don't need to bounds-check.
pub fn draw_dashed_hline_mut(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    y: i32,
    x_start: i32,
    x_end: i32,
    dash_length: f32,
    gap_length: f32,
    thickness: u32,
    color: Rgb<u8>,
) {
    if x_end <= x_start || dash_length <= 0.0 || gap_length < 0.0 {
        return;
    }

    for row in 0..thickness.max(1) {
        let row_y = (y + row as i32) as f32;
        let mut x = x_start as f32;
        while x < x_end as f32 {
            let dash_end = (x + dash_length).min(x_end as f32);
            draw_line_segment_mut(img, (x, row_y), (dash_end, row_y), color);
            x += dash_length + gap_length;
        }
    }
}

/// Solid horizontal line with thickness, same conventions as the
/// dashed variant.
pub fn draw_hline_mut(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    y: i32,
    x_start: i32,
    x_end: i32,
    thickness: u32,
    color: Rgb<u8>,
) {
    if x_end <= x_start {
        return;
    }
    for row in 0..thickness.max(1) {
        let row_y = (y + row as i32) as f32;
        draw_line_segment_mut(img, (x_start as f32, row_y), (x_end as f32, row_y), color);
    }
}
