use ab_glyph::{Font, PxScale, ScaleFont};
use anyhow::{bail, Result};
use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

/// Draw `text` over an opaque background box, optionally framed with a
/// hollow border, so labels stay legible over arbitrary chart colors.
///
/// The box is nudged back inside the canvas when the requested
/// position would push it off an edge. Returns the box actually drawn.
#[allow(clippy::too_many_arguments)]
pub fn draw_label<F: Font>(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    font: &F,
    text: &str,
    x: i32,
    y: i32,
    scale: PxScale,
    color: Rgb<u8>,
    background: Rgb<u8>,
    border: Option<Rgb<u8>>,
) -> Result<Rect> {
    if text.is_empty() {
        bail!("empty label text");
    }

    let metrics = font.as_scaled(scale);
    let (text_width, text_height) = text_size(scale, font, text);
    if text_width == 0 || text_height == 0 {
        bail!("label {text:?} measured zero-sized");
    }

    let padding = 3;
    let box_width = text_width + 2 * padding as u32;
    let box_height = text_height + 2 * padding as u32;
    let x = x.clamp(0, img.width().saturating_sub(box_width) as i32);
    let y = y.clamp(0, img.height().saturating_sub(box_height) as i32);

    let bounding = Rect::at(x, y).of_size(box_width, box_height);
    // Background first, text last: legibility over any chart colors.
    draw_filled_rect_mut(img, bounding, background);
    if let Some(border_color) = border {
        draw_hollow_rect_mut(img, bounding, border_color);
    }

    let baseline_nudge = (metrics.descent() / text_height as f32 * scale.y * 0.6) as i32;
    draw_text_mut(
        img,
        color,
        x + padding,
        y + padding + baseline_nudge,
        scale,
        font,
        text,
    );

    Ok(bounding)
}
