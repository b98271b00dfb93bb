use image::{ImageBuffer, Rgb};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Up,
    Down,
}

/// Filled block arrow with its tip `size` pixels from the marked row,
/// centered horizontally on `x`.
pub fn draw_arrow_mut(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    x: i32,
    y: i32,
    direction: ArrowDirection,
    size: i32,
    color: Rgb<u8>,
) {
    if size < 8 {
        // head and shaft points collapse below this, polygon degenerates
        return;
    }
    let half = size / 2;
    let quarter = size / 4;

    let points = match direction {
        ArrowDirection::Up => vec![
            Point::new(x, y - size),
            Point::new(x - half, y - half),
            Point::new(x - quarter, y - half),
            Point::new(x - quarter, y + half),
            Point::new(x + quarter, y + half),
            Point::new(x + quarter, y - half),
            Point::new(x + half, y - half),
        ],
        ArrowDirection::Down => vec![
            Point::new(x, y + size),
            Point::new(x - half, y + half),
            Point::new(x - quarter, y + half),
            Point::new(x - quarter, y - half),
            Point::new(x + quarter, y - half),
            Point::new(x + quarter, y + half),
            Point::new(x + half, y + half),
        ],
    };

    draw_polygon_mut(img, &points, color);
}
