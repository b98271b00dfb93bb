pub use ab_glyph::PxScale;
pub use image::Rgb;

// Overlay palette
pub const ENTRY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const STOP_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const TP_LINE_COLOR: Rgb<u8> = Rgb([0, 150, 255]);
pub const TP_TEXT_COLOR: Rgb<u8> = Rgb([0, 200, 255]);
pub const SUPPORT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const RESISTANCE_COLOR: Rgb<u8> = Rgb([255, 165, 0]);
pub const LABEL_BG_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
// Current price
pub const PRICE_LINE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const PRICE_BG_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const PRICE_TEXT_COLOR: Rgb<u8> = Rgb([22, 26, 30]);
// Label scales
pub const ENTRY_SCALE: PxScale = PxScale { x: 16.0, y: 16.0 };
pub const LABEL_SCALE: PxScale = PxScale { x: 14.0, y: 14.0 };
pub const LEVEL_SCALE: PxScale = PxScale { x: 12.0, y: 12.0 };
// Dash patterns: (dash px, gap px, thickness px)
pub const STOP_DASH: (f32, f32, u32) = (15.0, 10.0, 5);
pub const TP_DASH: (f32, f32, u32) = (12.0, 8.0, 4);
pub const LEVEL_DASH: (f32, f32, u32) = (12.0, 6.0, 4);
// Entry marker
pub const ENTRY_ARROW_SIZE: i32 = 35;
