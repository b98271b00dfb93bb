pub mod charts;
pub mod font;

pub use charts::annotate::{Canvas, ChartAnnotator, ChartMargins};
pub use charts::mapper::price_to_y;
pub use charts::png::encode_png;
pub use font::resolve_label_font;
