use ab_glyph::FontArc;
use log::debug;

// Common label-font locations across the platforms we deploy on.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
];

/// Resolve the best available label font.
///
/// Meant to run once at startup; the result is handed to
/// [`crate::ChartAnnotator::with_font`]. Returns `None` when no
/// candidate exists, in which case the annotator renders lines and
/// markers without text labels.
pub fn resolve_label_font() -> Option<FontArc> {
    for path in FONT_CANDIDATES {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(data) {
                debug!("label font resolved from {path}");
                return Some(font);
            }
        }
    }
    None
}
