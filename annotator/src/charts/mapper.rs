use common::PriceRange;

/// Map a price inside `range` to a vertical pixel row.
///
/// Higher prices sit nearer the top of the image, so the normalized
/// position is inverted before scaling. Out-of-range prices clamp to
/// the nearest chart edge instead of leaving the canvas, and a
/// degenerate range maps everything to the vertical center.
pub fn price_to_y(
    price: f64,
    range: PriceRange,
    image_height: u32,
    chart_top: u32,
    chart_bottom: u32,
) -> u32 {
    let chart_height = image_height.saturating_sub(chart_top + chart_bottom);
    let span = range.max - range.min;
    if chart_height == 0 || span <= 0.0 || !span.is_finite() {
        return image_height / 2;
    }

    let clamped = price.clamp(range.min, range.max);
    let normalized = ((range.max - clamped) / span).clamp(0.0, 1.0);
    let y = chart_top + (normalized * chart_height as f64).round() as u32;

    y.clamp(chart_top, image_height - chart_bottom)
}
