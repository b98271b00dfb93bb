use crate::analysis::AnalysisRecord;
use crate::prices::parse_price;

/// Numeric window for the chart's vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Fallback window when no usable prices exist.
    pub const DEFAULT: PriceRange = PriceRange {
        min: 0.0,
        max: 100.0,
    };

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Every parseable price in the record, in field order. Tokens that
/// fail to parse are skipped, never fatal.
pub fn collect_prices(record: &AnalysisRecord) -> Vec<f64> {
    let mut prices = Vec::new();
    if let Some(price) = record.current_price.as_deref().and_then(parse_price) {
        prices.push(price);
    }
    let levels = record
        .entry
        .iter()
        .chain(record.stop_loss.iter())
        .chain(record.take_profits.iter())
        .chain(record.support_levels.iter())
        .chain(record.resistance_levels.iter());
    for level in levels {
        if let Some(price) = level.parsed_price() {
            prices.push(price);
        }
    }
    prices
}

/// Derive the visible price window for a record.
///
/// Axis bounds the model read off the chart itself are authoritative
/// and bypass padding. Otherwise the window is inferred from whatever
/// prices parse, padded by a fraction chosen by the span's magnitude
/// so headroom stays proportionate from sub-dollar tokens up to
/// multi-million quantities.
pub fn estimate_price_range(record: &AnalysisRecord) -> PriceRange {
    let chart_min = record.chart_min_price.as_deref().and_then(parse_price);
    let chart_max = record.chart_max_price.as_deref().and_then(parse_price);
    if let (Some(min), Some(max)) = (chart_min, chart_max) {
        if min < max {
            return PriceRange { min, max };
        }
    }

    let prices = collect_prices(record);
    match prices.len() {
        0 => PriceRange::DEFAULT,
        1 => PriceRange {
            min: prices[0] * 0.8,
            max: prices[0] * 1.2,
        },
        _ => {
            let lo = prices.iter().fold(f64::INFINITY, |a, &b| a.min(b));
            let hi = prices.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let span = hi - lo;
            let fraction = if span > 1_000_000.0 {
                0.05
            } else if span > 1_000.0 {
                0.10
            } else {
                0.15
            };
            PriceRange {
                min: lo - span * fraction,
                max: hi + span * fraction,
            }
        }
    }
}
