/// Parse a human-written price token into a number.
///
/// Tolerates a leading `$`, thousands separators, stray spaces and
/// K/M/B magnitude suffixes (plus the spelled-out word forms models
/// like to emit). Word forms are checked before the single-letter
/// suffixes so `"2 MILLION"` and `"1.5M"` both land on 1.5e6-scale
/// values. Returns `None` for anything non-numeric; unparsable tokens
/// are an expected, frequent case, not an error.
pub fn parse_price(token: &str) -> Option<f64> {
    let cleaned = token.replace(['$', ',', ' '], "").to_uppercase();
    if cleaned.is_empty() {
        return None;
    }

    let (number, multiplier) = if let Some(rest) = cleaned.strip_suffix("MILLION") {
        (rest, 1e6)
    } else if let Some(rest) = cleaned.strip_suffix("MILL") {
        (rest, 1e6)
    } else if let Some(rest) = cleaned.strip_suffix("THOUSAND") {
        (rest, 1e3)
    } else if let Some(rest) = cleaned.strip_suffix('K') {
        (rest, 1e3)
    } else if let Some(rest) = cleaned.strip_suffix('M') {
        (rest, 1e6)
    } else if let Some(rest) = cleaned.strip_suffix('B') {
        (rest, 1e9)
    } else {
        (cleaned.as_str(), 1.0)
    };

    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value * multiplier)
}
