use std::borrow::Cow;

use ab_glyph::FontArc;
use anyhow::{ensure, Result};
use common::{
    collect_prices, estimate_price_range, parse_price, AnalysisRecord, PriceLevel, PriceRange,
};
use image::{DynamicImage, ImageBuffer, Rgb};
use log::{debug, info, warn};
use regex::Regex;
use strum::Display;

use super::constants::*;
use super::image::{draw_dashed_hline_mut, draw_hline_mut};
use super::labels::draw_label;
use super::mapper::price_to_y;
use super::markers::{draw_arrow_mut, ArrowDirection};

pub type Canvas = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Horizontal level kinds; the display name doubles as the label prefix.
#[derive(Debug, Clone, Copy, Display)]
pub enum LevelKind {
    #[strum(serialize = "Support")]
    Support,
    #[strum(serialize = "Resistance")]
    Resistance,
}

/// Fractional insets that keep overlays off a chart's own axis labels.
#[derive(Debug, Clone, Copy)]
pub struct ChartMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for ChartMargins {
    fn default() -> Self {
        ChartMargins {
            left: 0.05,
            right: 0.02,
            top: 0.05,
            bottom: 0.05,
        }
    }
}

// Pixel geometry of the drawable band, derived per image.
struct ChartArea {
    left: i32,
    right: i32,
    top: u32,
    bottom: u32,
    height: u32,
}

impl ChartArea {
    fn y_of(&self, price: f64, range: PriceRange) -> i32 {
        price_to_y(price, range, self.height, self.top, self.bottom) as i32
    }
}

/// Draws entry/stop/take-profit/support/resistance marks from an
/// [`AnalysisRecord`] onto a copy of a chart image.
///
/// The annotator owns no shared state; concurrent calls with distinct
/// images are independent. Configure once (font, margins) and reuse.
pub struct ChartAnnotator {
    font: Option<FontArc>,
    margins: ChartMargins,
    max_levels: usize,
}

impl Default for ChartAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartAnnotator {
    pub fn new() -> Self {
        ChartAnnotator {
            font: None,
            margins: ChartMargins::default(),
            max_levels: 5,
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_margins(mut self, margins: ChartMargins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Draw the record's price levels onto a copy of `image`.
    ///
    /// Always returns an image. Missing or unparsable fields are
    /// skipped individually, and any internal drawing fault degrades
    /// to the unmodified copy instead of propagating.
    pub fn annotate(&self, image: &DynamicImage, record: &AnalysisRecord) -> Canvas {
        let base = image.to_rgb8();

        let record = match self.usable_record(record) {
            Some(record) => record,
            None => {
                debug!("no price data to annotate, returning image unchanged");
                return base;
            }
        };

        info!(
            "annotating {}x{} chart (entry={}, stop_loss={}, take_profits={}, supports={}, resistances={})",
            base.width(),
            base.height(),
            record.entry.is_some(),
            record.stop_loss.is_some(),
            record.take_profits.len(),
            record.support_levels.len(),
            record.resistance_levels.len(),
        );

        let range = resolve_range(&record);
        let mut canvas = base.clone();
        if let Err(error) = self.render(&mut canvas, &record, range) {
            warn!("annotation failed ({error}), returning image unchanged");
            return base;
        }

        info!("annotation complete");
        canvas
    }

    // Structured fields win; otherwise try scraping the raw fallback
    // text. `None` means there is nothing worth drawing.
    fn usable_record<'a>(&self, record: &'a AnalysisRecord) -> Option<Cow<'a, AnalysisRecord>> {
        if record.has_price_data() {
            return Some(Cow::Borrowed(record));
        }
        if record.parsed == Some(false) {
            if let Some(raw) = record.raw_text.as_deref() {
                if let Some(recovered) = recover_from_raw_text(raw) {
                    return Some(Cow::Owned(recovered));
                }
            }
        }
        None
    }

    fn render(&self, canvas: &mut Canvas, record: &AnalysisRecord, range: PriceRange) -> Result<()> {
        let width = canvas.width();
        let height = canvas.height();
        ensure!(width > 0 && height > 0, "empty canvas");

        let area = ChartArea {
            left: (width as f32 * self.margins.left) as i32,
            right: (width as f32 * (1.0 - self.margins.right)) as i32,
            top: (height as f32 * self.margins.top) as u32,
            bottom: (height as f32 * self.margins.bottom) as u32,
            height,
        };
        ensure!(
            area.left < area.right && area.top + area.bottom < height,
            "chart area collapsed for {width}x{height} image"
        );

        if self.font.is_none() {
            warn!("no label font configured, rendering lines and markers only");
        }

        // Current price first so every other layer draws over it.
        if let Some(token) = record.current_price.as_deref() {
            if let Some(price) = parse_price(token) {
                let y = area.y_of(price, range);
                draw_hline_mut(canvas, y, area.left, area.right, 1, PRICE_LINE_COLOR);
                if let Some(font) = &self.font {
                    let _ = draw_label(
                        canvas,
                        font,
                        &format!("PRICE: {token}"),
                        area.right - 120,
                        y - 15,
                        LEVEL_SCALE,
                        PRICE_TEXT_COLOR,
                        PRICE_BG_COLOR,
                        None,
                    );
                }
            }
        }

        if let Some(entry) = record.entry.as_ref() {
            if let (Some(token), Some(price)) = (entry.price.as_deref(), entry.parsed_price()) {
                let y = area.y_of(price, range);
                let x = (width as f32 * 0.75) as i32;
                draw_arrow_mut(canvas, x, y, ArrowDirection::Up, ENTRY_ARROW_SIZE, ENTRY_COLOR);
                if let Some(font) = &self.font {
                    let _ = draw_label(
                        canvas,
                        font,
                        &format!("ENTRY {token}"),
                        x + 25,
                        y - 50,
                        ENTRY_SCALE,
                        ENTRY_COLOR,
                        LABEL_BG_COLOR,
                        Some(ENTRY_COLOR),
                    );
                }
            }
        }

        if let Some(stop) = record.stop_loss.as_ref() {
            if let (Some(token), Some(price)) = (stop.price.as_deref(), stop.parsed_price()) {
                let y = area.y_of(price, range);
                let (dash, gap, thickness) = STOP_DASH;
                draw_dashed_hline_mut(
                    canvas, y, area.left, area.right, dash, gap, thickness, STOP_COLOR,
                );
                if let Some(font) = &self.font {
                    let _ = draw_label(
                        canvas,
                        font,
                        &format!("STOP LOSS: {token}"),
                        area.left + 15,
                        y - 20,
                        LABEL_SCALE,
                        STOP_COLOR,
                        LABEL_BG_COLOR,
                        Some(STOP_COLOR),
                    );
                }
            }
        }

        for (index, tp) in record.take_profits.iter().enumerate() {
            if let (Some(token), Some(price)) = (tp.price.as_deref(), tp.parsed_price()) {
                let y = area.y_of(price, range);
                let (dash, gap, thickness) = TP_DASH;
                draw_dashed_hline_mut(
                    canvas,
                    y,
                    area.left,
                    area.right,
                    dash,
                    gap,
                    thickness,
                    TP_LINE_COLOR,
                );
                if let Some(font) = &self.font {
                    let _ = draw_label(
                        canvas,
                        font,
                        &format!("TP{}: {token}", index + 1),
                        area.right - 120,
                        y - 15,
                        LABEL_SCALE,
                        TP_TEXT_COLOR,
                        LABEL_BG_COLOR,
                        Some(TP_LINE_COLOR),
                    );
                }
            }
        }

        self.render_levels(canvas, &record.support_levels, LevelKind::Support, range, &area);
        self.render_levels(
            canvas,
            &record.resistance_levels,
            LevelKind::Resistance,
            range,
            &area,
        );

        Ok(())
    }

    fn render_levels(
        &self,
        canvas: &mut Canvas,
        levels: &[PriceLevel],
        kind: LevelKind,
        range: PriceRange,
        area: &ChartArea,
    ) {
        let color = match kind {
            LevelKind::Support => SUPPORT_COLOR,
            LevelKind::Resistance => RESISTANCE_COLOR,
        };
        for level in levels.iter().take(self.max_levels) {
            if let (Some(token), Some(price)) = (level.price.as_deref(), level.parsed_price()) {
                let y = area.y_of(price, range);
                let (dash, gap, thickness) = LEVEL_DASH;
                draw_dashed_hline_mut(canvas, y, area.left, area.right, dash, gap, thickness, color);
                if let Some(font) = &self.font {
                    let _ = draw_label(
                        canvas,
                        font,
                        &format!("{kind}: {token}"),
                        area.left + 10,
                        y - 18,
                        LEVEL_SCALE,
                        color,
                        LABEL_BG_COLOR,
                        Some(color),
                    );
                }
            }
        }
    }
}

/// Price window for the vertical axis, guarded against the degenerate
/// case where every collected price is identical.
fn resolve_range(record: &AnalysisRecord) -> PriceRange {
    let range = estimate_price_range(record);
    if range.is_valid() {
        return range;
    }

    let prices = collect_prices(record);
    if !prices.is_empty() {
        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        let around_mean = PriceRange {
            min: mean * 0.8,
            max: mean * 1.2,
        };
        if around_mean.is_valid() {
            return around_mean;
        }
    }

    warn!("degenerate price range, falling back to {:?}", PriceRange::DEFAULT);
    PriceRange::DEFAULT
}

/// Last-resort price scrape for responses that never produced JSON.
///
/// A keyword-anchored pattern runs first; only when it finds nothing
/// does the generic "number that looks like a price" pattern run.
/// Scraped tokens map positionally: first to entry, second to
/// stop-loss, third and fourth to take-profits. The ordering is a
/// heuristic; free text gives no guarantee the first number really is
/// the entry.
pub fn recover_from_raw_text(raw_text: &str) -> Option<AnalysisRecord> {
    let keyword_pattern = Regex::new(
        r"(?i)(?:price|entry|stop|loss|tp|take.profit|support|resistance)[\s:]*\$?(\d+\.?\d*)",
    )
    .unwrap();
    let mut tokens: Vec<String> = keyword_pattern
        .captures_iter(raw_text)
        .map(|captures| captures[1].to_string())
        .collect();

    if tokens.is_empty() {
        let generic_pattern = Regex::new(r"\b(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)\b").unwrap();
        tokens = generic_pattern
            .captures_iter(raw_text)
            .map(|captures| captures[1].to_string())
            .collect();
    }

    if tokens.is_empty() {
        return None;
    }
    info!("recovered {} price tokens from raw model text", tokens.len());

    Some(AnalysisRecord {
        entry: tokens.first().map(|t| PriceLevel::from_token(t)),
        stop_loss: tokens.get(1).map(|t| PriceLevel::from_token(t)),
        take_profits: tokens
            .iter()
            .skip(2)
            .take(2)
            .map(|t| PriceLevel::from_token(t))
            .collect(),
        parsed: Some(true),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::png::encode_png;
    use crate::font::resolve_label_font;
    use common::extract_analysis;
    use image::RgbImage;
    use rand::Rng;

    fn white_chart(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    fn noise_chart(width: u32, height: u32) -> DynamicImage {
        let mut rng = rand::rng();
        let mut img = RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([rng.random(), rng.random(), rng.random()]);
        }
        DynamicImage::ImageRgb8(img)
    }

    fn rows_with_color(img: &Canvas, color: Rgb<u8>) -> Vec<u32> {
        let mut rows: Vec<u32> = img
            .enumerate_pixels()
            .filter(|(_, _, pixel)| **pixel == color)
            .map(|(_, y, _)| y)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    fn trade_record() -> AnalysisRecord {
        AnalysisRecord {
            entry: Some(PriceLevel::from_token("45000")),
            stop_loss: Some(PriceLevel::from_token("44000")),
            take_profits: vec![
                PriceLevel::from_token("47000"),
                PriceLevel::from_token("49000"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn empty_record_returns_identical_image() {
        let chart = noise_chart(320, 240);
        let annotated = ChartAnnotator::new().annotate(&chart, &AnalysisRecord::default());
        assert_eq!(annotated.as_raw(), chart.to_rgb8().as_raw());
    }

    #[test]
    fn raw_record_without_numbers_returns_identical_image() {
        let chart = noise_chart(320, 240);
        let record = AnalysisRecord::from_raw_text("no levels worth mentioning");
        let annotated = ChartAnnotator::new().annotate(&chart, &record);
        assert_eq!(annotated.as_raw(), chart.to_rgb8().as_raw());
    }

    #[test]
    fn input_image_is_never_mutated() {
        let chart = noise_chart(320, 240);
        let before = chart.clone();
        let _ = ChartAnnotator::new().annotate(&chart, &trade_record());
        assert_eq!(chart.to_rgb8().as_raw(), before.to_rgb8().as_raw());
    }

    #[test]
    fn stop_loss_renders_below_entry_and_take_profits() {
        let chart = white_chart(1000, 1000);
        let annotated = ChartAnnotator::new().annotate(&chart, &trade_record());

        let stop_rows = rows_with_color(&annotated, STOP_COLOR);
        let tp_rows = rows_with_color(&annotated, TP_LINE_COLOR);
        let entry_rows = rows_with_color(&annotated, ENTRY_COLOR);
        assert!(!stop_rows.is_empty() && !tp_rows.is_empty() && !entry_rows.is_empty());

        // lower price -> larger Y: stop below entry, entry below every TP
        let stop_top = *stop_rows.first().unwrap();
        let entry_bottom = *entry_rows.last().unwrap();
        let entry_top = *entry_rows.first().unwrap();
        let tp_bottom = *tp_rows.last().unwrap();
        assert!(stop_top > entry_bottom, "stop {stop_top} vs entry {entry_bottom}");
        assert!(entry_top > tp_bottom, "entry {entry_top} vs tp {tp_bottom}");
    }

    #[test]
    fn support_and_resistance_are_capped_at_five() {
        let chart = white_chart(600, 2000);
        let record = AnalysisRecord {
            chart_min_price: Some("0".to_string()),
            chart_max_price: Some("100".to_string()),
            support_levels: (1..=8)
                .map(|i| PriceLevel::from_token(&format!("{}", i * 10)))
                .collect(),
            ..Default::default()
        };
        let annotated = ChartAnnotator::new().annotate(&chart, &record);

        let rows = rows_with_color(&annotated, SUPPORT_COLOR);
        // 5 dashed lines, 4 px thick, at distinct heights
        let mut bands = 1;
        for pair in rows.windows(2) {
            if pair[1] - pair[0] > 1 {
                bands += 1;
            }
        }
        assert_eq!(bands, 5);
    }

    #[test]
    fn recovery_scrapes_keyword_anchored_prices() {
        let record = recover_from_raw_text(
            "I would look for entry: $45000 with stop loss: 44000, take profit: 47000 and support: 43000",
        )
        .unwrap();
        assert_eq!(record.entry.unwrap().price.as_deref(), Some("45000"));
        assert_eq!(record.stop_loss.unwrap().price.as_deref(), Some("44000"));
        let tps: Vec<_> = record
            .take_profits
            .iter()
            .filter_map(|tp| tp.price.as_deref())
            .collect();
        assert_eq!(tps, vec!["47000", "43000"]);
        assert_eq!(record.parsed, Some(true));
    }

    #[test]
    fn recovery_falls_back_to_generic_number_pattern() {
        let record =
            recover_from_raw_text("the chart shows levels around 1,250.50 and 1,180.25").unwrap();
        assert_eq!(record.entry.unwrap().price.as_deref(), Some("1,250.50"));
        assert_eq!(record.stop_loss.unwrap().price.as_deref(), Some("1,180.25"));
        assert!(record.take_profits.is_empty());
    }

    #[test]
    fn recovery_with_no_numbers_yields_nothing() {
        assert!(recover_from_raw_text("flat market, sit on hands").is_none());
    }

    #[test]
    fn degraded_record_still_produces_annotations() {
        let chart = white_chart(800, 600);
        let record = AnalysisRecord::from_raw_text("entry: $45000, stop loss: 44000");
        let annotated = ChartAnnotator::new().annotate(&chart, &record);
        assert!(!rows_with_color(&annotated, STOP_COLOR).is_empty());
        assert!(!rows_with_color(&annotated, ENTRY_COLOR).is_empty());
    }

    #[test]
    fn equal_prices_resolve_to_mean_window() {
        let record = AnalysisRecord {
            entry: Some(PriceLevel::from_token("100")),
            stop_loss: Some(PriceLevel::from_token("100")),
            ..Default::default()
        };
        assert_eq!(
            resolve_range(&record),
            PriceRange {
                min: 80.0,
                max: 120.0
            }
        );
    }

    #[test]
    fn range_defaults_when_nothing_parses() {
        assert_eq!(
            resolve_range(&AnalysisRecord::default()),
            PriceRange::DEFAULT
        );
    }

    #[test]
    fn pathological_image_degrades_to_unchanged_copy() {
        let chart = white_chart(1, 1);
        let annotated = ChartAnnotator::new().annotate(&chart, &trade_record());
        assert_eq!(annotated.as_raw(), chart.to_rgb8().as_raw());
    }

    #[test]
    fn annotated_canvas_encodes_to_png() {
        let chart = white_chart(400, 300);
        let annotated = ChartAnnotator::new().annotate(&chart, &trade_record());
        let png = encode_png(&annotated).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn extraction_feeds_straight_into_annotation() {
        let _ = env_logger::builder().is_test(true).try_init();
        let text = "Here is the setup:\n```json\n{\"entry\": {\"price\": \"45000\"}, \"stop_loss\": {\"price\": 44000}}\n```";
        let record = extract_analysis(text);
        let chart = white_chart(640, 480);
        let annotated = ChartAnnotator::new().annotate(&chart, &record);
        assert!(!rows_with_color(&annotated, STOP_COLOR).is_empty());
    }

    #[test]
    fn labels_render_when_a_font_is_available() {
        let Some(font) = resolve_label_font() else {
            return;
        };
        let chart = white_chart(1000, 1000);
        let annotated = ChartAnnotator::new()
            .with_font(font)
            .annotate(&chart, &trade_record());
        // label backgrounds paint black boxes the lines alone never do
        assert!(annotated.pixels().any(|p| *p == LABEL_BG_COLOR));
    }
}
