//! Layout Engine - Fixed-Width Bar Templates
//!
//! Two renderers share one field allocator and the half-up fill rule:
//!
//! - the full-block band, where every row is exactly `total_width` chars:
//!   `cap + ' ' + LABEL(L) + ' ' + BAR(B) + ' ' + VALUE(V) + ' ' + cap`,
//!   so `L + B + V + 6 == total_width`;
//! - the compact chart, `[LABEL] BAR value (pct%)` with an optional ruler and
//!   tick labels, padded to a common block width.
//!
//! A row that misses its declared width is a contract violation. It is never
//! padded into shape.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::labels::resolve_labels;
use crate::palette::{effective_style_pack, StylePack, DEFAULT_STYLE_PACK, FULL_BLOCK};
use crate::rounding::{round_half_up, scale_bar_len};
use crate::series::{max_of, Series};

/// Cap, space, space, space, space, cap.
pub const FULL_BLOCK_OVERHEAD: usize = 6;
/// Usable label field floor, brackets included.
/// Smallest label field: the brackets plus three usable characters.
pub const MIN_LABEL_FIELD: usize = 5;
pub const MIN_VALUE_FIELD: usize = 2;

pub const TICK_FRACTIONS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

pub const NO_DATA: &str = "( no data )";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("width {total_width} cannot hold the row template (needs at least {required})")]
    LayoutInfeasible { total_width: usize, required: usize },

    #[error("{labels} labels but {values} values")]
    LengthMismatch { labels: usize, values: usize },

    #[error("value for label '{label}' is not finite")]
    NonFiniteValue { label: String },

    #[error("row {row} is {actual} chars wide, expected {expected}")]
    RowWidthViolation { row: usize, expected: usize, actual: usize },
}

/// Rendered rows, joined with `\n` on display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedBlock {
    rows: Vec<String>,
}

impl RenderedBlock {
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows }
    }

    /// Right-pad every row with spaces to the widest row.
    pub fn padded(rows: Vec<String>) -> Self {
        let width = rows.iter().map(|r| char_width(r)).max().unwrap_or(0);
        let rows = rows.into_iter().map(|r| format!("{r:<width$}")).collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn widths(&self) -> Vec<usize> {
        self.rows.iter().map(|r| char_width(r)).collect()
    }

    /// Width shared by every row, if there is one.
    pub fn width(&self) -> Option<usize> {
        let first = self.rows.first().map(|r| char_width(r))?;
        self.rows.iter().all(|r| char_width(r) == first).then_some(first)
    }

    pub fn text(&self) -> String {
        self.rows.join("\n")
    }

    /// First row whose width differs from `expected`.
    pub fn check_widths(&self, expected: usize) -> Result<(), RenderError> {
        match self
            .rows
            .iter()
            .enumerate()
            .find(|(_, r)| char_width(r) != expected)
        {
            Some((row, r)) => Err(RenderError::RowWidthViolation {
                row,
                expected,
                actual: char_width(r),
            }),
            None => Ok(()),
        }
    }

    /// Renderer exit point. A mismatch here is a layout bug, so debug builds
    /// stop on it.
    fn seal(self, expected: usize) -> Result<Self, RenderError> {
        let checked = self.check_widths(expected);
        debug_assert!(checked.is_ok(), "{checked:?}");
        checked.map(|()| self)
    }
}

impl std::fmt::Display for RenderedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

pub(crate) fn char_width(s: &str) -> usize {
    s.chars().count()
}

/// Field widths of one full-block band. `L + B + V + 6 == total_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    pub label_field_width: usize,
    pub bar_field_width: usize,
    pub value_field_width: usize,
    pub total_width: usize,
}

impl FieldLayout {
    /// Allocate fields for `labels` (already bracket-free) and `value_texts`.
    ///
    /// With an explicit `bar_width` the label field takes whatever is left.
    /// Otherwise the bar takes the rest, and the label field is shrunk (never
    /// below [`MIN_LABEL_FIELD`]) when the natural width leaves no bar.
    pub fn allocate<S: AsRef<str>>(
        labels: &[S],
        value_texts: &[String],
        total_width: usize,
        bar_width: Option<usize>,
    ) -> Result<Self, RenderError> {
        let natural_label = labels
            .iter()
            .map(|l| char_width(l.as_ref()) + 2)
            .max()
            .unwrap_or(MIN_LABEL_FIELD)
            .max(MIN_LABEL_FIELD);
        let value_field_width = value_texts
            .iter()
            .map(|v| char_width(v))
            .max()
            .unwrap_or(0)
            .max(MIN_VALUE_FIELD);
        let fixed = value_field_width + FULL_BLOCK_OVERHEAD;

        let (label_field_width, bar_field_width) = match bar_width {
            Some(bar) => {
                let required = fixed + bar.max(1) + MIN_LABEL_FIELD;
                if bar == 0 || total_width < required {
                    return Err(RenderError::LayoutInfeasible { total_width, required });
                }
                (total_width - fixed - bar, bar)
            }
            None => {
                let required = fixed + MIN_LABEL_FIELD + 1;
                if total_width < required {
                    return Err(RenderError::LayoutInfeasible { total_width, required });
                }
                if total_width >= fixed + natural_label + 1 {
                    (natural_label, total_width - fixed - natural_label)
                } else {
                    let shrunk = (total_width - fixed - 1).max(MIN_LABEL_FIELD);
                    log::debug!(
                        "label field shrunk from {natural_label} to {shrunk} to fit width {total_width}"
                    );
                    (shrunk, total_width - fixed - shrunk)
                }
            }
        };

        Ok(Self {
            label_field_width,
            bar_field_width,
            value_field_width,
            total_width,
        })
    }
}

/// `"[LABEL]"` padded or truncated to exactly `field` chars, brackets kept.
fn bracket_fit(label: &str, field: usize) -> String {
    let inner = field.saturating_sub(2);
    format!("[{label:<inner$.inner$}]")
}

fn strip_brackets(label: &str) -> &str {
    let trimmed = label.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .map_or(trimmed, str::trim)
}

fn check_finite<'a>(points: impl Iterator<Item = (&'a str, f64)>) -> Result<(), RenderError> {
    for (label, value) in points {
        if !value.is_finite() {
            return Err(RenderError::NonFiniteValue {
                label: label.to_string(),
            });
        }
    }
    Ok(())
}

fn value_text(value: f64) -> String {
    round_half_up(value).to_string()
}

/// Full-block band request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(default = "default_band_width")]
    pub total_width: usize,
    #[serde(default)]
    pub bar_width: Option<usize>,
}

fn default_band_width() -> usize {
    50
}

impl BandSpec {
    fn row_labels(&self) -> (Vec<String>, Option<Vec<String>>) {
        let stripped: Vec<&str> = self.labels.iter().map(|l| strip_brackets(l)).collect();
        let resolved = resolve_labels(&stripped);
        (resolved.row_labels, resolved.legend)
    }

    pub fn layout(&self) -> Result<FieldLayout, RenderError> {
        if self.labels.len() != self.values.len() {
            return Err(RenderError::LengthMismatch {
                labels: self.labels.len(),
                values: self.values.len(),
            });
        }
        let (row_labels, _) = self.row_labels();
        let value_texts: Vec<String> = self.values.iter().map(|v| value_text(*v)).collect();
        FieldLayout::allocate(&row_labels, &value_texts, self.total_width, self.bar_width)
    }

    pub fn render(&self) -> Result<RenderedBlock, RenderError> {
        if self.labels.len() != self.values.len() {
            return Err(RenderError::LengthMismatch {
                labels: self.labels.len(),
                values: self.values.len(),
            });
        }
        check_finite(self.labels.iter().map(String::as_str).zip(self.values.iter().copied()))?;

        let w = self.total_width;
        let cap_row: String = std::iter::repeat(FULL_BLOCK).take(w).collect();
        if self.labels.is_empty() {
            if w < 4 {
                return Err(RenderError::LayoutInfeasible { total_width: w, required: 4 });
            }
            let rows = vec![
                cap_row.clone(),
                title_row(&self.title, w),
                cap_row.clone(),
                inner_row(NO_DATA, w),
                cap_row,
            ];
            return RenderedBlock::new(rows).seal(w);
        }

        let fields = self.layout()?;
        let (row_labels, legend) = self.row_labels();
        let vmax = max_of(self.values.iter().copied());
        let (l, b, v) = (
            fields.label_field_width,
            fields.bar_field_width,
            fields.value_field_width,
        );

        let mut rows = vec![cap_row.clone(), title_row(&self.title, w), cap_row.clone()];
        if let Some(legend) = legend {
            rows.push(inner_row("Labels:", w));
            rows.extend(legend.iter().map(|entry| inner_row(entry, w)));
        }
        for (label, &value) in row_labels.iter().zip(&self.values) {
            let n = scale_bar_len(value, vmax, b);
            let bar: String = std::iter::repeat(FULL_BLOCK)
                .take(n)
                .chain(std::iter::repeat(' ').take(b - n))
                .collect();
            rows.push(format!(
                "{FULL_BLOCK} {} {bar} {:>v$} {FULL_BLOCK}",
                bracket_fit(label, l),
                value_text(value),
            ));
        }
        rows.push(cap_row);

        RenderedBlock::new(rows).seal(w)
    }
}

/// Titles show square brackets as parentheses. A bracketed label marks a
/// bar row, in bare or capped form, so no title line may carry one.
fn title_text(title: &str) -> Cow<'_, str> {
    if !title.contains(['[', ']']) {
        return Cow::Borrowed(title);
    }
    Cow::Owned(
        title
            .chars()
            .map(|c| match c {
                '[' => '(',
                ']' => ')',
                c => c,
            })
            .collect(),
    )
}

/// `" title "` centred between cap runs; a title too long for the row is cut.
fn title_row(title: &str, width: usize) -> String {
    let title = title_text(title);
    let mut inner = format!(" {title} ");
    if char_width(&inner) > width.saturating_sub(2) {
        let keep = width.saturating_sub(4);
        inner = format!(" {} ", title.chars().take(keep).collect::<String>());
    }
    let pad = width.saturating_sub(char_width(&inner));
    let left = pad / 2;
    let caps = |n: usize| std::iter::repeat(FULL_BLOCK).take(n).collect::<String>();
    format!("{}{inner}{}", caps(left), caps(pad - left))
}

/// `cap + ' ' + text + ' ' + cap`, text fitted to `width - 4`.
fn inner_row(text: &str, width: usize) -> String {
    let inner = width.saturating_sub(4);
    format!("{FULL_BLOCK} {text:<inner$.inner$} {FULL_BLOCK}")
}

pub fn render_full_block_band<S: AsRef<str>>(
    title: &str,
    labels: &[S],
    values: &[f64],
    total_width: usize,
    bar_width: Option<usize>,
) -> Result<String, RenderError> {
    BandSpec {
        title: title.to_string(),
        labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
        values: values.to_vec(),
        total_width,
        bar_width,
    }
    .render()
    .map(|block| block.text())
}

/// Compact chart request. `width` is the bar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartSpec {
    pub title: String,
    pub series: Series,
    pub width: usize,
    #[serde(default = "default_style_pack")]
    pub style_pack: String,
    #[serde(default)]
    pub ascii_only: bool,
    #[serde(default = "default_show_scale")]
    pub show_scale: bool,
}

fn default_style_pack() -> String {
    DEFAULT_STYLE_PACK.to_string()
}

fn default_show_scale() -> bool {
    true
}

impl BarChartSpec {
    pub fn new(title: impl Into<String>, series: Series, width: usize) -> Self {
        Self {
            title: title.into(),
            series,
            width,
            style_pack: default_style_pack(),
            ascii_only: false,
            show_scale: true,
        }
    }

    pub fn pack(&self) -> &'static StylePack {
        effective_style_pack(&self.style_pack, self.ascii_only)
    }

    pub fn render(&self) -> Result<RenderedBlock, RenderError> {
        let width = self.width;
        if width == 0 {
            return Err(RenderError::LayoutInfeasible { total_width: 0, required: 1 });
        }
        check_finite(self.series.iter())?;
        if self.series.is_empty() {
            return Ok(RenderedBlock::padded(vec![title_text(&self.title).into_owned(), NO_DATA.to_string()]));
        }

        let pack = self.pack();
        let resolved = resolve_labels(&self.series.labels());
        let inner = resolved.row_labels.iter().map(|l| char_width(l)).max().unwrap_or(0);
        let vmax = self.series.max_value();
        let total = self.series.total();

        let values = self.series.values();
        let value_texts: Vec<String> = values.iter().map(|v| value_text(*v)).collect();
        let percents: Vec<String> = values
            .iter()
            .map(|v| {
                if total > 0.0 {
                    round_half_up(v / total * 100.0).to_string()
                } else {
                    "0".to_string()
                }
            })
            .collect();
        let vw = value_texts.iter().map(String::len).max().unwrap_or(1);
        let pw = percents.iter().map(String::len).max().unwrap_or(1);

        let mut lines = vec![title_text(&self.title).into_owned()];
        if let Some(legend) = &resolved.legend {
            lines.push("Labels:".to_string());
            lines.extend(legend.iter().map(|entry| format!("  {entry}")));
        }
        for (i, label) in resolved.row_labels.iter().enumerate() {
            let n = scale_bar_len(values[i], vmax, width);
            let bar: String = std::iter::repeat(pack.fill)
                .take(n)
                .chain(std::iter::repeat(pack.empty).take(width - n))
                .collect();
            lines.push(format!(
                "[{label:<inner$}] {bar} {:>vw$} ({:>pw$}%)",
                value_texts[i], percents[i],
            ));
        }
        if self.show_scale {
            let indent = " ".repeat(inner + 3);
            lines.push(format!("{indent}{}", ruler(width, pack)));
            lines.push(format!("{indent}{}", tick_labels(width, vmax)));
        }

        let block = RenderedBlock::padded(lines);
        match block.width() {
            Some(w) => block.seal(w),
            None => Ok(block),
        }
    }
}

/// Tick columns within a field of `width`, clamped to `[0, width - 1]`.
pub fn tick_columns(width: usize) -> [usize; 5] {
    let last = width.saturating_sub(1) as i64;
    TICK_FRACTIONS.map(|p| round_half_up(p * width as f64).clamp(0, last) as usize)
}

fn ruler(width: usize, pack: &StylePack) -> String {
    let mut cols = vec![pack.frame.h; width];
    for col in tick_columns(width) {
        cols[col] = pack.ruler;
    }
    cols.into_iter().collect()
}

/// Tick values placed left to right; a label starts at its tick column or
/// one space after the previous label, whichever is later.
fn tick_labels(width: usize, vmax: f64) -> String {
    let mut row = String::new();
    let mut end = 0usize;
    for (i, (p, target)) in TICK_FRACTIONS.iter().zip(tick_columns(width)).enumerate() {
        let label = if vmax > 0.0 { round_half_up(p * vmax) } else { 0 }.to_string();
        let start = if i == 0 { target } else { target.max(end + 1) };
        row.push_str(&" ".repeat(start - end));
        row.push_str(&label);
        end = start + label.len();
    }
    row
}

pub fn render_bar_chart(
    title: &str,
    series: &Series,
    width: usize,
    style_pack: &str,
    ascii_only: bool,
) -> Result<String, RenderError> {
    BarChartSpec {
        title: title.to_string(),
        series: series.clone(),
        width,
        style_pack: style_pack.to_string(),
        ascii_only,
        show_scale: true,
    }
    .render()
    .map(|block| block.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Series {
        Series::from([("API", 40.0), ("DB", 28.0), ("CACHE", 10.0)])
    }

    #[test]
    fn test_band_rows_are_exact_width() {
        let text = render_full_block_band("SALES", &["NORTH", "SOUTH", "EAST"], &[45.0, 30.0, 10.0], 50, None)
            .unwrap();
        for line in text.lines() {
            assert_eq!(line.chars().count(), 50, "{line:?}");
        }
        assert!(text.lines().nth(1).unwrap().contains(" SALES "));
    }

    #[test]
    fn test_band_fill_lengths() {
        let band = BandSpec {
            title: "T".into(),
            labels: vec!["A".into(), "B".into(), "C".into()],
            values: vec![40.0, 28.0, 10.0],
            total_width: 43,
            bar_width: Some(30),
        };
        let fields = band.layout().unwrap();
        assert_eq!(fields.bar_field_width, 30);
        assert_eq!(fields.label_field_width, 43 - 30 - 2 - 6);
        let block = band.render().unwrap();
        let counts: Vec<usize> = block.rows()[3..6]
            .iter()
            .map(|r| r.chars().filter(|&c| c == FULL_BLOCK).count() - 2)
            .collect();
        assert_eq!(counts, vec![30, 21, 8]);
    }

    #[test]
    fn test_band_row_template() {
        let text = render_full_block_band("X", &["[AB]"], &[5.0], 14, None).unwrap();
        assert_eq!(text.lines().nth(3).unwrap(), "█ [AB ] █  5 █");
    }

    #[test]
    fn test_band_shrinks_label_then_fails() {
        let fields = FieldLayout::allocate(&["VERY_LONG_LABEL"], &["10".to_string()], 20, None).unwrap();
        assert_eq!(fields.label_field_width, 11);
        assert_eq!(fields.bar_field_width, 1);

        let err = FieldLayout::allocate(&["X"], &["10".to_string()], 13, None).unwrap_err();
        assert_eq!(err, RenderError::LayoutInfeasible { total_width: 13, required: 14 });

        let err = render_full_block_band("T", &["A"], &[1.0], 20, Some(15)).unwrap_err();
        assert!(matches!(err, RenderError::LayoutInfeasible { .. }));
    }

    #[test]
    fn test_bracketed_titles_never_read_as_bar_rows() {
        assert_eq!(title_text("[Q3] Latency"), "(Q3) Latency");
        assert_eq!(title_text("  [x"), "  (x");
        assert_eq!(title_text("Q3 [a]"), "Q3 (a)");
        assert_eq!(title_text("Q3"), "Q3");

        let text = render_bar_chart("[Q3] Latency", &sample(), 30, "minimal_ascii", false).unwrap();
        assert!(text.starts_with("(Q3) Latency"));
        assert!(crate::qc::qc_block(&text, Some(&sample()), Some(30)).all_ok(), "{text}");

        // widest line, so unpadded: `x [` ... `x` has the capped shape
        let title = "x [y] quarterly latency by service x";
        let text = render_bar_chart(title, &sample(), 4, "minimal_ascii", false).unwrap();
        assert_eq!(text.lines().next(), Some("x (y) quarterly latency by service x"));
        assert!(crate::qc::qc_block(&text, Some(&sample()), Some(4)).all_ok(), "{text}");

        let band = BandSpec {
            title: "[Q3] regional revenue summary".into(),
            labels: vec!["API".into(), "DB".into(), "CACHE".into()],
            values: vec![40.0, 28.0, 10.0],
            total_width: 33,
            bar_width: None,
        };
        let text = band.render().unwrap().text();
        let bar_width = band.layout().unwrap().bar_field_width;
        let lines: Vec<&str> = text.lines().collect();
        assert!(crate::qc::check_proportions(&lines, &band.values, bar_width).ok(), "{text}");
    }

    #[test]
    fn test_band_input_errors() {
        assert_eq!(
            render_full_block_band("T", &["A", "B"], &[1.0], 40, None),
            Err(RenderError::LengthMismatch { labels: 2, values: 1 })
        );
        assert!(matches!(
            render_full_block_band("T", &["A"], &[f64::NAN], 40, None),
            Err(RenderError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_band_empty_is_placeholder() {
        let empty: [&str; 0] = [];
        let text = render_full_block_band("T", &empty, &[], 30, None).unwrap();
        assert!(text.contains(NO_DATA));
        assert!(text.lines().all(|l| l.chars().count() == 30));
    }

    #[test]
    fn test_band_legend_for_cjk() {
        let text = render_full_block_band("T", &["温度", "DB"], &[3.0, 1.0], 40, None).unwrap();
        assert!(text.contains("Labels:"));
        assert!(text.contains("1. ONDO"));
        assert!(text.contains("[1]"));
        assert!(!text.contains('温'));
    }

    #[test]
    fn test_check_widths_reports_first_bad_row() {
        let block = RenderedBlock::new(vec!["abc".into(), "ab".into()]);
        assert_eq!(
            block.check_widths(3),
            Err(RenderError::RowWidthViolation { row: 1, expected: 3, actual: 2 })
        );
        assert_eq!(block.width(), None);
    }

    #[test]
    fn test_compact_chart_rows() {
        let text = render_bar_chart("Perf", &sample(), 30, "bold_unicode", true).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], format!("[API  ] {} 40 (51%)", "=".repeat(30)));
        assert_eq!(lines[2], format!("[DB   ] {}{} 28 (36%)", "=".repeat(21), " ".repeat(9)));
        assert_eq!(lines[3], format!("[CACHE] {}{} 10 (13%)", "=".repeat(8), " ".repeat(22)));
        assert!(lines.iter().all(|l| l.chars().count() == 47));
    }

    #[test]
    fn test_compact_ruler_and_ticks() {
        let text = render_bar_chart("Perf", &sample(), 30, "minimal_ascii", false).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let ruler = lines[4].trim_end();
        assert_eq!(&ruler[8..], "|-------|------|-------|-----|");
        assert_eq!(lines[5].trim_end(), format!("{}0       10     20      30    40", " ".repeat(8)));
    }

    #[test]
    fn test_tick_columns_round_half_up() {
        assert_eq!(tick_columns(10), [0, 3, 5, 8, 9]);
        assert_eq!(tick_labels(10, 5.0), "0  1 3  4 5");
    }

    #[test]
    fn test_compact_percent_tie_rounds_up() {
        let series = Series::from([("a", 1.0), ("b", 7.0)]);
        let text = render_bar_chart("T", &series, 8, "minimal_ascii", false).unwrap();
        assert!(text.contains("1 (13%)"));
        assert!(text.contains("7 (88%)"));
    }

    #[test]
    fn test_compact_empty_and_zero_width() {
        let text = render_bar_chart("Empty", &Series::new(), 20, "minimal_ascii", false).unwrap();
        assert_eq!(text, format!("{:<11}\n{NO_DATA}", "Empty"));
        assert!(matches!(
            render_bar_chart("T", &sample(), 0, "minimal_ascii", false),
            Err(RenderError::LayoutInfeasible { .. })
        ));
    }

    #[test]
    fn test_compact_nonpositive_max_draws_empty_bars() {
        let series = Series::from([("a", 0.0), ("b", -2.0)]);
        let text = render_bar_chart("T", &series, 6, "minimal_ascii", false).unwrap();
        assert!(text.lines().filter(|l| l.starts_with('[')).all(|l| !l.contains('=')));
    }
}
