//! QC Oracle - Text-Only Block Checks
//!
//! Every check here reads rendered text plus optional ground truth. Nothing
//! here knows which renderer produced the text. Fill lengths are recomputed
//! with the same [`scale_bar_len`] the layout engine uses.

use serde::{Deserialize, Serialize};

use crate::layout::char_width;
use crate::palette::{closing_corner, fill_glyphs};
use crate::rounding::scale_bar_len;
use crate::series::{max_of, Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcResult {
    pub width_ok: bool,
    pub proportions_ok: bool,
    pub borders_ok: bool,
}

impl Default for QcResult {
    fn default() -> Self {
        Self {
            width_ok: true,
            proportions_ok: true,
            borders_ok: true,
        }
    }
}

impl QcResult {
    pub fn all_ok(&self) -> bool {
        self.width_ok && self.proportions_ok && self.borders_ok
    }
}

/// Run the three block checks. Proportions are only checked when both
/// `data` and `width` (the bar field width) are supplied.
pub fn qc_block(text: &str, data: Option<&Series>, width: Option<usize>) -> QcResult {
    let lines: Vec<&str> = text.lines().collect();
    let proportions_ok = match (data, width) {
        (Some(data), Some(width)) => check_proportions(&lines, &data.values(), width).ok(),
        _ => true,
    };
    QcResult {
        width_ok: widths_consistent(&lines),
        proportions_ok,
        borders_ok: borders_symmetric(&lines),
    }
}

/// Char widths of the non-blank lines.
pub fn line_widths(text: &str) -> Vec<usize> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(char_width)
        .collect()
}

pub fn widths_consistent(lines: &[&str]) -> bool {
    let mut widths = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| char_width(l));
    match widths.next() {
        Some(first) => widths.all(|w| w == first),
        None => true,
    }
}

/// The part of a bar row after its bracketed label.
///
/// Two row shapes are recognized: `[LABEL] ...` (leading whitespace allowed)
/// and `C [LABEL] ... C` where `C` is any cap glyph; the closing cap is not
/// part of the segment.
pub fn bar_segment(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('[') {
        let close = trimmed.find(']')?;
        return Some(&trimmed[close + 1..]);
    }

    let mut chars = line.chars();
    let cap = chars.next()?;
    if cap.is_whitespace() || chars.next()? != ' ' || chars.next()? != '[' || !line.ends_with(cap) {
        return None;
    }
    let inner = &line[cap.len_utf8() + 1..line.len() - cap.len_utf8()];
    let close = inner.find(']')?;
    Some(&inner[close + 1..])
}

pub fn count_fill(segment: &str) -> usize {
    let glyphs = fill_glyphs();
    segment.chars().filter(|c| glyphs.contains(c)).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillDiscrepancy {
    /// 1-based among bar rows.
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProportionReport {
    pub bar_rows: usize,
    pub values: usize,
    pub discrepancies: Vec<FillDiscrepancy>,
}

impl ProportionReport {
    /// Text without bar rows, or no values, has nothing to disagree with.
    pub fn ok(&self) -> bool {
        self.bar_rows == 0
            || self.values == 0
            || (self.bar_rows == self.values && self.discrepancies.is_empty())
    }
}

pub fn check_proportions(lines: &[&str], values: &[f64], width: usize) -> ProportionReport {
    let segments: Vec<&str> = lines.iter().filter_map(|l| bar_segment(l)).collect();
    let vmax = max_of(values.iter().copied());
    let discrepancies = segments
        .iter()
        .zip(values)
        .enumerate()
        .filter_map(|(i, (segment, &value))| {
            let expected = scale_bar_len(value, vmax, width);
            let actual = count_fill(segment);
            (expected != actual).then_some(FillDiscrepancy {
                row: i + 1,
                expected,
                actual,
            })
        })
        .collect();
    ProportionReport {
        bar_rows: segments.len(),
        values: values.len(),
        discrepancies,
    }
}

/// A row opening with a frame corner must close with its partner.
///
/// `+` only counts as a corner when followed by `-` or `=`, so prose and
/// arithmetic are left alone. Trailing padding is ignored.
pub fn borders_symmetric(lines: &[&str]) -> bool {
    lines.iter().all(|line| {
        let line = line.trim_end();
        let mut chars = line.chars();
        let Some(first) = chars.next() else {
            return true;
        };
        if first == '+' && !matches!(chars.next(), Some('-' | '=')) {
            return true;
        }
        match closing_corner(first) {
            Some(close) => char_width(line) > 1 && line.ends_with(close),
            None => true,
        }
    })
}

/// One-line diagnostic appended under a block when governors ask for it.
pub fn qc_footer(result: &QcResult, expected_width: usize, widths: &[usize], seed: Option<u32>) -> String {
    let seed = seed.map_or_else(|| "none".to_string(), |s| s.to_string());
    format!(
        "QC: width_ok={} expected={expected_width} widths={widths:?} math_ok={} borders_ok={} seed={seed}",
        result.width_ok, result.proportions_ok, result.borders_ok
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{render_bar_chart, BandSpec};

    fn sample() -> Series {
        Series::from([("API", 40.0), ("DB", 28.0), ("CACHE", 10.0)])
    }

    #[test]
    fn test_renderer_output_passes() {
        let text = render_bar_chart("Perf", &sample(), 30, "bold_unicode", false).unwrap();
        let qc = qc_block(&text, Some(&sample()), Some(30));
        assert!(qc.all_ok(), "{qc:?}\n{text}");
    }

    #[test]
    fn test_removed_fill_glyph_fails_proportions() {
        let text = render_bar_chart("Perf", &sample(), 30, "minimal_ascii", true).unwrap();
        let tampered = text.replacen("=", " ", 1);
        let qc = qc_block(&tampered, Some(&sample()), Some(30));
        assert!(qc.width_ok);
        assert!(!qc.proportions_ok);
    }

    #[test]
    fn test_band_rows_exclude_caps() {
        let band = BandSpec {
            title: "Band".into(),
            labels: vec!["A".into(), "B".into(), "C".into()],
            values: vec![40.0, 28.0, 10.0],
            total_width: 43,
            bar_width: Some(30),
        };
        let text = band.render().unwrap().text();
        let lines: Vec<&str> = text.lines().collect();
        let report = check_proportions(&lines, &band.values, 30);
        assert_eq!(report.bar_rows, 3);
        assert!(report.ok(), "{report:?}");
    }

    #[test]
    fn test_row_count_mismatch_fails() {
        let text = "[A] ==\n[B] =";
        assert!(!qc_block(text, Some(&Series::from([("A", 2.0)])), Some(2)).proportions_ok);
        assert!(qc_block("no bars here", Some(&sample()), Some(30)).proportions_ok);
    }

    #[test]
    fn test_widths() {
        assert!(widths_consistent(&["abc", "", "xyz", "   "]));
        assert!(!widths_consistent(&["abc", "ab"]));
        assert!(widths_consistent(&[]));
        assert_eq!(line_widths("ab\n\n█▓c"), vec![2, 3]);
    }

    #[test]
    fn test_border_symmetry() {
        assert!(borders_symmetric(&["┌──┐", "│  │", "└──┘"]));
        assert!(!borders_symmetric(&["┏━━━", "┗━━┛"]));
        assert!(!borders_symmetric(&["╔══╗", "╚══╗"]));
        assert!(!borders_symmetric(&["+---"]));
        assert!(borders_symmetric(&["+---+   ", "+1 = 2", "+"]));
    }

    #[test]
    fn test_footer_format() {
        let footer = qc_footer(&QcResult::default(), 47, &[47, 47], Some(42));
        assert_eq!(
            footer,
            "QC: width_ok=true expected=47 widths=[47, 47] math_ok=true borders_ok=true seed=42"
        );
        assert!(qc_footer(&QcResult::default(), 1, &[], None).ends_with("seed=none"));
    }
}
