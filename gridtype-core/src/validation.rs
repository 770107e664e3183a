//! Validation Suite - Scored Checks, Isolated Failures
//!
//! Checks produce a pass/fail, a score in `[0, 1]` and a structured detail
//! payload. The validator runs each check on its own: a check that errors or
//! panics becomes a failing result for that check alone.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::layout::char_width;
use crate::palette::unicode_box_style;
use crate::qc::{borders_symmetric, check_proportions};
use crate::series::Series;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub score: f64,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl CheckResult {
    pub fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            score: 1.0,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn fail(name: &str, score: f64, message: impl Into<String>, details: Value) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            score: score.clamp(0.0, 1.0),
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid check input: {0}")]
    InvalidInput(String),

    #[error("check panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_max_accents_per_line")]
    pub max_accents_per_line: usize,
    #[serde(default = "default_max_accent_ratio")]
    pub max_accent_ratio: f64,
    #[serde(default = "default_parity_threshold")]
    pub parity_threshold: f64,
}

fn default_min_chars() -> usize {
    45
}
fn default_max_chars() -> usize {
    72
}
fn default_max_accents_per_line() -> usize {
    3
}
fn default_max_accent_ratio() -> f64 {
    0.05
}
fn default_parity_threshold() -> f64 {
    0.01
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
            max_accents_per_line: default_max_accents_per_line(),
            max_accent_ratio: default_max_accent_ratio(),
            parity_threshold: default_parity_threshold(),
        }
    }
}

/// What a check may look at.
#[derive(Debug, Clone)]
pub struct CheckInput<'a> {
    pub text: &'a str,
    pub lines: Vec<&'a str>,
    pub data: Option<&'a Series>,
    pub width: Option<usize>,
    pub dom_text: Option<&'a str>,
    pub cli_text: Option<&'a str>,
}

impl<'a> CheckInput<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: text.lines().collect(),
            data: None,
            width: None,
            dom_text: None,
            cli_text: None,
        }
    }

    fn content_lines(&self) -> impl Iterator<Item = &&'a str> + '_ {
        self.lines.iter().filter(|l| !l.trim().is_empty())
    }
}

pub trait QualityCheck {
    fn name(&self) -> &'static str;

    fn applies(&self, _input: &CheckInput<'_>) -> bool {
        true
    }

    fn run(&self, input: &CheckInput<'_>, config: &ValidationConfig) -> Result<CheckResult, CheckError>;
}

// --- Concrete Checks ---

pub struct RowWidthCheck;

impl QualityCheck for RowWidthCheck {
    fn name(&self) -> &'static str {
        "row_widths"
    }

    fn run(&self, input: &CheckInput<'_>, _config: &ValidationConfig) -> Result<CheckResult, CheckError> {
        let widths: Vec<usize> = input.content_lines().map(|l| char_width(l)).collect();
        let mut unique = widths.clone();
        unique.sort_unstable();
        unique.dedup();
        Ok(match unique.as_slice() {
            [] => CheckResult::pass(self.name(), "No applicable lines"),
            [w] => CheckResult::pass(
                self.name(),
                format!("All {} lines have equal width ({w} chars)", widths.len()),
            ),
            [min, .., max] => CheckResult::fail(
                self.name(),
                0.0,
                format!(
                    "Width mismatch: {} different widths (min: {min}, max: {max})",
                    unique.len()
                ),
                json!({ "widths": widths, "unique_widths": unique }),
            ),
        })
    }
}

pub struct LineLengthCheck;

impl QualityCheck for LineLengthCheck {
    fn name(&self) -> &'static str {
        "line_length"
    }

    fn run(&self, input: &CheckInput<'_>, config: &ValidationConfig) -> Result<CheckResult, CheckError> {
        if config.min_chars > config.max_chars {
            return Err(CheckError::InvalidInput(format!(
                "min_chars {} exceeds max_chars {}",
                config.min_chars, config.max_chars
            )));
        }
        let (mut content, mut short, mut long) = (0usize, 0usize, 0usize);
        let mut violations = Vec::new();
        for (i, line) in input.lines.iter().enumerate() {
            let len = char_width(line.trim());
            if len == 0 {
                continue;
            }
            content += 1;
            if len < config.min_chars {
                short += 1;
                violations.push(format!("Line {}: {len} chars (too short)", i + 1));
            } else if len > config.max_chars {
                long += 1;
                violations.push(format!("Line {}: {len} chars (too long)", i + 1));
            }
        }

        let total = short + long;
        if total == 0 {
            return Ok(CheckResult::pass(
                self.name(),
                format!(
                    "All {content} lines within {}-{} char range",
                    config.min_chars, config.max_chars
                ),
            ));
        }
        let score = 1.0 - total as f64 / content as f64;
        let mut result = CheckResult::fail(
            self.name(),
            score,
            format!("{total}/{content} lines outside range ({short} short, {long} long)"),
            json!({
                "violations": violations.iter().take(10).collect::<Vec<_>>(),
                "total_violations": total,
            }),
        );
        result.passed = result.score >= 0.9;
        Ok(result)
    }
}

/// Punctuation plus block, braid and box-drawing glyphs.
const ACCENT_ASCII: &str = "!@#$%^&*()_+=[]{}|\\:;\"'<>?/~`";
const ACCENT_UNICODE: &str = "▁▂▃▄▅▆▇█▏▎▍▌▋▊▉╱╲─━═│┃║┌┐└┘┏┓┗┛╔╗╚╝";

fn is_accent(c: char) -> bool {
    ACCENT_ASCII.contains(c) || ACCENT_UNICODE.contains(c)
}

pub struct AccentBudgetCheck;

impl QualityCheck for AccentBudgetCheck {
    fn name(&self) -> &'static str {
        "accent_budget"
    }

    fn run(&self, input: &CheckInput<'_>, config: &ValidationConfig) -> Result<CheckResult, CheckError> {
        let (mut accents, mut chars) = (0usize, 0usize);
        let mut violations = Vec::new();
        for (i, line) in input.lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let count = line.chars().filter(|&c| is_accent(c)).count();
            accents += count;
            chars += char_width(line);
            if count > config.max_accents_per_line {
                violations.push(format!(
                    "Line {}: {count} accents (>{})",
                    i + 1,
                    config.max_accents_per_line
                ));
            }
        }

        let ratio = if chars > 0 { accents as f64 / chars as f64 } else { 0.0 };
        let ratio_exceeded = ratio > config.max_accent_ratio;
        if violations.is_empty() && !ratio_exceeded {
            return Ok(CheckResult::pass(
                self.name(),
                format!(
                    "Accent budget OK: {ratio:.3} ratio, max {}/line",
                    config.max_accents_per_line
                ),
            ));
        }

        let line_share = violations.len() as f64 / input.lines.len().max(1) as f64;
        let ratio_share = if config.max_accent_ratio > 0.0 {
            ratio / config.max_accent_ratio * 0.5
        } else {
            0.5
        };
        let mut issues = Vec::new();
        if !violations.is_empty() {
            issues.push(format!(
                "{} lines exceed {} accents",
                violations.len(),
                config.max_accents_per_line
            ));
        }
        if ratio_exceeded {
            issues.push(format!(
                "Overall ratio {ratio:.3} > {}",
                config.max_accent_ratio
            ));
        }
        Ok(CheckResult::fail(
            self.name(),
            1.0 - line_share - ratio_share,
            issues.join("; "),
            json!({
                "violations": violations.iter().take(5).collect::<Vec<_>>(),
                "accent_ratio": ratio,
            }),
        ))
    }
}

pub struct BorderIntegrityCheck;

impl QualityCheck for BorderIntegrityCheck {
    fn name(&self) -> &'static str {
        "border_integrity"
    }

    fn run(&self, input: &CheckInput<'_>, _config: &ValidationConfig) -> Result<CheckResult, CheckError> {
        let mut detected: Option<&'static str> = None;
        let mut mixed = false;
        let mut border_lines = 0usize;
        for line in &input.lines {
            let mut has_border = false;
            for c in line.chars() {
                if matches!(c, '-' | '|' | '+') {
                    has_border = true;
                } else if let Some(style) = unicode_box_style(c) {
                    has_border = true;
                    match detected {
                        None => detected = Some(style),
                        Some(seen) if seen != style => mixed = true,
                        Some(_) => {}
                    }
                }
            }
            border_lines += usize::from(has_border);
        }
        if border_lines == 0 {
            return Ok(CheckResult::pass(self.name(), "No border characters found"));
        }

        let mut issues = Vec::new();
        if mixed {
            issues.push("Mixed border styles detected");
        }
        let mut table_widths: Vec<usize> = input
            .lines
            .iter()
            .filter(|l| l.contains(['|', '│', '║']))
            .map(|l| char_width(l.trim_end()))
            .collect();
        let table_rows = table_widths.len();
        table_widths.sort_unstable();
        table_widths.dedup();
        if table_rows >= 3 && table_widths.len() > 2 {
            issues.push("Inconsistent table row widths");
        }
        if !borders_symmetric(&input.lines) {
            issues.push("Asymmetric frame corners");
        }

        let style = detected.unwrap_or("ascii");
        if issues.is_empty() {
            return Ok(CheckResult::pass(
                self.name(),
                format!("Border integrity OK: {border_lines} border lines, style: {style}"),
            ));
        }
        Ok(CheckResult::fail(
            self.name(),
            1.0 - 0.5 * issues.len() as f64,
            issues.join("; "),
            json!({ "detected_style": style, "border_line_count": border_lines }),
        ))
    }
}

pub struct BarProportionCheck;

impl QualityCheck for BarProportionCheck {
    fn name(&self) -> &'static str {
        "bar_proportions"
    }

    fn applies(&self, input: &CheckInput<'_>) -> bool {
        input.data.is_some() && input.width.is_some()
    }

    fn run(&self, input: &CheckInput<'_>, _config: &ValidationConfig) -> Result<CheckResult, CheckError> {
        let (Some(data), Some(width)) = (input.data, input.width) else {
            return Err(CheckError::InvalidInput("data and width are required".into()));
        };
        if data.is_empty() {
            return Ok(CheckResult::pass(self.name(), "No data to validate against"));
        }
        let report = check_proportions(&input.lines, &data.values(), width);
        if report.bar_rows == 0 {
            return Ok(CheckResult::pass(self.name(), "No bar lines found"));
        }
        if report.ok() {
            return Ok(CheckResult::pass(
                self.name(),
                format!("All {} bar proportions mathematically accurate", report.bar_rows),
            ));
        }

        let score = if report.bar_rows != report.values {
            0.0
        } else {
            let total_error: usize = report
                .discrepancies
                .iter()
                .map(|d| d.expected.abs_diff(d.actual))
                .sum();
            1.0 - total_error as f64 / (report.bar_rows * width.max(1)) as f64
        };
        Ok(CheckResult::fail(
            self.name(),
            score,
            format!(
                "{}/{} bars have proportion errors ({} values)",
                report.discrepancies.len(),
                report.bar_rows,
                report.values
            ),
            json!({ "discrepancies": report.discrepancies.iter().take(5).collect::<Vec<_>>() }),
        ))
    }
}

/// Edit distance over chars, two-row dynamic programme.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = vec![0; short.len() + 1];
    for (i, &c1) in long.iter().enumerate() {
        current[0] = i + 1;
        for (j, &c2) in short.iter().enumerate() {
            let substitution = previous[j] + usize::from(c1 != c2);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[short.len()]
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct ParityCheck;

impl QualityCheck for ParityCheck {
    fn name(&self) -> &'static str {
        "parity"
    }

    fn applies(&self, input: &CheckInput<'_>) -> bool {
        input.dom_text.is_some() && input.cli_text.is_some()
    }

    fn run(&self, input: &CheckInput<'_>, config: &ValidationConfig) -> Result<CheckResult, CheckError> {
        let (Some(dom), Some(cli)) = (input.dom_text, input.cli_text) else {
            return Err(CheckError::InvalidInput("two renderings are required".into()));
        };
        let (dom, cli) = (normalize_ws(dom), normalize_ws(cli));
        if dom.is_empty() || cli.is_empty() {
            return Ok(CheckResult::fail(
                self.name(),
                0.0,
                "Cannot compare empty outputs",
                json!({ "dom_len": char_width(&dom), "cli_len": char_width(&cli) }),
            ));
        }

        let distance = levenshtein(&dom, &cli);
        let max_len = char_width(&dom).max(char_width(&cli));
        let similarity = 1.0 - distance as f64 / max_len as f64;
        let diff_ratio = 1.0 - similarity;
        let passed = diff_ratio <= config.parity_threshold;

        let divergence = dom.chars().zip(cli.chars()).position(|(a, b)| a != b).or_else(|| {
            (char_width(&dom) != char_width(&cli)).then(|| char_width(&dom).min(char_width(&cli)))
        });
        let excerpt = |s: &str, at: usize| s.chars().skip(at.saturating_sub(10)).take(30).collect::<String>();

        Ok(CheckResult {
            name: self.name().to_string(),
            passed,
            score: similarity.clamp(0.0, 1.0),
            message: format!(
                "Diff ratio: {diff_ratio:.4} ({} threshold {})",
                if passed { "PASS" } else { "FAIL" },
                config.parity_threshold
            ),
            details: json!({
                "levenshtein_distance": distance,
                "similarity": similarity,
                "diff_ratio": diff_ratio,
                "threshold": config.parity_threshold,
                "first_divergence": divergence,
                "dom_excerpt": divergence.map(|at| excerpt(&dom, at)),
                "cli_excerpt": divergence.map(|at| excerpt(&cli, at)),
            }),
        })
    }
}

/// Validator runs every applicable check and contains failures per check.
pub struct Validator {
    checks: Vec<Box<dyn QualityCheck>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(RowWidthCheck),
                Box::new(LineLengthCheck),
                Box::new(AccentBudgetCheck),
                Box::new(BorderIntegrityCheck),
                Box::new(BarProportionCheck),
                Box::new(ParityCheck),
            ],
        }
    }

    pub fn with_checks(checks: Vec<Box<dyn QualityCheck>>) -> Self {
        Self { checks }
    }

    pub fn validate(&self, input: &CheckInput<'_>, config: &ValidationConfig) -> Vec<CheckResult> {
        self.checks
            .iter()
            .filter(|check| check.applies(input))
            .map(|check| {
                let outcome = catch_unwind(AssertUnwindSafe(|| check.run(input, config)))
                    .unwrap_or_else(|payload| Err(CheckError::Panicked(panic_message(payload.as_ref()))));
                outcome.unwrap_or_else(|err| {
                    log::warn!("check '{}' failed internally: {err}", check.name());
                    CheckResult::fail(
                        check.name(),
                        0.0,
                        err.to_string(),
                        json!({ "internal_error": true }),
                    )
                })
            })
            .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// The full suite: row widths, line length, accent budget and border
/// integrity always; bar proportions with `data` and `width`; parity with
/// both renderings.
pub fn run_full_validation(
    text: &str,
    data: Option<&Series>,
    width: Option<usize>,
    dom_text: Option<&str>,
    cli_text: Option<&str>,
    config: &ValidationConfig,
) -> Vec<CheckResult> {
    let input = CheckInput {
        data,
        width,
        dom_text,
        cli_text,
        ..CheckInput::new(text)
    };
    Validator::new().validate(&input, config)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSummary {
    pub name: String,
    pub passed: bool,
    pub score: f64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub average_score: f64,
    pub overall_grade: Grade,
    pub checks: Vec<CheckSummary>,
}

pub fn validation_summary(results: &[CheckResult]) -> ValidationSummary {
    let total_checks = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let (pass_rate, average_score) = if total_checks > 0 {
        (
            passed as f64 / total_checks as f64,
            results.iter().map(|r| r.score).sum::<f64>() / total_checks as f64,
        )
    } else {
        (0.0, 0.0)
    };
    ValidationSummary {
        total_checks,
        passed,
        failed: total_checks - passed,
        pass_rate,
        average_score,
        overall_grade: if passed == total_checks { Grade::Pass } else { Grade::Fail },
        checks: results
            .iter()
            .map(|r| CheckSummary {
                name: r.name.clone(),
                passed: r.passed,
                score: r.score,
                message: r.message.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::render_bar_chart;

    fn by_name<'a>(results: &'a [CheckResult], name: &str) -> &'a CheckResult {
        results.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_row_width_mismatch_details() {
        let results = run_full_validation("abc\nab\n\nabcd", None, None, None, None, &ValidationConfig::default());
        let rows = by_name(&results, "row_widths");
        assert!(!rows.passed);
        assert_eq!(rows.details["unique_widths"], json!([2, 3, 4]));
    }

    #[test]
    fn test_conditional_checks_only_with_inputs() {
        let config = ValidationConfig::default();
        let names: Vec<String> = run_full_validation("x", None, None, None, None, &config)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["row_widths", "line_length", "accent_budget", "border_integrity"]);

        let series = Series::from([("a", 1.0)]);
        let results = run_full_validation("x", Some(&series), Some(4), Some("a"), Some("a"), &config);
        assert_eq!(results.len(), 6);
    }

    #[test]
    fn test_line_length_scoring() {
        let ok = "x".repeat(50);
        let text = format!("{ok}\n{ok}\nshort");
        let results = run_full_validation(&text, None, None, None, None, &ValidationConfig::default());
        let check = by_name(&results, "line_length");
        assert!(!check.passed);
        assert!((check.score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_accent_budget() {
        let config = ValidationConfig::default();
        let calm = "Plain words only here";
        assert!(by_name(&run_full_validation(calm, None, None, None, None, &config), "accent_budget").passed);
        let loud = "!!! ### ***";
        let check = run_full_validation(loud, None, None, None, None, &config);
        let check = by_name(&check, "accent_budget");
        assert!(!check.passed);
        assert_eq!(check.score, 0.0);
    }

    #[test]
    fn test_border_integrity_flags_mixing_and_asymmetry() {
        let config = ValidationConfig::default();
        let mixed = "┌──┐\n╚══╝";
        let check = run_full_validation(mixed, None, None, None, None, &config);
        let check = by_name(&check, "border_integrity");
        assert!(!check.passed);
        assert_eq!(check.score, 0.5);

        let lopsided = "┏━━━\n┗━━┛";
        let check = run_full_validation(lopsided, None, None, None, None, &config);
        assert!(check[3].message.contains("Asymmetric"));

        let clean = "┌──┐\n│ab│\n└──┘";
        assert!(run_full_validation(clean, None, None, None, None, &config)[3].passed);
    }

    #[test]
    fn test_bar_proportions_against_renderer() {
        let series = Series::from([("API", 40.0), ("DB", 28.0), ("CACHE", 10.0)]);
        let text = render_bar_chart("Perf", &series, 30, "minimal_ascii", true).unwrap();
        let config = ValidationConfig::default();
        let results = run_full_validation(&text, Some(&series), Some(30), None, None, &config);
        assert!(by_name(&results, "bar_proportions").passed);

        let tampered = text.replacen("=", " ", 1);
        let results = run_full_validation(&tampered, Some(&series), Some(30), None, None, &config);
        let check = by_name(&results, "bar_proportions");
        assert!(!check.passed);
        assert_eq!(check.details["discrepancies"][0]["expected"], json!(30));
        assert_eq!(check.details["discrepancies"][0]["actual"], json!(29));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_parity() {
        let config = ValidationConfig::default();
        let results = run_full_validation("", None, None, Some("a  b\nc"), Some("a b c"), &config);
        assert!(by_name(&results, "parity").passed);

        let results = run_full_validation("", None, None, Some("abcdef"), Some("abcxef"), &config);
        let parity = by_name(&results, "parity");
        assert!(!parity.passed);
        assert_eq!(parity.details["first_divergence"], json!(3));

        let results = run_full_validation("", None, None, Some(""), Some("x"), &config);
        assert_eq!(by_name(&results, "parity").score, 0.0);
    }

    struct Exploding;

    impl QualityCheck for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn run(&self, _input: &CheckInput<'_>, _config: &ValidationConfig) -> Result<CheckResult, CheckError> {
            panic!("heuristic blew up")
        }
    }

    #[test]
    fn test_panicking_check_is_contained() {
        let validator = Validator::with_checks(vec![Box::new(Exploding), Box::new(RowWidthCheck)]);
        let results = validator.validate(&CheckInput::new("ab\nab"), &ValidationConfig::default());
        assert_eq!(results.len(), 2);
        assert!(!results[0].passed);
        assert!(results[0].message.contains("heuristic blew up"));
        assert!(results[1].passed);
    }

    #[test]
    fn test_invalid_config_fails_only_that_check() {
        let config = ValidationConfig {
            min_chars: 80,
            max_chars: 10,
            ..ValidationConfig::default()
        };
        let results = run_full_validation("ab", None, None, None, None, &config);
        assert!(!by_name(&results, "line_length").passed);
        assert!(by_name(&results, "row_widths").passed);
    }

    #[test]
    fn test_summary() {
        let results = vec![
            CheckResult::pass("a", "ok"),
            CheckResult::fail("b", 0.5, "meh", Value::Null),
        ];
        let summary = validation_summary(&results);
        assert_eq!(summary.total_checks, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.overall_grade, Grade::Fail);
        assert!((summary.average_score - 0.75).abs() < 1e-9);
        assert_eq!(serde_json::to_value(summary.overall_grade).unwrap(), json!("FAIL"));

        let empty = validation_summary(&[]);
        assert_eq!(empty.overall_grade, Grade::Pass);
        assert_eq!(empty.pass_rate, 0.0);
    }
}
