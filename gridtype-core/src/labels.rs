//! Label Normalizer - ASCII Aliases and Legend Triggers
//!
//! Wide or ambiguous-width glyphs never reach a bar row. Detection uses the
//! code-point range tables below, checked once per label.

/// CJK Unified Ideographs, Hiragana + Katakana, Hangul Syllables.
pub const CJK_RANGES: [(u32, u32); 3] = [(0x4E00, 0x9FFF), (0x3040, 0x30FF), (0xAC00, 0xD7AF)];

/// Pictographic planes and the Miscellaneous Symbols / Dingbats blocks.
pub const EMOJI_RANGES: [(u32, u32); 2] = [(0x1F000, 0x1FAFF), (0x2600, 0x27BF)];

pub static CJK_ALIASES: [(&str, &str); 7] = [
    ("温度", "ONDO"),
    ("経路", "ROUTE"),
    ("顧客", "CUSTOMER"),
    ("速度", "SPEED"),
    ("時間", "TIME"),
    ("数量", "QTY"),
    ("最大", "MAX"),
];

/// Longer sequences first so a presentation selector is consumed with its base.
pub static EMOJI_ALIASES: [(&str, &str); 9] = [
    ("❤\u{FE0F}", "HEART"),
    ("❤", "HEART"),
    ("🔥", "FIRE"),
    ("💧", "WATER"),
    ("🌳", "TREE"),
    ("⚡", "ELEC"),
    ("🚀", "ROCKET"),
    ("📦", "BOX"),
    ("🐍", "PYTHON"),
];

static METRIC_UNITS: [(&str, &str); 4] = [("ms", "milliseconds"), ("s", "seconds"), ("m", "minutes"), ("h", "hours")];
static DATA_UNITS: [(&str, &str); 5] = [
    ("B", "bytes"),
    ("KB", "kilobytes"),
    ("MB", "megabytes"),
    ("GB", "gigabytes"),
    ("TB", "terabytes"),
];
static CURRENCY_UNITS: [(&str, &str); 4] = [("USD", "$"), ("EUR", "€"), ("JPY", "¥"), ("GBP", "£")];

fn in_ranges(c: char, ranges: &[(u32, u32)]) -> bool {
    let cp = u32::from(c);
    ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

pub fn is_cjk(c: char) -> bool {
    in_ranges(c, &CJK_RANGES)
}

pub fn is_emoji(c: char) -> bool {
    in_ranges(c, &EMOJI_RANGES)
}

pub fn contains_cjk_or_emoji(label: &str) -> bool {
    label.chars().any(|c| is_cjk(c) || is_emoji(c))
}

/// ASCII alias for a label: whole-label CJK aliases first, then emoji tokens.
///
/// Characters without an alias are kept.
pub fn alias_label(label: &str) -> String {
    if let Some((_, alias)) = CJK_ALIASES.iter().find(|(k, _)| *k == label) {
        return (*alias).to_string();
    }
    let mut out = label.to_string();
    for (emoji, alias) in &EMOJI_ALIASES {
        if out.contains(emoji) {
            out = out.replace(emoji, alias);
        }
    }
    out.retain(|c| c != '\u{FE0F}' && c != '\u{200D}');
    out
}

/// Display symbol for a unit: currency symbols, spelled-out time and data
/// units, `%` as-is. Unknown units pass through.
pub fn unit_symbol(unit: &str) -> &str {
    if unit == "%" {
        return unit;
    }
    [&CURRENCY_UNITS[..], &METRIC_UNITS[..], &DATA_UNITS[..]]
        .iter()
        .find_map(|table| table.iter().find(|(k, _)| *k == unit).map(|(_, v)| *v))
        .unwrap_or(unit)
}

/// Labels as they appear in bar rows, plus the legend entries (if any).
///
/// When any label needs a legend every row label becomes its 1-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabels {
    pub row_labels: Vec<String>,
    pub legend: Option<Vec<String>>,
}

pub fn resolve_labels<S: AsRef<str>>(labels: &[S]) -> ResolvedLabels {
    let needs_legend = labels.iter().any(|l| contains_cjk_or_emoji(l.as_ref()));
    if needs_legend {
        log::debug!("legend indexing active for {} labels", labels.len());
        ResolvedLabels {
            row_labels: (1..=labels.len()).map(|i| i.to_string()).collect(),
            legend: Some(
                labels
                    .iter()
                    .enumerate()
                    .map(|(i, l)| format!("{}. {}", i + 1, alias_label(l.as_ref())))
                    .collect(),
            ),
        }
    } else {
        ResolvedLabels {
            row_labels: labels.iter().map(|l| alias_label(l.as_ref())).collect(),
            legend: None,
        }
    }
}
