//! HTML Transformer - Structural Tags to Fixed-Width Text
//!
//! A small state machine over `h1 h2 h3 p ul ol li table thead tr th td pre
//! code`. Every other tag is a no-op and its text falls into the enclosing
//! buffer; `script` and `style` bodies are dropped.
//!
//! The last step fits every line to exactly `width` chars: longer lines are
//! cut, shorter non-blank lines are space-padded.

use std::borrow::Cow;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};
use textwrap::{Options, WordSeparator, WrapAlgorithm};

use crate::layout::char_width;
use crate::numbers::{default_currency, NegativeStyle, NumberFormat, ThousandsStyle};
use crate::table::{render_table, TableGrid};

pub const MIN_WIDTH: usize = 40;
pub const MAX_WIDTH: usize = 80;

const BULLET: &str = "- ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlOptions {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default)]
    pub ascii_only: bool,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub thousands: ThousandsStyle,
    #[serde(default)]
    pub negatives: NegativeStyle,
}

fn default_width() -> usize {
    60
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            ascii_only: false,
            currency: default_currency(),
            thousands: ThousandsStyle::default(),
            negatives: NegativeStyle::default(),
        }
    }
}

impl HtmlOptions {
    /// Requested width clamped to `[MIN_WIDTH, MAX_WIDTH]`.
    pub fn effective_width(&self) -> usize {
        self.width.clamp(MIN_WIDTH, MAX_WIDTH)
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat {
            currency: self.currency.clone(),
            ascii_only: self.ascii_only,
            thousands: self.thousands,
            negatives: self.negatives,
        }
    }
}

pub fn html_to_text(
    html: &str,
    width: usize,
    ascii_only: bool,
    currency: &str,
    thousands: ThousandsStyle,
    negatives: NegativeStyle,
) -> String {
    html_to_text_with(
        html,
        &HtmlOptions {
            width,
            ascii_only,
            currency: currency.to_string(),
            thousands,
            negatives,
        },
    )
}

pub fn html_to_text_with(html: &str, options: &HtmlOptions) -> String {
    let source = escape_stray_markup(html);
    let mut reader = Reader::from_str(&source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut tx = Transformer::new(options.effective_width(), options.number_format());
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => tx.start(&tag_name(e.name().as_ref())),
            Ok(Event::Empty(e)) => tx.empty(&tag_name(e.name().as_ref())),
            Ok(Event::End(e)) => tx.end(&tag_name(e.name().as_ref())),
            Ok(Event::Text(e)) => match e.decode() {
                Ok(text) => tx.text(&text),
                Err(err) => log::warn!("skipping undecodable text node: {err}"),
            },
            Ok(Event::CData(e)) => match reader.decoder().decode(&e) {
                Ok(text) => tx.text(&text),
                Err(err) => log::warn!("skipping undecodable cdata: {err}"),
            },
            Ok(Event::GeneralRef(e)) => match e.decode() {
                Ok(name) => tx.text(&resolve_entity(&name)),
                Err(err) => log::warn!("skipping undecodable entity: {err}"),
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                log::warn!(
                    "html tokenizer stopped at byte {}: {err}",
                    reader.error_position()
                );
                break;
            }
        }
    }
    tx.finish().join("\n")
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// `&nbsp;` is a plain space; XML and numeric references are resolved;
/// anything else stays literal.
fn resolve_entity(name: &str) -> String {
    if name == "nbsp" {
        return " ".to_string();
    }
    let reference = format!("&{name};");
    match quick_xml::escape::unescape(&reference) {
        Ok(resolved) => resolved.into_owned(),
        Err(_) => reference,
    }
}

/// Escape every `&` that does not start an `&name;` reference and every `<`
/// that does not open a tag, comment or declaration, so stray characters in
/// prose do not stop the tokenizer.
fn escape_stray_markup(html: &str) -> Cow<'_, str> {
    let is_reference = |rest: &str| {
        let body_len = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '#')
            .count();
        body_len > 0 && rest[body_len..].starts_with(';')
    };
    let opens_markup = |rest: &str| {
        rest.starts_with(|c: char| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
    };
    let escape = |i: usize, ch: char| match ch {
        '&' if !is_reference(&html[i + 1..]) => Some("&amp;"),
        '<' if !opens_markup(&html[i + 1..]) => Some("&lt;"),
        _ => None,
    };
    if !html.char_indices().any(|(i, ch)| escape(i, ch).is_some()) {
        return Cow::Borrowed(html);
    }
    let mut out = String::with_capacity(html.len() + 16);
    for (i, ch) in html.char_indices() {
        match escape(i, ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First-fit word wrap with optional hanging indent. Words are never split;
/// a word wider than the line gets a line of its own.
fn wrap(text: &str, width: usize, first: &str, rest: &str) -> Vec<String> {
    let options = Options::new(width.max(1))
        .initial_indent(first)
        .subsequent_indent(rest)
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::wrap(text, options)
        .into_iter()
        .map(Cow::into_owned)
        .collect()
}

enum ListKind {
    Bullet,
    Numbered(usize),
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

impl TableState {
    fn close_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            self.row
                .get_or_insert_with(Vec::new)
                .push(collapse_whitespace(&cell));
        }
    }

    fn close_row(&mut self) {
        self.close_cell();
        if let Some(row) = self.row.take().filter(|r| !r.is_empty()) {
            self.rows.push(row);
        }
    }
}

struct Transformer {
    width: usize,
    format: NumberFormat,
    out: Vec<String>,
    buf: String,
    lists: Vec<ListKind>,
    in_item: bool,
    table: Option<TableState>,
    /// Open p / heading elements.
    inline_depth: usize,
    pre_depth: usize,
    code_block: bool,
    skip_depth: usize,
}

impl Transformer {
    fn new(width: usize, format: NumberFormat) -> Self {
        Self {
            width,
            format,
            out: Vec::new(),
            buf: String::new(),
            lists: Vec::new(),
            in_item: false,
            table: None,
            inline_depth: 0,
            pre_depth: 0,
            code_block: false,
            skip_depth: 0,
        }
    }

    fn start(&mut self, tag: &str) {
        if tag == "script" || tag == "style" {
            self.skip_depth += 1;
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match tag {
            "h1" | "h2" | "h3" | "p" => {
                if !self.in_item {
                    self.flush_paragraph();
                }
                self.inline_depth += 1;
            }
            "ul" | "ol" => {
                self.flush_item();
                self.flush_paragraph();
                self.lists.push(if tag == "ol" {
                    ListKind::Numbered(0)
                } else {
                    ListKind::Bullet
                });
            }
            "li" => {
                self.flush_item();
                self.flush_paragraph();
                self.in_item = true;
                if let Some(ListKind::Numbered(n)) = self.lists.last_mut() {
                    *n += 1;
                }
            }
            "table" => {
                self.flush_item();
                self.flush_paragraph();
                self.table = Some(TableState::default());
            }
            "tr" => {
                if let Some(table) = self.table.as_mut() {
                    table.close_row();
                    table.row = Some(Vec::new());
                }
            }
            "th" | "td" => {
                if let Some(table) = self.table.as_mut() {
                    table.close_cell();
                    table.cell = Some(String::new());
                }
            }
            "pre" => {
                if self.pre_depth == 0 {
                    self.flush_paragraph();
                }
                self.pre_depth += 1;
            }
            "code" if self.is_block_position() => {
                self.flush_paragraph();
                self.code_block = true;
            }
            // unclosed HTML void element
            "br" => self.empty(tag),
            _ => {}
        }
    }

    fn end(&mut self, tag: &str) {
        if tag == "script" || tag == "style" {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match tag {
            "h1" | "h2" | "h3" => {
                self.inline_depth = self.inline_depth.saturating_sub(1);
                if !self.in_item {
                    self.emit_heading();
                }
            }
            "p" => {
                self.inline_depth = self.inline_depth.saturating_sub(1);
                if !self.in_item {
                    self.flush_paragraph();
                }
            }
            "li" => self.flush_item(),
            "ul" | "ol" => {
                self.flush_item();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.out.push(String::new());
                }
            }
            "th" | "td" => {
                if let Some(table) = self.table.as_mut() {
                    table.close_cell();
                }
            }
            "tr" => {
                if let Some(table) = self.table.as_mut() {
                    table.close_row();
                }
            }
            "table" => self.flush_table(),
            "pre" => {
                self.pre_depth = self.pre_depth.saturating_sub(1);
                if self.pre_depth == 0 {
                    self.emit_verbatim();
                }
            }
            "code" if self.code_block => {
                self.code_block = false;
                self.emit_verbatim();
            }
            _ => {}
        }
    }

    fn empty(&mut self, tag: &str) {
        match tag {
            "th" | "td" => {
                self.start(tag);
                self.end(tag);
            }
            "br" if self.pre_depth > 0 || self.code_block => self.text("\n"),
            "br" => self.text(" "),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth > 0 {
            return;
        }
        if let Some(table) = self.table.as_mut() {
            if let Some(cell) = table.cell.as_mut() {
                cell.push_str(text);
            }
            return;
        }
        self.buf.push_str(text);
    }

    /// A `code` element here starts a verbatim block rather than inline code.
    fn is_block_position(&self) -> bool {
        self.pre_depth == 0
            && !self.code_block
            && self.inline_depth == 0
            && !self.in_item
            && self.table.is_none()
    }

    fn flush_paragraph(&mut self) {
        let text = collapse_whitespace(&std::mem::take(&mut self.buf));
        if text.is_empty() {
            return;
        }
        self.out.extend(wrap(&text, self.width, "", ""));
        self.out.push(String::new());
    }

    fn emit_heading(&mut self) {
        let title = collapse_whitespace(&std::mem::take(&mut self.buf));
        if title.is_empty() {
            return;
        }
        let rule = "-".repeat(self.width.min(char_width(&title)));
        self.out.extend(wrap(&title, self.width, "", ""));
        self.out.push(rule);
        self.out.push(String::new());
    }

    fn flush_item(&mut self) {
        if !self.in_item {
            return;
        }
        self.in_item = false;
        let content = collapse_whitespace(&std::mem::take(&mut self.buf));
        if content.is_empty() {
            return;
        }
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        let lead = match self.lists.last() {
            Some(ListKind::Numbered(n)) => format!("{indent}{n}. "),
            _ => format!("{indent}{BULLET}"),
        };
        let hanging = " ".repeat(char_width(&lead));
        self.out.extend(wrap(&content, self.width, &lead, &hanging));
    }

    fn flush_table(&mut self) {
        if let Some(mut table) = self.table.take() {
            table.close_row();
            self.out
                .extend(render_table(&TableGrid::new(table.rows), &self.format));
            self.out.push(String::new());
        }
    }

    fn emit_verbatim(&mut self) {
        let raw = std::mem::take(&mut self.buf);
        let body = raw.strip_prefix('\n').unwrap_or(&raw).trim_end();
        if body.trim().is_empty() {
            return;
        }
        self.out.extend(body.lines().map(str::to_string));
        self.out.push(String::new());
    }

    fn finish(mut self) -> Vec<String> {
        if self.pre_depth > 0 || self.code_block {
            self.emit_verbatim();
        }
        self.flush_item();
        self.flush_paragraph();
        self.flush_table();

        let width = self.width;
        let mut lines: Vec<String> = Vec::with_capacity(self.out.len());
        for line in self.out {
            if line.trim().is_empty() {
                if lines.last().map_or(true, |l| l.is_empty()) {
                    continue;
                }
                lines.push(String::new());
            } else {
                lines.push(format!("{line:<width$.width$}"));
            }
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }
}
