//! Table Grid - Decimal-Aligned ASCII Tables
//!
//! Row 0 is the header. A column is numeric when it has at least one data
//! cell and every non-empty data cell is numeric-like. Numeric cells are
//! split with [`split_decimal_for_align`] and aligned on the decimal point;
//! text columns are left-justified. Frames are always ASCII `+---+`.

use serde::{Deserialize, Serialize};

use crate::layout::char_width;
use crate::numbers::{is_numeric_like, parse_decorated, split_decimal_for_align, NumberFormat, CURRENCY_SYMBOLS};

pub const EMPTY_TABLE: &str = "( empty table )";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrid {
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map_or("", String::as_str)
    }

    fn data_cells(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        (1..self.rows.len())
            .map(move |r| self.cell(r, col))
            .filter(|c| !c.trim().is_empty())
    }

    pub fn is_numeric_column(&self, col: usize) -> bool {
        let mut cells = self.data_cells(col).peekable();
        cells.peek().is_some() && cells.all(is_numeric_like)
    }
}

/// Currency-decorated or large cells are re-rendered; the rest keep the
/// author's precision.
fn normalize_cell(text: &str, format: &NumberFormat) -> String {
    let has_symbol = CURRENCY_SYMBOLS.iter().any(|(_, sym)| text.contains(sym));
    let large = parse_decorated(text).is_some_and(|v| v.abs() >= 1000.0);
    if has_symbol || large {
        format.normalize(text)
    } else {
        text.trim().to_string()
    }
}

enum Column {
    Text { width: usize },
    Numeric { left: usize, right: usize },
}

impl Column {
    fn inner_width(&self) -> usize {
        match *self {
            Column::Text { width } => width,
            Column::Numeric { left, right } => left + 1 + right,
        }
    }
}

pub fn render_table(grid: &TableGrid, format: &NumberFormat) -> Vec<String> {
    if grid.is_empty() {
        return vec![EMPTY_TABLE.to_string()];
    }
    let ncols = grid.column_count();

    // trimmed data cells, padded to the column count
    let mut body: Vec<Vec<String>> = grid.rows[1..]
        .iter()
        .map(|row| (0..ncols).map(|c| row.get(c).map_or(String::new(), |t| t.trim().to_string())).collect())
        .collect();
    let header: Vec<&str> = (0..ncols).map(|c| grid.cell(0, c).trim()).collect();

    let mut columns = Vec::with_capacity(ncols);
    for col in 0..ncols {
        let head_width = char_width(header[col]);
        if grid.is_numeric_column(col) {
            let (mut left, mut right) = (head_width, 0);
            for row in body.iter_mut() {
                if row[col].is_empty() {
                    continue;
                }
                row[col] = normalize_cell(&row[col], format);
                let (prefix, integer, fraction) = split_decimal_for_align(&row[col]);
                left = left.max(char_width(&prefix) + char_width(&integer));
                right = right.max(char_width(&fraction));
            }
            columns.push(Column::Numeric { left, right });
        } else {
            let width = body
                .iter()
                .map(|row| char_width(&row[col]))
                .fold(head_width, usize::max);
            columns.push(Column::Text { width });
        }
    }

    let border = {
        let segs: Vec<String> = columns.iter().map(|c| "-".repeat(c.inner_width() + 2)).collect();
        format!("+{}+", segs.join("+"))
    };
    let framed = |cells: Vec<String>| format!("|{}|", cells.join("|"));

    let mut lines = vec![border.clone()];
    lines.push(framed(
        columns
            .iter()
            .zip(&header)
            .map(|(c, h)| {
                let w = c.inner_width();
                format!(" {h:<w$} ")
            })
            .collect(),
    ));
    lines.push(border.clone());
    for row in &body {
        lines.push(framed(
            columns
                .iter()
                .zip(row)
                .map(|(c, text)| format_cell(c, text))
                .collect(),
        ));
    }
    lines.push(border);
    lines
}

fn format_cell(column: &Column, text: &str) -> String {
    match *column {
        Column::Text { width } => format!(" {text:<width$} "),
        Column::Numeric { left, right } if text.is_empty() => {
            let w = left + 1 + right;
            format!(" {:w$} ", "")
        }
        Column::Numeric { left, right } => {
            let (prefix, integer, fraction) = split_decimal_for_align(text);
            let lead = format!("{prefix}{integer}");
            if fraction.starts_with(|c: char| c.is_ascii_digit()) {
                format!(" {lead:>left$}.{fraction:<right$} ")
            } else {
                // suffix stays attached where the point would be
                let w = right + 1;
                format!(" {lead:>left$}{fraction:<w$} ")
            }
        }
    }
}
