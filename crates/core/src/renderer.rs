use std::fmt::Write as _;

use crate::{ResultTable, Value};

pub const EMPTY_TEXT_TABLE: &str = "(empty result set)";
pub const EMPTY_MARKDOWN_TABLE: &str = "_(empty)_";
const TEXT_NULL: &str = "NULL";
const TEXT_COLUMN_GAP: &str = "  ";

/// Plain aligned text, at most `max_rows` rows followed by a truncation note.
#[must_use]
pub fn render_text(table: &ResultTable, max_rows: usize) -> String {
    if table.is_empty() {
        return format!("{EMPTY_TEXT_TABLE}\n");
    }

    let shown = table.head(max_rows);
    let cells = stringify_rows(&shown, TEXT_NULL);
    let widths = column_widths(shown.columns(), &cells);

    let mut rendered = String::new();
    push_text_row(&mut rendered, shown.columns(), &widths);
    for row in &cells {
        push_text_row(&mut rendered, row, &widths);
    }

    if table.len() > shown.len() {
        writeln!(
            rendered,
            "... ({} rows total; showing {})",
            table.len(),
            shown.len()
        )
        .expect("writing to String should not fail");
    }

    rendered
}

/// GitHub-flavoured markdown table with padded cells. NULLs become empty cells.
#[must_use]
pub fn render_markdown(table: &ResultTable, max_rows: Option<usize>) -> String {
    let shown = max_rows.map_or_else(|| table.clone(), |limit| table.head(limit));
    if shown.is_empty() {
        return EMPTY_MARKDOWN_TABLE.to_string();
    }

    let header = shown
        .columns()
        .iter()
        .map(|column| escape_markdown_cell(column))
        .collect::<Vec<_>>();
    let cells = stringify_rows(&shown, "")
        .into_iter()
        .map(|row| row.iter().map(|cell| escape_markdown_cell(cell)).collect())
        .collect::<Vec<Vec<String>>>();
    let widths = column_widths(&header, &cells);

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(markdown_row(&header, &widths));
    let separator = widths
        .iter()
        .map(|width| "-".repeat((*width).max(3)))
        .collect::<Vec<_>>();
    lines.push(markdown_row(&separator, &widths));
    lines.extend(cells.iter().map(|row| markdown_row(row, &widths)));

    lines.join("\n")
}

/// Header line plus one line per row, RFC 4180 quoting, NULLs as empty fields.
#[must_use]
pub fn render_csv(table: &ResultTable) -> String {
    let mut rendered = String::new();
    push_csv_line(&mut rendered, table.columns().iter().map(String::as_str));
    for row in table.rows() {
        let cells = row.iter().map(|value| value.to_cell().unwrap_or_default());
        let cells = cells.collect::<Vec<_>>();
        push_csv_line(&mut rendered, cells.iter().map(String::as_str));
    }
    rendered
}

fn stringify_rows(table: &ResultTable, null_text: &str) -> Vec<Vec<String>> {
    table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| match value {
                    Value::Null => null_text.to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

fn column_widths<S: AsRef<str>>(header: &[S], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths = header
        .iter()
        .map(|column| display_width(column.as_ref()))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    widths
}

fn push_text_row<S: AsRef<str>>(rendered: &mut String, cells: &[S], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_start(cell.as_ref(), *width))
        .collect::<Vec<_>>()
        .join(TEXT_COLUMN_GAP);
    rendered.push_str(&line);
    rendered.push('\n');
}

fn markdown_row(cells: &[String], widths: &[usize]) -> String {
    let inner = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_end(cell, (*width).max(3)))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("| {inner} |")
}

fn escape_markdown_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn push_csv_line<'a>(rendered: &mut String, fields: impl Iterator<Item = &'a str>) {
    let line = fields.map(csv_field).collect::<Vec<_>>().join(",");
    rendered.push_str(&line);
    rendered.push('\n');
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn pad_start(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));
    format!("{}{text}", " ".repeat(padding))
}

fn pad_end(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(padding))
}
