//! Plain-text rendering of frames for the terminal.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{data::Value, frame::Frame};

const COLUMN_GAP: &str = "  ";
const MIN_RULE_WIDTH: usize = 3;

/// Renders the first `limit` rows of `frame`. Numeric columns are
/// right-aligned; floats are shown with two decimals.
pub fn render_frame(frame: &Frame, limit: usize) -> String {
    let headers = frame.headers();
    let numeric = frame
        .columns()
        .iter()
        .map(|column| {
            column
                .values
                .iter()
                .flatten()
                .all(|value| !matches!(value, Value::String(_)))
        })
        .collect::<Vec<_>>();
    let rows = (0..frame.height().min(limit))
        .map(|row| {
            frame
                .columns()
                .iter()
                .map(|column| column.get(row).map(format_cell).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_rows(&headers, &rows, &numeric)
}

/// Renders arbitrary string rows; `right_align[i]` controls column `i`.
pub fn render_rows(headers: &[String], rows: &[Vec<String>], right_align: &[bool]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, &[]));
    let rule = widths
        .iter()
        .map(|w| "-".repeat((*w).max(MIN_RULE_WIDTH)))
        .collect::<Vec<_>>();
    let rule_widths = widths
        .iter()
        .map(|w| (*w).max(MIN_RULE_WIDTH))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &rule_widths, &[]));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, right_align));
    }
    output
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Float(f) if f.is_finite() && f.fract() != 0.0 => format!("{f:.2}"),
        other => other.as_display(),
    }
}

fn format_row(values: &[String], widths: &[usize], right_align: &[bool]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let cell = sanitize_cell(value);
            let padding = " ".repeat(width.saturating_sub(display_width(&cell)));
            if right_align.get(idx).copied().unwrap_or(false) {
                format!("{padding}{cell}")
            } else {
                format!("{cell}{padding}")
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
