//! Column typing and header normalization.
//!
//! Input tables arrive with loosely specified headers ("Vehicle Types",
//! " Order ID", "order_id") and untyped cells. This module owns:
//!
//! - [`ColumnType`] inference over a column's raw cells
//! - placeholder detection (`NA`, `N/A`, `null`, ...) so those cells load as null
//! - [`normalize_column_name`], the single header-normalization rule applied to
//!   every table before any column lookup happens

use log::debug;

use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
}

/// Returns true when a trimmed cell should load as null.
pub fn is_null_token(trimmed: &str) -> bool {
    if trimmed.is_empty() {
        return true;
    }
    let lowered = trimmed.to_ascii_lowercase();
    let stripped = lowered.trim_start_matches('#');
    matches!(stripped, "na" | "n/a" | "nan" | "null" | "none")
}

/// Picks the narrowest type every non-null cell parses as.
pub fn infer_column_type<'a, I>(cells: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut integer = true;
    let mut float = true;
    let mut seen = false;
    for cell in cells {
        let trimmed = cell.trim();
        if is_null_token(trimmed) {
            continue;
        }
        seen = true;
        if integer && trimmed.parse::<i64>().is_err() {
            integer = false;
        }
        if float && trimmed.parse::<f64>().is_err() {
            float = false;
        }
        if !integer && !float {
            return ColumnType::String;
        }
    }
    match (seen, integer, float) {
        (false, _, _) => ColumnType::String,
        (true, true, _) => ColumnType::Integer,
        (true, false, true) => ColumnType::Float,
        _ => ColumnType::String,
    }
}

/// Trims, lowercases, turns spaces into underscores and folds "types" into
/// "type". Idempotent.
pub fn normalize_column_name(name: &str) -> String {
    let mut normalized = name.trim().to_lowercase().replace(' ', "_");
    // "typess" folds to "types" on a single pass; repeat to a fixed point.
    while normalized.contains("types") {
        normalized = normalized.replace("types", "type");
    }
    normalized
}

/// Applies [`normalize_column_name`] to every header of a table that has
/// columns.
pub fn normalize_headers(frame: &mut Frame) {
    if frame.width() == 0 {
        return;
    }
    frame.rename_columns(normalize_column_name);
    debug!("Normalized headers: {:?}", frame.headers());
}
