//! Column reference resolution.
//!
//! Turns a UI-facing display path (`file ▸ column` or
//! `file ▸ sheet ▸ column`) into a structured [`ColumnReference`].
//!
//! Resolution never fails: any segment count other than 2 or 3 falls back
//! to treating the whole path as a bare column name on the first known
//! dataset. The fallback keeps the resolver total under arbitrary UI
//! input, at the cost of possibly referencing a column that does not
//! exist; the executor's sentinel handling covers that case.

use crate::models::{ColumnReference, TabularDataset, DISPLAY_SEPARATOR};

/// Resolve a display path against the loaded datasets.
pub fn resolve(path: &str, datasets: &[TabularDataset]) -> ColumnReference {
    let segments: Vec<&str> = path.split(DISPLAY_SEPARATOR).map(str::trim).collect();
    match segments.as_slice() {
        [file, column] => ColumnReference::new(*file, None, *column),
        [file, sheet, column] => ColumnReference::new(*file, Some((*sheet).to_string()), *column),
        _ => {
            let file = datasets
                .first()
                .map(|dataset| dataset.name.clone())
                .unwrap_or_default();
            ColumnReference::new(file, None, path.trim())
        }
    }
}
