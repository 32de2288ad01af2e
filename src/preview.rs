//! Selected-columns preview.
//!
//! Merges a set of resolved column references into a single index-aligned
//! table for side-by-side display. References are grouped by their
//! (file, sheet) origin; the row count comes from the first group, so
//! columns from shorter sources pad with the data-not-available sentinel
//! rather than truncating the view.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{ColumnReference, Row, TabularDataset};

/// Sentinel cell for a row index past the end of a source, or a source
/// that is not loaded at all.
pub fn data_not_available() -> Value {
    Value::String("[Data not available]".to_string())
}

/// An index-aligned merge of selected columns.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergedPreview {
    /// Column labels, the full display path of each reference.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Distinct source file names, joined with ", ".
    pub source_label: String,
    pub row_count: usize,
}

/// Merge the referenced columns into one preview table.
///
/// `datasets_by_file` maps dataset name to the loaded dataset. Reference
/// order is preserved in the output columns. The shared row count is the
/// first (file, sheet) group's row count, capped at `sample_limit`.
pub fn merge_selected_columns(
    references: &[ColumnReference],
    datasets_by_file: &HashMap<String, TabularDataset>,
    sample_limit: usize,
) -> MergedPreview {
    let columns: Vec<String> = references.iter().map(|r| r.full_path.clone()).collect();

    let mut source_label = String::new();
    let mut seen_files: Vec<&str> = Vec::new();
    for reference in references {
        if !seen_files.contains(&reference.file_name.as_str()) {
            seen_files.push(&reference.file_name);
            if !source_label.is_empty() {
                source_label.push_str(", ");
            }
            source_label.push_str(&reference.file_name);
        }
    }

    let row_count = references
        .first()
        .map(|first| {
            source_rows(first, datasets_by_file)
                .map(|rows| rows.len().min(sample_limit))
                .unwrap_or(0)
        })
        .unwrap_or(0);

    let mut rows = Vec::with_capacity(row_count);
    for index in 0..row_count {
        let mut out = Row::new();
        for reference in references {
            let cell = source_rows(reference, datasets_by_file)
                .and_then(|rows| rows.get(index))
                .and_then(|row| row.get(&reference.column_name))
                .cloned()
                .unwrap_or_else(data_not_available);
            out.insert(reference.full_path.clone(), cell);
        }
        rows.push(out);
    }

    MergedPreview {
        columns,
        rows,
        source_label,
        row_count,
    }
}

/// The rows a reference reads from: a named sheet when present, the
/// primary table otherwise. `None` when the file is not loaded.
fn source_rows<'a>(
    reference: &ColumnReference,
    datasets_by_file: &'a HashMap<String, TabularDataset>,
) -> Option<&'a [Row]> {
    let dataset = datasets_by_file.get(&reference.file_name)?;
    match &reference.sheet_name {
        Some(sheet) => dataset.sheet(sheet).map(|s| s.rows.as_slice()),
        None => Some(dataset.rows.as_slice()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sheet;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn working_set() -> HashMap<String, TabularDataset> {
        let people = TabularDataset::new(
            "people.csv",
            vec!["Name".into(), "Age".into()],
            vec![
                row(&[("Name", json!("ann")), ("Age", json!(34))]),
                row(&[("Name", json!("bob")), ("Age", json!(27))]),
                row(&[("Name", json!("cyd")), ("Age", json!(61))]),
            ],
        );
        let cities = TabularDataset::new(
            "cities.csv",
            vec!["City".into()],
            vec![row(&[("City", json!("Oslo"))])],
        );
        [
            (people.name.clone(), people),
            (cities.name.clone(), cities),
        ]
        .into()
    }

    #[test]
    fn test_merge_preserves_reference_order() {
        let references = vec![
            ColumnReference::new("people.csv", None, "Age"),
            ColumnReference::new("people.csv", None, "Name"),
        ];
        let preview = merge_selected_columns(&references, &working_set(), 10);

        assert_eq!(
            preview.columns,
            vec!["people.csv ▸ Age", "people.csv ▸ Name"]
        );
        assert_eq!(preview.row_count, 3);
        assert_eq!(preview.rows[0]["people.csv ▸ Name"], json!("ann"));
        assert_eq!(preview.rows[0]["people.csv ▸ Age"], json!(34));
        assert_eq!(preview.source_label, "people.csv");
    }

    #[test]
    fn test_row_count_follows_first_reference() {
        // First reference has 3 rows, second only 1; shorter sources pad.
        let references = vec![
            ColumnReference::new("people.csv", None, "Name"),
            ColumnReference::new("cities.csv", None, "City"),
        ];
        let preview = merge_selected_columns(&references, &working_set(), 10);

        assert_eq!(preview.row_count, 3);
        assert_eq!(preview.rows[0]["cities.csv ▸ City"], json!("Oslo"));
        assert_eq!(
            preview.rows[1]["cities.csv ▸ City"],
            json!("[Data not available]")
        );
        assert_eq!(preview.source_label, "people.csv, cities.csv");
    }

    #[test]
    fn test_first_reference_short_truncates_view() {
        let references = vec![
            ColumnReference::new("cities.csv", None, "City"),
            ColumnReference::new("people.csv", None, "Name"),
        ];
        let preview = merge_selected_columns(&references, &working_set(), 10);
        assert_eq!(preview.row_count, 1);
        assert_eq!(preview.rows[0]["people.csv ▸ Name"], json!("ann"));
    }

    #[test]
    fn test_sample_limit_caps_rows() {
        let references = vec![ColumnReference::new("people.csv", None, "Name")];
        let preview = merge_selected_columns(&references, &working_set(), 2);
        assert_eq!(preview.row_count, 2);
        assert_eq!(preview.rows.len(), 2);
    }

    #[test]
    fn test_missing_dataset_yields_empty_preview() {
        let references = vec![ColumnReference::new("gone.csv", None, "X")];
        let preview = merge_selected_columns(&references, &working_set(), 10);
        assert_eq!(preview.row_count, 0);
        assert!(preview.rows.is_empty());
        assert_eq!(preview.columns, vec!["gone.csv ▸ X"]);
    }

    #[test]
    fn test_sheet_reference_reads_sheet_rows() {
        let mut working_set = working_set();
        let book = TabularDataset::new("book.xlsx", vec!["A".into()], Vec::new()).with_sheet(
            "Q1",
            Sheet {
                columns: vec!["Total".into()],
                rows: vec![row(&[("Total", json!(99))])],
            },
        );
        working_set.insert(book.name.clone(), book);

        let references = vec![ColumnReference::new(
            "book.xlsx",
            Some("Q1".into()),
            "Total",
        )];
        let preview = merge_selected_columns(&references, &working_set, 10);
        assert_eq!(preview.row_count, 1);
        assert_eq!(preview.rows[0]["book.xlsx ▸ Q1 ▸ Total"], json!(99));
    }

    #[test]
    fn test_missing_column_in_present_row_is_sentinel() {
        let references = vec![
            ColumnReference::new("people.csv", None, "Name"),
            ColumnReference::new("people.csv", None, "Nope"),
        ];
        let preview = merge_selected_columns(&references, &working_set(), 10);
        assert_eq!(
            preview.rows[0]["people.csv ▸ Nope"],
            json!("[Data not available]")
        );
    }
}
