//! Reads the labelled Iris table.
//!
//! The classic 150-row dataset ships inside the binary. A CSV file with the
//! same layout can be used instead:
//! - UTF-8, comma-separated, optional header row (auto-detected)
//! - four numeric feature columns followed by one label column
//! - the label is a species name (`setosa`, `Iris-versicolor`, ...) or a
//!   class index `0..=2`
//! - empty cells and `NA`/`NaN`/`null` are read as missing values

use std::path::Path;

use tracing::info;

use crate::data::dataset::{RawDataset, RawRecord, CLASS_NAMES, NUM_FEATURES};
use crate::error::{PipelineError, Result};

const IRIS_CSV: &str = include_str!("../../data/iris.csv");

/// Loads the embedded Iris dataset.
pub fn load_iris() -> Result<RawDataset> {
    parse_csv(IRIS_CSV)
}

/// Loads a dataset from `path`, or the embedded one when `path` is `None`.
pub fn load_dataset(path: Option<&Path>) -> Result<RawDataset> {
    let dataset = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|e| {
                PipelineError::DataUnavailable(format!("cannot read '{}': {}", p.display(), e))
            })?;
            parse_csv(&text)?
        }
        None => load_iris()?,
    };

    info!(
        "Dataset loaded: {} rows, {} columns",
        dataset.len(),
        NUM_FEATURES + 2
    );
    info!("First few rows:\n{}", dataset.head(5));
    Ok(dataset)
}

/// Parses CSV text into raw records.
pub fn parse_csv(text: &str) -> Result<RawDataset> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();

    if let Some(first) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    let mut records = Vec::new();

    for (row_idx, line) in lines.enumerate() {
        let cells = parse_csv_row(line);
        if cells.len() != NUM_FEATURES + 1 {
            return Err(PipelineError::Parse {
                row: row_idx + 1,
                message: format!(
                    "expected {} columns (features + label), got {}",
                    NUM_FEATURES + 1,
                    cells.len()
                ),
            });
        }

        let mut features = [None; NUM_FEATURES];
        for (slot, cell) in features.iter_mut().zip(&cells[..NUM_FEATURES]) {
            *slot = parse_feature(cell, row_idx + 1)?;
        }
        let label = parse_label(&cells[NUM_FEATURES])?;

        records.push(RawRecord { features, label });
    }

    if records.is_empty() {
        return Err(PipelineError::EmptyData("CSV contains no data rows".into()));
    }

    Ok(RawDataset {
        records,
        class_names: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
    })
}

fn is_missing(cell: &str) -> bool {
    matches!(
        cell.to_ascii_lowercase().as_str(),
        "" | "na" | "nan" | "null" | "none"
    )
}

fn parse_feature(cell: &str, row_num: usize) -> Result<Option<f64>> {
    let t = cell.trim();
    if is_missing(t) {
        return Ok(None);
    }
    t.parse::<f64>().map(Some).map_err(|_| PipelineError::Parse {
        row: row_num,
        message: format!("'{}' is not a valid number", t),
    })
}

/// Species name or class index to class id.
fn parse_label(cell: &str) -> Result<Option<usize>> {
    let t = cell.trim();
    if is_missing(t) {
        return Ok(None);
    }
    if let Ok(idx) = t.parse::<usize>() {
        return if idx < CLASS_NAMES.len() {
            Ok(Some(idx))
        } else {
            Err(PipelineError::UnknownClass(t.to_string()))
        };
    }
    let lower = t.to_ascii_lowercase();
    let name = lower.strip_prefix("iris-").unwrap_or(lower.as_str());
    CLASS_NAMES
        .iter()
        .position(|&c| c == name)
        .map(Some)
        .ok_or_else(|| PipelineError::UnknownClass(t.to_string()))
}

/// A row is a header if its first cell is present but non-numeric.
fn is_header(line: &str) -> bool {
    parse_csv_row(line).first().map_or(false, |c| {
        let t = c.trim();
        !is_missing(t) && t.parse::<f64>().is_err()
    })
}

/// Splits one CSV row, honouring double-quoted fields.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_iris_has_150_labelled_rows() {
        let ds = load_iris().unwrap();
        assert_eq!(ds.len(), 150);
        assert!(ds.records.iter().all(|r| r.is_complete()));
        assert_eq!(ds.class_names, vec!["setosa", "versicolor", "virginica"]);
        for class in 0..3 {
            assert_eq!(ds.records.iter().filter(|r| r.label == Some(class)).count(), 50);
        }
    }

    #[test]
    fn missing_cells_are_kept_as_none() {
        let ds = parse_csv("a,b,c,d,species\n5.1,,1.4,NA,setosa\n6.0,3.0,4.8,1.8,\n").unwrap();
        assert_eq!(ds.records[0].features, [Some(5.1), None, Some(1.4), None]);
        assert_eq!(ds.records[0].missing_count(), 2);
        assert_eq!(ds.records[1].label, None);
    }

    #[test]
    fn accepts_uci_names_indices_and_quotes() {
        let ds = parse_csv("1,2,3,4,\"Iris-virginica\"\n1,2,3,4,1\n").unwrap();
        assert_eq!(ds.records[0].label, Some(2));
        assert_eq!(ds.records[1].label, Some(1));
    }

    #[test]
    fn byte_order_mark_does_not_hide_first_row() {
        let ds = parse_csv("\u{feff}5.1,3.5,1.4,0.2,setosa\n4.9,3.0,1.4,0.2,setosa\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].features[0], Some(5.1));
    }

    #[test]
    fn header_after_blank_lines_is_detected() {
        let ds = parse_csv("\n  \nsepal_length,sepal_width,petal_length,petal_width,species\n5.1,3.5,1.4,0.2,setosa\n").unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].label, Some(0));
    }

    #[test]
    fn rejects_unknown_species() {
        match parse_csv("1,2,3,4,daisy\n") {
            Err(PipelineError::UnknownClass(name)) => assert_eq!(name, "daisy"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_wrong_column_count() {
        assert!(matches!(
            parse_csv("1,2,3,setosa\n"),
            Err(PipelineError::Parse { row: 1, .. })
        ));
    }

    #[test]
    fn unreadable_path_is_data_unavailable() {
        let err = load_dataset(Some(Path::new("/nonexistent/iris.csv"))).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable(_)));
    }
}
