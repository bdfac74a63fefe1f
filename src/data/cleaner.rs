use std::collections::HashSet;

use tracing::info;

use crate::data::dataset::{RawDataset, Samples, NUM_FEATURES};
use crate::math::matrix::Matrix;

/// How many rows each cleaning step removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleaningStats {
    pub input_rows: usize,
    /// Total number of missing cells seen in the input.
    pub missing_values: usize,
    pub rows_with_missing: usize,
    pub duplicate_rows: usize,
    pub output_rows: usize,
}

/// Drops incomplete rows, then exact duplicates (first occurrence kept),
/// and separates what remains into (X, y).
pub fn clean(raw: &RawDataset) -> (Samples, CleaningStats) {
    let mut stats = CleaningStats {
        input_rows: raw.len(),
        ..CleaningStats::default()
    };

    stats.missing_values = raw.records.iter().map(|r| r.missing_count()).sum();
    info!("Null values found: {}", stats.missing_values);

    let complete: Vec<_> = raw.records.iter().filter(|r| r.is_complete()).collect();
    stats.rows_with_missing = raw.len() - complete.len();
    if stats.rows_with_missing > 0 {
        info!("Null values removed ({} rows dropped)", stats.rows_with_missing);
    }

    // Rows compare equal only when every feature is bit-identical and the
    // labels match.
    let mut seen: HashSet<([u64; NUM_FEATURES], usize)> = HashSet::new();
    let mut rows = Vec::with_capacity(complete.len());
    let mut labels = Vec::with_capacity(complete.len());

    for rec in complete {
        let (features, label) = match (row_values(&rec.features), rec.label) {
            (Some(f), Some(l)) => (f, l),
            _ => continue,
        };
        let key = (features.map(f64::to_bits), label);
        if seen.insert(key) {
            rows.push(features.to_vec());
            labels.push(label);
        } else {
            stats.duplicate_rows += 1;
        }
    }

    info!("Duplicate rows found: {}", stats.duplicate_rows);
    if stats.duplicate_rows > 0 {
        info!("Duplicates removed");
    }

    stats.output_rows = labels.len();
    info!(
        "Final dataset: {} samples, {} features",
        stats.output_rows, NUM_FEATURES
    );

    let x = Matrix {
        rows: rows.len(),
        cols: NUM_FEATURES,
        data: rows,
    };
    (Samples::new(x, labels), stats)
}

fn row_values(features: &[Option<f64>; NUM_FEATURES]) -> Option<[f64; NUM_FEATURES]> {
    let mut out = [0.0; NUM_FEATURES];
    for (slot, f) in out.iter_mut().zip(features) {
        *slot = (*f)?;
    }
    Some(out)
}
