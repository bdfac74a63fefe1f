use crate::math::matrix::Matrix;

/// Every record carries exactly this many numeric features.
pub const NUM_FEATURES: usize = 4;

/// Display names of the three classes, indexed by class id.
pub const CLASS_NAMES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Column titles used when printing rows.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "sepal length (cm)",
    "sepal width (cm)",
    "petal length (cm)",
    "petal width (cm)",
];

/// One row as read from the source. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub features: [Option<f64>; NUM_FEATURES],
    pub label: Option<usize>,
}

impl RawRecord {
    pub fn is_complete(&self) -> bool {
        self.label.is_some() && self.features.iter().all(|f| f.is_some())
    }

    pub fn missing_count(&self) -> usize {
        self.features.iter().filter(|f| f.is_none()).count() + usize::from(self.label.is_none())
    }
}

/// The loaded table before cleaning.
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub records: Vec<RawRecord>,
    pub class_names: Vec<String>,
}

impl RawDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` rows formatted as a small text table.
    pub fn head(&self, n: usize) -> String {
        let mut out = format!("{:>4} ", "");
        for name in FEATURE_NAMES {
            out.push_str(&format!(" {:>17}", name));
        }
        out.push_str(&format!("  {:>6}  {}\n", "target", "species"));
        for (i, rec) in self.records.iter().take(n).enumerate() {
            let cell = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |x| format!("{:.1}", x));
            let (target, species) = match rec.label {
                Some(l) => (l.to_string(), self.class_names[l].clone()),
                None => ("NaN".to_string(), "NaN".to_string()),
            };
            out.push_str(&format!(
                "{:>4}  {:>17} {:>17} {:>17} {:>17}  {:>6}  {}\n",
                i,
                cell(rec.features[0]),
                cell(rec.features[1]),
                cell(rec.features[2]),
                cell(rec.features[3]),
                target,
                species
            ));
        }
        out
    }
}

/// Feature matrix X with its label vector y, one label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub x: Matrix,
    pub y: Vec<usize>,
}

impl Samples {
    pub fn new(x: Matrix, y: Vec<usize>) -> Samples {
        assert_eq!(x.rows, y.len(), "X and y must have the same number of rows");
        Samples { x, y }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Occurrences of each class id in `0..num_classes`.
    pub fn class_counts(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; num_classes];
        for &label in &self.y {
            counts[label] += 1;
        }
        counts
    }

    pub fn select(&self, indices: &[usize]) -> Samples {
        Samples {
            x: self.x.select_rows(indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_titles_columns_and_marks_missing_cells() {
        let ds = RawDataset {
            records: vec![
                RawRecord { features: [Some(5.1), Some(3.5), Some(1.4), Some(0.2)], label: Some(0) },
                RawRecord { features: [Some(6.0), None, Some(4.8), Some(1.8)], label: None },
            ],
            class_names: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
        };
        let text = ds.head(5);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for name in FEATURE_NAMES {
            assert!(lines[0].contains(name), "missing {}", name);
        }
        assert!(lines[1].contains("setosa"));
        assert!(lines[2].contains("NaN"));
    }
}
