use std::fmt;

use serde::{Deserialize, Serialize};

/// Square table of counts: `counts[i][j]` is the number of rows whose true
/// class is `i` and predicted class is `j`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Panics if a label or prediction is `>= num_classes` or the slices
    /// differ in length.
    pub fn from_predictions(truth: &[usize], predicted: &[usize], num_classes: usize) -> ConfusionMatrix {
        assert_eq!(truth.len(), predicted.len(), "one prediction per label");
        let mut counts = vec![vec![0usize; num_classes]; num_classes];
        for (&t, &p) in truth.iter().zip(predicted) {
            counts[t][p] += 1;
        }
        ConfusionMatrix { counts }
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// True support of each class.
    pub fn row_sums(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Number of predictions made for each class.
    pub fn column_sums(&self) -> Vec<usize> {
        (0..self.num_classes())
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_classes()).map(|i| self.counts[i][i]).sum()
    }

    /// Diagonal over total; 0.0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().cloned().max().unwrap_or(0)
    }
}

/// Renders as a bracketed grid, e.g. `[[10  0]\n [ 1  9]]`.
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_count().to_string().len();
        write!(f, "[")?;
        for (i, row) in self.counts.iter().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            let cells: Vec<String> = row.iter().map(|c| format!("{:>width$}", c, width = width)).collect();
            write!(f, "[{}]", cells.join(" "))?;
        }
        write!(f, "]")
    }
}
