use std::fmt;

use serde::{Deserialize, Serialize};

use crate::eval::confusion::ConfusionMatrix;

/// Precision, recall and F1 for one class (or one average row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class scores plus accuracy, macro and support-weighted averages.
///
/// A ratio whose denominator is zero is reported as 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Support-weighted mean of one score across classes.
fn weighted_mean(classes: &[ClassMetrics], total: usize, score: impl Fn(&ClassMetrics) -> f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    classes.iter().map(|c| score(c) * c.support as f64).sum::<f64>() / total as f64
}

fn write_row(f: &mut fmt::Formatter<'_>, c: &ClassMetrics, w: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        c.name, c.precision, c.recall, c.f1, c.support, w = w
    )
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix, class_names: &[String]) -> ClassificationReport {
        let supports = cm.row_sums();
        let predicted = cm.column_sums();
        let total = cm.total();

        let classes: Vec<ClassMetrics> = (0..cm.num_classes())
            .map(|i| {
                let tp = cm.counts[i][i];
                let precision = ratio(tp, predicted[i]);
                let recall = ratio(tp, supports[i]);
                ClassMetrics {
                    name: class_names.get(i).cloned().unwrap_or_else(|| i.to_string()),
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support: supports[i],
                }
            })
            .collect();

        let k = classes.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            name: "macro avg".into(),
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / k,
            support: total,
        };

        let weighted_avg = ClassMetrics {
            name: "weighted avg".into(),
            precision: weighted_mean(&classes, total, |c| c.precision),
            recall: weighted_mean(&classes, total, |c| c.recall),
            f1: weighted_mean(&classes, total, |c| c.f1),
            support: total,
        };

        ClassificationReport {
            accuracy: cm.accuracy(),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn support(&self) -> usize {
        self.macro_avg.support
    }
}

/// Text table in the familiar `precision recall f1-score support` layout.
impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self
            .classes
            .iter()
            .map(|c| c.name.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(f, "{:>w$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support", w = w)?;
        writeln!(f)?;
        for c in &self.classes {
            write_row(f, c, w)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.support(), w = w
        )?;
        write_row(f, &self.macro_avg, w)?;
        write_row(f, &self.weighted_avg, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["setosa", "versicolor", "virginica"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn per_class_scores_follow_confusion_counts() {
        // true 1 predicted as 2 once; true 2 predicted as 1 twice
        let cm = ConfusionMatrix {
            counts: vec![vec![10, 0, 0], vec![0, 9, 1], vec![0, 2, 8]],
        };
        let report = ClassificationReport::from_confusion(&cm, &names());

        let v = &report.classes[1];
        assert_eq!(v.name, "versicolor");
        assert!((v.precision - 9.0 / 11.0).abs() < 1e-12);
        assert!((v.recall - 0.9).abs() < 1e-12);
        assert_eq!(v.support, 10);
        let expected_f1 = 2.0 * (9.0 / 11.0) * 0.9 / (9.0 / 11.0 + 0.9);
        assert!((v.f1 - expected_f1).abs() < 1e-12);

        assert!((report.accuracy - 27.0 / 30.0).abs() < 1e-12);
        assert_eq!(report.support(), 30);
    }

    #[test]
    fn weighted_recall_equals_accuracy() {
        let cm = ConfusionMatrix {
            counts: vec![vec![5, 1, 0], vec![2, 7, 3], vec![0, 0, 12]],
        };
        let report = ClassificationReport::from_confusion(&cm, &names());
        assert!((report.weighted_avg.recall - report.accuracy).abs() < 1e-12);
    }

    #[test]
    fn never_predicted_class_scores_zero_precision() {
        let cm = ConfusionMatrix {
            counts: vec![vec![3, 0, 0], vec![2, 0, 0], vec![0, 0, 1]],
        };
        let report = ClassificationReport::from_confusion(&cm, &names());
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
    }

    #[test]
    fn display_lists_every_class_and_average() {
        let cm = ConfusionMatrix {
            counts: vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]],
        };
        let text = ClassificationReport::from_confusion(&cm, &names()).to_string();
        for label in ["setosa", "versicolor", "virginica", "accuracy", "macro avg", "weighted avg"] {
            assert!(text.contains(label), "missing {}", label);
        }
        assert!(text.contains("1.00"));
    }
}
