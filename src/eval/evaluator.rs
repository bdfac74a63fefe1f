use tracing::info;

use crate::data::dataset::Samples;
use crate::error::Result;
use crate::eval::{confusion::ConfusionMatrix, metrics::ClassificationReport};
use crate::network::mlp::Mlp;

/// Test-set predictions and the metrics derived from them.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub predictions: Vec<usize>,
    /// Share of rows whose prediction matches the label.
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
}

/// Scores `model` on `test` with one gradient-free forward pass.
///
/// Borrowing the model immutably keeps its parameters frozen here.
pub fn evaluate(model: &Mlp, test: &Samples, class_names: &[String]) -> Result<Evaluation> {
    let predictions = model.predict(&test.x)?;

    let correct = predictions.iter().zip(&test.y).filter(|(p, t)| p == t).count();
    let accuracy = correct as f64 / test.len() as f64;
    info!("Test Accuracy: {:.4} ({:.2}%)", accuracy, accuracy * 100.0);

    let confusion = ConfusionMatrix::from_predictions(&test.y, &predictions, model.spec.num_classes);
    let report = ClassificationReport::from_confusion(&confusion, class_names);

    info!("Classification Report:\n{}", report);
    info!("Confusion Matrix:\n{}", confusion);

    Ok(Evaluation {
        predictions,
        accuracy,
        confusion,
        report,
    })
}
