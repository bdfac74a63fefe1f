use crate::math::matrix::Matrix;

/// Softmax cross-entropy computed directly on logits, averaged over the batch.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Row-wise softmax. Subtracts the row maximum before exponentiating.
    pub fn softmax(logits: &Matrix) -> Matrix {
        let data = logits
            .data
            .iter()
            .map(|row| {
                let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let exps: Vec<f64> = row.iter().map(|z| (z - max).exp()).collect();
                let sum: f64 = exps.iter().sum();
                exps.into_iter().map(|e| e / sum).collect()
            })
            .collect();
        Matrix::from_data(data)
    }

    /// Mean of `-log softmax(z)[y]` over the rows of `logits`.
    ///
    /// Uses log-sum-exp so large logits never overflow.
    pub fn loss(logits: &Matrix, targets: &[usize]) -> f64 {
        assert_eq!(logits.rows, targets.len(), "one target per logits row");
        if targets.is_empty() {
            return 0.0;
        }
        let total: f64 = logits
            .data
            .iter()
            .zip(targets)
            .map(|(row, &y)| {
                let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let log_sum = row.iter().map(|z| (z - max).exp()).sum::<f64>().ln() + max;
                log_sum - row[y]
            })
            .sum();
        total / targets.len() as f64
    }

    /// ∂loss/∂logits = (softmax(z) - onehot(y)) / batch.
    pub fn derivative(logits: &Matrix, targets: &[usize]) -> Matrix {
        assert_eq!(logits.rows, targets.len(), "one target per logits row");
        let inv_batch = 1.0 / targets.len().max(1) as f64;
        let mut grad = Self::softmax(logits);
        for (row, &y) in grad.data.iter_mut().zip(targets) {
            row[y] -= 1.0;
            for g in row.iter_mut() {
                *g *= inv_batch;
            }
        }
        grad
    }
}
