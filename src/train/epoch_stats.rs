use serde::{Deserialize, Serialize};

/// Statistics for one completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean of the per-batch losses in this epoch.
    pub train_loss: f64,
    pub batches: usize,
    pub elapsed_ms: u64,
}

/// Outcome of a full training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs: Vec<EpochStats>,
    /// Loss of the very first mini-batch, before any update.
    pub first_batch_loss: f64,
    /// Loss of the last mini-batch of the last epoch.
    pub last_batch_loss: f64,
}

impl TrainingReport {
    /// Mean batch loss of the final epoch.
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|s| s.train_loss)
    }
}
