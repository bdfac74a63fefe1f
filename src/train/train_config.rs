use serde::{Deserialize, Serialize};

/// Hyperparameters for one training run.
///
/// # Fields
/// - `hidden1`, `hidden2`: widths of the two ReLU layers
/// - `epochs`            : full passes over the training rows; no early stop
/// - `batch_size`        : rows per Adam update; the last batch of an epoch
///                          may be smaller
/// - `learning_rate`     : Adam step size
/// - `log_every`         : emit the mean batch loss at `info` every N epochs
/// - `seed`              : seeds weight init and batch shuffling; `None`
///                          draws from OS entropy, so runs differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub hidden1: usize,
    pub hidden2: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub log_every: usize,
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            hidden1: 10,
            hidden2: 5,
            epochs: 100,
            batch_size: 16,
            learning_rate: 0.01,
            log_every: 20,
            seed: None,
        }
    }
}

impl TrainConfig {
    pub fn seeded(seed: u64) -> Self {
        TrainConfig {
            seed: Some(seed),
            ..TrainConfig::default()
        }
    }
}
