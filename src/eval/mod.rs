pub mod confusion;
pub mod metrics;
pub mod evaluator;

pub use confusion::ConfusionMatrix;
pub use metrics::{ClassMetrics, ClassificationReport};
pub use evaluator::{evaluate, Evaluation};
