pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod eval;
pub mod report;
pub mod config;
pub mod error;
pub mod pipeline;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{mlp::Mlp, spec::MlpSpec};
pub use loss::cross_entropy::CrossEntropyLoss;
pub use optim::adam::Adam;
pub use train::{trainer::train_model, train_config::TrainConfig, epoch_stats::TrainingReport};
pub use eval::{evaluator::evaluate, confusion::ConfusionMatrix, metrics::ClassificationReport};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{run, PipelineOutcome};
