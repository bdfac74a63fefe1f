use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::data::dataset::NUM_FEATURES;
use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::{mlp::Mlp, spec::MlpSpec};
use crate::optim::adam::Adam;
use crate::train::{epoch_stats::TrainingReport, loop_fn::train_loop, train_config::TrainConfig};

/// Builds a fresh `NUM_FEATURES`-input classifier and trains it with Adam.
///
/// The model is returned by value; nothing mutates it after this call.
pub fn train_model(
    inputs: &Matrix,
    labels: &[usize],
    num_classes: usize,
    config: &TrainConfig,
) -> Result<(Mlp, TrainingReport)> {
    let spec = MlpSpec {
        input_size: NUM_FEATURES,
        hidden1: config.hidden1,
        hidden2: config.hidden2,
        num_classes,
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut model = Mlp::new(spec, &mut rng);
    let mut optimizer = Adam::new(config.learning_rate);

    info!("Model architecture: {} ({} parameters)", spec, model.parameter_count());
    info!("Training for {} epochs...", config.epochs);

    let report = train_loop(&mut model, inputs, labels, &mut optimizer, config, &mut rng)?;

    info!("Model training complete!");
    Ok((model, report))
}
