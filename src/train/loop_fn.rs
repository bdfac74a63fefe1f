use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::mlp::Mlp;
use crate::optim::adam::Adam;
use crate::train::epoch_stats::{EpochStats, TrainingReport};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` in place for `config.epochs` epochs of mini-batch Adam.
///
/// # Arguments
/// - `model`    : parameters are mutated by every optimizer step
/// - `inputs`   : training rows, shape (n, input_size)
/// - `labels`   : class index per row, same length as `inputs`
/// - `optimizer`: carries the learning rate and the moment buffers
/// - `config`   : epochs, batch size and logging cadence
/// - `rng`      : drives the per-epoch shuffle
///
/// # Errors
/// `EmptyData` for no rows, `ShapeMismatch` when the feature count differs
/// from the model input, `InvalidParameter` for a zero batch size or a label
/// outside the model's classes, or zero epochs.
pub fn train_loop<R: Rng + ?Sized>(
    model: &mut Mlp,
    inputs: &Matrix,
    labels: &[usize],
    optimizer: &mut Adam,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<TrainingReport> {
    validate(model, inputs, labels, config)?;

    let mut report = TrainingReport {
        epochs: Vec::with_capacity(config.epochs),
        first_batch_loss: f64::NAN,
        last_batch_loss: f64::NAN,
    };

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let batch_losses = run_one_epoch(model, inputs, labels, optimizer, config.batch_size, rng)?;

        if epoch == 1 {
            report.first_batch_loss = batch_losses[0];
        }
        report.last_batch_loss = batch_losses[batch_losses.len() - 1];

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss: batch_losses.iter().sum::<f64>() / batch_losses.len() as f64,
            batches: batch_losses.len(),
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if config.log_every > 0 && epoch % config.log_every == 0 {
            info!("Epoch [{}/{}], Loss: {:.4}", epoch, config.epochs, stats.train_loss);
        } else {
            debug!("Epoch [{}/{}], Loss: {:.4}", epoch, config.epochs, stats.train_loss);
        }

        report.epochs.push(stats);
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn validate(model: &Mlp, inputs: &Matrix, labels: &[usize], config: &TrainConfig) -> Result<()> {
    if inputs.rows == 0 {
        return Err(PipelineError::EmptyData("no training rows".into()));
    }
    if inputs.rows != labels.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "{} training rows but {} labels",
            inputs.rows,
            labels.len()
        )));
    }
    if inputs.cols != model.spec.input_size {
        return Err(PipelineError::ShapeMismatch {
            expected: model.spec.input_size,
            got: inputs.cols,
        });
    }
    if config.epochs == 0 {
        return Err(PipelineError::InvalidParameter("epochs must be at least 1".into()));
    }
    if config.batch_size == 0 {
        return Err(PipelineError::InvalidParameter("batch_size must be at least 1".into()));
    }
    if let Some(&bad) = labels.iter().find(|&&y| y >= model.spec.num_classes) {
        return Err(PipelineError::InvalidParameter(format!(
            "label {} is outside 0..{}",
            bad, model.spec.num_classes
        )));
    }
    Ok(())
}

/// One shuffled pass over the training rows. Returns the loss of every batch,
/// each computed before that batch's update.
fn run_one_epoch<R: Rng + ?Sized>(
    model: &mut Mlp,
    inputs: &Matrix,
    labels: &[usize],
    optimizer: &mut Adam,
    batch_size: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let mut indices: Vec<usize> = (0..inputs.rows).collect();
    indices.shuffle(rng);

    let mut losses = Vec::with_capacity((inputs.rows + batch_size - 1) / batch_size);

    for batch in indices.chunks(batch_size) {
        let batch_x = inputs.select_rows(batch);
        let batch_y: Vec<usize> = batch.iter().map(|&i| labels[i]).collect();

        let trace = model.forward_trace(&batch_x)?;
        losses.push(CrossEntropyLoss::loss(trace.logits(), &batch_y));

        let logits_grad = CrossEntropyLoss::derivative(trace.logits(), &batch_y);
        let grads = model.backward(&batch_x, &trace, &logits_grad);
        optimizer.step(model, grads);
    }

    Ok(losses)
}
