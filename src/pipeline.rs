//! The end-to-end run: load, clean, split, normalize, train, evaluate, plot.
//!
//! Stages run strictly in order and the first error aborts the run.

use std::path::PathBuf;

use tracing::info;

use crate::config::PipelineConfig;
use crate::data::{
    cleaner::{clean, CleaningStats},
    dataset::Samples,
    loader::load_dataset,
    normalizer::{normalize, StandardScaler},
    splitter::{stratified_split, Split},
};
use crate::error::Result;
use crate::eval::evaluator::{evaluate, Evaluation};
use crate::network::mlp::Mlp;
use crate::report::heatmap::write_heatmaps;
use crate::train::{epoch_stats::TrainingReport, trainer::train_model};

const RULE: &str = "============================================================";

/// Everything a run produced, stage by stage.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub class_names: Vec<String>,
    pub cleaning: CleaningStats,
    /// Unscaled train/test partition.
    pub split: Split,
    /// Statistics fitted on the training subset.
    pub scaler: StandardScaler,
    pub model: Mlp,
    pub training: TrainingReport,
    pub evaluation: Evaluation,
    /// Heatmap files written, possibly none.
    pub heatmaps: Vec<PathBuf>,
}

fn banner(title: &str) {
    info!("{}", RULE);
    info!("{}", title);
    info!("{}", RULE);
}

pub fn run(config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;

    banner("Step 1: Loading Iris dataset");
    let raw = load_dataset(config.data.csv_path.as_deref())?;
    let class_names = raw.class_names.clone();
    let num_classes = class_names.len();

    banner("Step 2: Cleaning data");
    let (samples, cleaning) = clean(&raw);

    banner("Step 3: Splitting data (stratified)");
    let split = stratified_split(
        &samples,
        num_classes,
        config.split.test_fraction,
        config.split.seed,
    )?;

    banner("Step 4: Normalizing features");
    let (scaler, x_train, x_test) = normalize(&split.train.x, &split.test.x)?;

    banner("Step 5: Building and training the MLP");
    let (model, training) = train_model(&x_train, &split.train.y, num_classes, &config.train)?;

    banner("Step 6: Evaluating the model");
    let test = Samples::new(x_test, split.test.y.clone());
    let evaluation = evaluate(&model, &test, &class_names)?;

    banner("Step 7: Plotting the confusion matrix");
    let heatmaps = write_heatmaps(&evaluation.confusion, &class_names, &config.report)?;

    banner("PIPELINE COMPLETE!");

    Ok(PipelineOutcome {
        class_names,
        cleaning,
        split,
        scaler,
        model,
        training,
        evaluation,
        heatmaps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn invalid_config_stops_before_loading() {
        let mut config = PipelineConfig::default();
        config.data.csv_path = Some(PathBuf::from("/nonexistent/iris.csv"));
        config.train.batch_size = 0;
        assert!(matches!(run(&config), Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn unreadable_csv_is_reported() {
        let mut config = PipelineConfig::default();
        config.data.csv_path = Some(PathBuf::from("/nonexistent/iris.csv"));
        assert!(matches!(run(&config), Err(PipelineError::DataUnavailable(_))));
    }
}
