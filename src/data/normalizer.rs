//! Z-score standardization, `z = (x - mean) / std`.
//!
//! Statistics come from the training subset only and are then applied
//! unchanged to any other subset.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::math::matrix::Matrix;

/// Fitted per-feature mean and population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    /// Zero-variance features are stored with std = 1.0, so they map to
    /// `x - mean` instead of dividing by zero.
    pub std: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(data: &Matrix) -> Result<StandardScaler> {
        if data.rows == 0 {
            return Err(PipelineError::EmptyData(
                "cannot fit StandardScaler on empty data".into(),
            ));
        }

        let mean = data.column_means();
        let std = data
            .column_stds()
            .into_iter()
            .zip(&mean)
            .enumerate()
            .map(|(j, (s, m))| {
                if is_constant(s, *m) {
                    warn!("Feature {} has zero variance; leaving it unscaled", j);
                    1.0
                } else {
                    s
                }
            })
            .collect();

        Ok(StandardScaler { mean, std })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        if data.rows > 0 && data.cols != self.n_features() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features(),
                got: data.cols,
            });
        }

        let rows = data
            .data
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(&self.std))
                    .map(|(x, (m, s))| (x - m) / s)
                    .collect()
            })
            .collect();

        Ok(Matrix {
            rows: data.rows,
            cols: self.n_features(),
            data: rows,
        })
    }

    pub fn fit_transform(data: &Matrix) -> Result<(StandardScaler, Matrix)> {
        let scaler = StandardScaler::fit(data)?;
        let scaled = scaler.transform(data)?;
        Ok((scaler, scaled))
    }
}

/// A std this small relative to the mean is rounding noise from summing
/// identical values, not real spread.
fn is_constant(std: f64, mean: f64) -> bool {
    std <= 10.0 * f64::EPSILON * mean.abs().max(1.0)
}

/// Fits on `train`, then scales both subsets with the train statistics.
pub fn normalize(train: &Matrix, test: &Matrix) -> Result<(StandardScaler, Matrix, Matrix)> {
    let (scaler, train_scaled) = StandardScaler::fit_transform(train)?;
    let test_scaled = scaler.transform(test)?;

    let (mean, std) = train_scaled.overall_mean_std();
    info!("Data normalized (mean=0, std=1)");
    info!("Training data mean: {:.4}", mean);
    info!("Training data std: {:.4}", std);

    Ok((scaler, train_scaled, test_scaled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scaled_train_columns_are_standardized() {
        let train = Matrix::from_data(vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![6.0, 20.0],
        ]);
        let (_, scaled) = StandardScaler::fit_transform(&train).unwrap();
        for m in scaled.column_means() {
            assert!(m.abs() < 1e-9);
        }
        for s in scaled.column_stds() {
            assert!((s - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_subset_uses_train_statistics() {
        let train = Matrix::from_data(vec![vec![0.0], vec![2.0]]);
        let test = Matrix::from_data(vec![vec![4.0]]);
        let (scaler, _, test_scaled) = normalize(&train, &test).unwrap();
        assert_eq!(scaler.mean, vec![1.0]);
        assert_eq!(scaler.std, vec![1.0]);
        assert_eq!(test_scaled.data, vec![vec![3.0]]);
    }

    #[test]
    fn zero_variance_feature_becomes_zero() {
        let train = Matrix::from_data(vec![vec![5.0, 1.0], vec![5.0, 3.0]]);
        let (scaler, scaled) = StandardScaler::fit_transform(&train).unwrap();
        assert_eq!(scaler.std[0], 1.0);
        assert!(scaled.data.iter().all(|row| row[0] == 0.0));
    }

    #[test]
    fn inexact_constant_feature_still_becomes_zero() {
        // 0.1 has no exact binary form, so the computed std is ~1e-17, not 0.
        let train = Matrix::from_data(vec![vec![0.1, 1.0], vec![0.1, 2.0], vec![0.1, 4.0]]);
        let (scaler, scaled) = StandardScaler::fit_transform(&train).unwrap();
        assert_eq!(scaler.std[0], 1.0);
        assert!(scaled.data.iter().all(|row| row[0].abs() < 1e-9));
        assert!(scaler.std[1] > 1.0);
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let scaler = StandardScaler::fit(&Matrix::from_data(vec![vec![1.0, 2.0]])).unwrap();
        let err = scaler.transform(&Matrix::from_data(vec![vec![1.0, 2.0, 3.0]])).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn fit_rejects_empty_input() {
        assert!(matches!(
            StandardScaler::fit(&Matrix::zeros(0, 4)),
            Err(PipelineError::EmptyData(_))
        ));
    }

    proptest! {
        #[test]
        fn any_non_constant_column_scales_to_unit_variance(
            values in prop::collection::vec(-1.0e3f64..1.0e3, 2..64),
        ) {
            let spread = values.iter().cloned().fold(f64::MIN, f64::max)
                - values.iter().cloned().fold(f64::MAX, f64::min);
            prop_assume!(spread > 1.0);
            let train = Matrix::from_data(values.iter().map(|&v| vec![v]).collect());
            let (_, scaled) = StandardScaler::fit_transform(&train).unwrap();
            prop_assert!(scaled.column_means()[0].abs() < 1e-9);
            prop_assert!((scaled.column_stds()[0] - 1.0).abs() < 1e-9);
        }
    }
}
