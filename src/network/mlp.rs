use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::{PipelineError, Result};
use crate::layers::dense::{Layer, LayerTrace};
use crate::math::matrix::Matrix;
use crate::network::spec::MlpSpec;

/// Feed-forward classifier with a fixed depth of three linear stages.
///
/// The two hidden stages use ReLU, the last one emits raw logits.
#[derive(Debug, Clone)]
pub struct Mlp {
    pub spec: MlpSpec,
    pub fc1: Layer,
    pub fc2: Layer,
    pub fc3: Layer,
}

/// Per-layer activations of one forward pass.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    pub fc1: LayerTrace,
    pub fc2: LayerTrace,
    pub fc3: LayerTrace,
}

impl ForwardTrace {
    pub fn logits(&self) -> &Matrix {
        &self.fc3.post
    }
}

/// Loss gradients for every parameter, as `(weights, biases)` per layer.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub fc1: (Matrix, Matrix),
    pub fc2: (Matrix, Matrix),
    pub fc3: (Matrix, Matrix),
}

impl Mlp {
    pub fn new<R: Rng + ?Sized>(spec: MlpSpec, rng: &mut R) -> Mlp {
        Mlp {
            spec,
            fc1: Layer::new(spec.hidden1, spec.input_size, ActivationFunction::ReLU, rng),
            fc2: Layer::new(spec.hidden2, spec.hidden1, ActivationFunction::ReLU, rng),
            fc3: Layer::new(spec.num_classes, spec.hidden2, ActivationFunction::Identity, rng),
        }
    }

    fn check_input(&self, input: &Matrix) -> Result<()> {
        if input.rows == 0 {
            return Err(PipelineError::EmptyData("model input has no rows".into()));
        }
        if input.cols != self.spec.input_size {
            return Err(PipelineError::ShapeMismatch {
                expected: self.spec.input_size,
                got: input.cols,
            });
        }
        Ok(())
    }

    /// Forward pass keeping every layer's activations for backprop.
    pub fn forward_trace(&self, input: &Matrix) -> Result<ForwardTrace> {
        self.check_input(input)?;
        let fc1 = self.fc1.feed(input);
        let fc2 = self.fc2.feed(&fc1.post);
        let fc3 = self.fc3.feed(&fc2.post);
        Ok(ForwardTrace { fc1, fc2, fc3 })
    }

    /// Logits for a batch, shape (n, num_classes).
    pub fn forward(&self, input: &Matrix) -> Result<Matrix> {
        Ok(self.forward_trace(input)?.fc3.post)
    }

    /// Backpropagates `logits_grad` (∂L/∂logits) through the trace of `input`.
    pub fn backward(&self, input: &Matrix, trace: &ForwardTrace, logits_grad: &Matrix) -> Gradients {
        let (w3, b3, d2) = self.fc3.compute_gradients(logits_grad, &trace.fc2.post, &trace.fc3);
        let (w2, b2, d1) = self.fc2.compute_gradients(&d2, &trace.fc1.post, &trace.fc2);
        let (w1, b1, _) = self.fc1.compute_gradients(&d1, input, &trace.fc1);
        Gradients {
            fc1: (w1, b1),
            fc2: (w2, b2),
            fc3: (w3, b3),
        }
    }

    /// Highest-scoring class index per row.
    pub fn predict(&self, input: &Matrix) -> Result<Vec<usize>> {
        let logits = self.forward(input)?;
        Ok(logits.data.iter().map(|row| argmax(row)).collect())
    }

    pub fn layers(&self) -> [&Layer; 3] {
        [&self.fc1, &self.fc2, &self.fc3]
    }

    pub fn layers_mut(&mut self) -> [&mut Layer; 3] {
        [&mut self.fc1, &mut self.fc2, &mut self.fc3]
    }

    pub fn parameter_count(&self) -> usize {
        self.layers()
            .iter()
            .map(|l| l.weights.rows * l.weights.cols + l.biases.cols)
            .sum()
    }
}

/// Index of the maximum element in a slice. Ties resolve to the lowest index.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, &x)| {
            if x > best { (i, x) } else { (best_i, best) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::cross_entropy::CrossEntropyLoss;
    use rand::{rngs::StdRng, SeedableRng};

    fn model() -> Mlp {
        Mlp::new(MlpSpec::default(), &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn shapes_follow_spec() {
        let m = model();
        assert_eq!((m.fc1.weights.rows, m.fc1.weights.cols), (4, 10));
        assert_eq!((m.fc2.weights.rows, m.fc2.weights.cols), (10, 5));
        assert_eq!((m.fc3.weights.rows, m.fc3.weights.cols), (5, 3));
        assert_eq!(m.parameter_count(), 4 * 10 + 10 + 10 * 5 + 5 + 5 * 3 + 3);
    }

    #[test]
    fn forward_rejects_wrong_feature_count() {
        let x = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
        match model().forward(&x) {
            Err(PipelineError::ShapeMismatch { expected: 4, got: 3 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn predict_returns_one_class_per_row() {
        let x = Matrix::from_data(vec![vec![0.1, 0.2, 0.3, 0.4]; 5]);
        let preds = model().predict(&x).unwrap();
        assert_eq!(preds.len(), 5);
        assert!(preds.iter().all(|&p| p < 3));
    }

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(argmax(&[0.5, 2.0, 2.0]), 1);
        assert_eq!(argmax(&[-1.0, -3.0]), 0);
    }

    #[test]
    fn backward_matches_finite_differences() {
        let m = model();
        let x = Matrix::from_data(vec![vec![0.5, -1.2, 0.3, 0.9], vec![-0.4, 0.8, 1.5, -0.2]]);
        let y = [0, 2];
        let trace = m.forward_trace(&x).unwrap();
        let grads = m.backward(&x, &trace, &CrossEntropyLoss::derivative(trace.logits(), &y));

        let loss = |m: &Mlp| CrossEntropyLoss::loss(&m.forward(&x).unwrap(), &y);
        let h = 1e-6;
        let base = loss(&m);

        let mut bumped = m.clone();
        bumped.fc1.weights.data[2][4] += h;
        let numeric = (loss(&bumped) - base) / h;
        assert!((numeric - grads.fc1.0.data[2][4]).abs() < 1e-4);

        let mut bumped = m.clone();
        bumped.fc3.biases.data[0][1] += h;
        let numeric = (loss(&bumped) - base) / h;
        assert!((numeric - grads.fc3.1.data[0][1]).abs() < 1e-4);
    }
}
