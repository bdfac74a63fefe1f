use rand::Rng;

use crate::{activation::activation::ActivationFunction, math::matrix::Matrix};

/// Fully connected layer: `a = σ(x·W + b)` for a batch `x` of shape (n, input_size).
#[derive(Debug, Clone)]
pub struct Layer {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix, // (input_size, size)
    pub biases: Matrix,  // (1, size)
    pub activator: ActivationFunction,
}

/// Values a layer produced for one batch, kept for the backward pass.
#[derive(Debug, Clone)]
pub struct LayerTrace {
    /// Pre-activation `z = xW + b`.
    pub pre: Matrix,
    /// Post-activation `σ(z)`.
    pub post: Matrix,
}

impl Layer {
    /// Weights and biases start in U(-1/sqrt(fan_in), 1/sqrt(fan_in)).
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let bound = 1.0 / (input_size as f64).sqrt();
        let weights = Matrix::uniform(input_size, size, bound, rng);
        let biases = Matrix::uniform(1, size, bound, rng);

        Layer {
            size,
            input_size,
            weights,
            biases,
            activator: activation,
        }
    }

    /// Batched forward pass. Does not mutate the layer.
    pub fn feed(&self, input: &Matrix) -> LayerTrace {
        let pre = input.dot(&self.weights).add_row(&self.biases);
        let post = pre.map(|x| self.activator.function(x));
        LayerTrace { pre, post }
    }

    /// Backward pass for one batch.
    ///
    /// `upstream` is ∂L/∂a for this layer's output, `input` is what was fed
    /// into the layer and `trace` what `feed` returned for it. Returns the
    /// parameter gradients and ∂L/∂input for the previous layer.
    pub fn compute_gradients(
        &self,
        upstream: &Matrix,
        input: &Matrix,
        trace: &LayerTrace,
    ) -> (Matrix, Matrix, Matrix) {
        let act_derivative = trace.pre.map(|x| self.activator.derivative(x));
        // δ = ∂L/∂a ⊙ σ'(z)
        let delta = upstream.hadamard(&act_derivative);

        let weights_grad = input.transpose().dot(&delta);
        let biases_grad = delta.sum_rows();
        let input_grad = delta.dot(&self.weights.transpose());

        (weights_grad, biases_grad, input_grad)
    }
}
