use crate::{layers::dense::Layer, math::matrix::Matrix, network::mlp::{Gradients, Mlp}};

/// Adam optimizer (Kingma & Ba) with bias-corrected moment estimates.
///
/// Moment buffers are created lazily on the first `step` and shaped after
/// the model's parameters.
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    moments: Vec<LayerMoments>,
}

struct LayerMoments {
    m_w: Matrix,
    v_w: Matrix,
    m_b: Matrix,
    v_b: Matrix,
}

impl LayerMoments {
    fn for_layer(layer: &Layer) -> LayerMoments {
        let (wr, wc) = (layer.weights.rows, layer.weights.cols);
        let bc = layer.biases.cols;
        LayerMoments {
            m_w: Matrix::zeros(wr, wc),
            v_w: Matrix::zeros(wr, wc),
            m_b: Matrix::zeros(1, bc),
            v_b: Matrix::zeros(1, bc),
        }
    }
}

impl Adam {
    pub fn new(learning_rate: f64) -> Adam {
        Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            moments: Vec::new(),
        }
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Applies one update to every parameter of `model`.
    pub fn step(&mut self, model: &mut Mlp, grads: Gradients) {
        if self.moments.is_empty() {
            self.moments = model.layers().into_iter().map(LayerMoments::for_layer).collect();
        }
        self.t += 1;

        let bc1 = 1.0 - self.beta1.powi(self.t);
        let bc2 = 1.0 - self.beta2.powi(self.t);
        let layer_grads = [grads.fc1, grads.fc2, grads.fc3];

        for ((layer, moments), (w_grad, b_grad)) in model
            .layers_mut()
            .into_iter()
            .zip(self.moments.iter_mut())
            .zip(layer_grads)
        {
            let hp = (self.learning_rate, self.beta1, self.beta2, self.epsilon, bc1, bc2);
            update(&mut layer.weights, &mut moments.m_w, &mut moments.v_w, &w_grad, hp);
            update(&mut layer.biases, &mut moments.m_b, &mut moments.v_b, &b_grad, hp);
        }
    }
}

fn update(
    param: &mut Matrix,
    m: &mut Matrix,
    v: &mut Matrix,
    grad: &Matrix,
    (lr, beta1, beta2, eps, bc1, bc2): (f64, f64, f64, f64, f64, f64),
) {
    assert_eq!((param.rows, param.cols), (grad.rows, grad.cols), "gradient shape mismatch");
    for i in 0..param.rows {
        for j in 0..param.cols {
            let g = grad.data[i][j];
            m.data[i][j] = beta1 * m.data[i][j] + (1.0 - beta1) * g;
            v.data[i][j] = beta2 * v.data[i][j] + (1.0 - beta2) * g * g;
            let m_hat = m.data[i][j] / bc1;
            let v_hat = v.data[i][j] / bc2;
            param.data[i][j] -= lr * m_hat / (v_hat.sqrt() + eps);
        }
    }
}
