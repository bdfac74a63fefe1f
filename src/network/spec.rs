use serde::{Deserialize, Serialize};

/// Layer widths of the three-stage classifier:
/// `input -> hidden1 (ReLU) -> hidden2 (ReLU) -> num_classes (logits)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlpSpec {
    pub input_size: usize,
    pub hidden1: usize,
    pub hidden2: usize,
    pub num_classes: usize,
}

impl Default for MlpSpec {
    fn default() -> Self {
        MlpSpec {
            input_size: 4,
            hidden1: 10,
            hidden2: 5,
            num_classes: 3,
        }
    }
}

impl std::fmt::Display for MlpSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Input({}) -> Hidden({}) -> Hidden({}) -> Output({})",
            self.input_size, self.hidden1, self.hidden2, self.num_classes
        )
    }
}
