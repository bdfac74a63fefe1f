//! Error type shared by every pipeline stage.

use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// The dataset source could not be read.
    DataUnavailable(String),
    /// A CSV row could not be parsed.
    Parse { row: usize, message: String },
    /// A label outside the known class set.
    UnknownClass(String),
    /// A stage received no rows where it needs at least one.
    EmptyData(String),
    /// Feature count differs from what a fitted component expects.
    ShapeMismatch { expected: usize, got: usize },
    /// A configuration or hyperparameter value is out of range.
    InvalidParameter(String),
    Io(std::io::Error),
    Config(String),
    /// The confusion matrix heatmap could not be rendered or written.
    Render(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::DataUnavailable(msg) => write!(f, "Dataset unavailable: {}", msg),
            PipelineError::Parse { row, message } => write!(f, "Row {}: {}", row, message),
            PipelineError::UnknownClass(label) => write!(f, "Unknown class label '{}'", label),
            PipelineError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            PipelineError::ShapeMismatch { expected, got } => write!(
                f,
                "Feature mismatch: expected {} features, got {}",
                expected, got
            ),
            PipelineError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PipelineError::Io(err) => write!(f, "I/O error: {}", err),
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PipelineError::Render(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        PipelineError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
