use thiserror::Error;

/// Errors raised while reading or classifying a landmark set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("landmark index {index} is out of range for a set of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("landmark matrix must have shape (N, 2), got ({rows}, {cols})")]
    InvalidShape { rows: usize, cols: usize },
}

/// Errors surfaced by the detect -> classify -> generate pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("landmark detection failed: {0}")]
    Detector(String),

    /// `status` is `None` when the request never produced a response.
    #[error("avatar generation failed: {message}")]
    DownstreamUnavailable { status: Option<u16>, message: String },
}

impl PipelineError {
    pub(crate) fn downstream(status: Option<u16>, message: impl Into<String>) -> Self {
        PipelineError::DownstreamUnavailable {
            status,
            message: message.into(),
        }
    }
}
