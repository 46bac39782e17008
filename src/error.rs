use thiserror::Error;

/// Upload rejection categories. These surface to the user immediately and
/// block the analysis; no classifier work happens after a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("file size {size} bytes exceeds the {limit} byte limit")]
    Oversize { size: u64, limit: u64 },

    #[error("unsupported file type `{mime}`; only JPEG and PNG are accepted")]
    WrongType { mime: String },

    #[error("could not process image: {0}")]
    Generic(String),
}

impl ValidationError {
    /// Stable category tag, used for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Oversize { .. } => "oversize",
            ValidationError::WrongType { .. } => "wrong_type",
            ValidationError::Generic(_) => "generic",
        }
    }
}

/// Failures of the external classifier collaborator. None of these reach
/// the user: the analysis engine recovers them with synthetic scores.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model download failed: {0}")]
    Download(String),

    #[error("model metadata invalid: {0}")]
    Metadata(String),

    #[error("model load failed: {0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        ClassifierError::Download(err.to_string())
    }
}

/// Umbrella error for library consumers that don't care which layer failed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
