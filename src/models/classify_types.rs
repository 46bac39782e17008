use serde::{Deserialize, Serialize};

/// Raw (label, probability) pair exactly as produced by the downloaded
/// model, before any remapping onto the seasoning vocabulary.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

/// Everything the model returned for one image, plus the version string
/// from its metadata sidecar.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub predictions: Vec<Prediction>,
    pub model_version: String,
}

/// Sidecar `metadata.json` hosted next to `model.onnx`. Output index `i`
/// corresponds to `labels[i]`.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelMetadata {
    #[serde(default)]
    pub version: Option<String>,
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ModelStatus {
    pub downloaded: bool,
    pub loading: bool,
    pub ready: bool,
    pub error: Option<String>,
}
