//! Download, cache and lazy loading of the per-demographic models.
//!
//! Each gender maps to its own hosted model (`model.onnx` plus a
//! `metadata.json` sidecar with the label table and version). Nothing is
//! fetched or loaded until the first classification asks for it; after
//! that the session stays resident for the life of the process.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::ClassifierError;
use crate::models::classify_types::{ModelMetadata, ModelOutput, ModelStatus};
use crate::models::image_types::PreparedImage;
use crate::models::seasoning::Gender;
use crate::services::classifier::{inference, ClassifierBackend};

const MODEL_FILE: &str = "model.onnx";
const METADATA_FILE: &str = "metadata.json";

/// A model that finished loading: resident ONNX session plus the label
/// table and version from its metadata sidecar.
#[derive(Debug)]
pub struct LoadedModel {
    pub(crate) session: Mutex<Session>,
    pub labels: Vec<String>,
    pub version: String,
}

/// Lazy-load slot for one demographic.
///
/// The `OnceCell` gives first-caller-loads, everyone-else-waits semantics;
/// a failed load leaves the cell empty so the next analysis retries
/// instead of pinning the error forever.
struct ModelSlot {
    cell: OnceCell<Arc<LoadedModel>>,
    loading: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl ModelSlot {
    fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }
}

pub struct ModelManager {
    model_dir: PathBuf,
    config: ModelConfig,
    male: ModelSlot,
    female: ModelSlot,
}

impl ModelManager {
    pub fn new(data_dir: &Path, config: ModelConfig) -> Self {
        Self {
            model_dir: data_dir.join("models"),
            config,
            male: ModelSlot::new(),
            female: ModelSlot::new(),
        }
    }

    fn slot(&self, gender: Gender) -> &ModelSlot {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    pub fn model_path(&self, gender: Gender) -> PathBuf {
        self.model_dir.join(gender.as_str()).join(MODEL_FILE)
    }

    pub fn metadata_path(&self, gender: Gender) -> PathBuf {
        self.model_dir.join(gender.as_str()).join(METADATA_FILE)
    }

    pub fn is_downloaded(&self, gender: Gender) -> bool {
        self.model_path(gender).exists() && self.metadata_path(gender).exists()
    }

    pub fn is_ready(&self, gender: Gender) -> bool {
        self.slot(gender).cell.initialized()
    }

    pub fn is_loading(&self, gender: Gender) -> bool {
        self.slot(gender).loading.load(Ordering::Relaxed)
    }

    pub fn last_error(&self, gender: Gender) -> Option<String> {
        self.slot(gender).last_error.lock().unwrap().clone()
    }

    pub fn status(&self, gender: Gender) -> ModelStatus {
        ModelStatus {
            downloaded: self.is_downloaded(gender),
            loading: self.is_loading(gender),
            ready: self.is_ready(gender),
            error: self.last_error(gender),
        }
    }

    /// Fetches the model pair for a demographic unless already cached.
    pub async fn download(&self, gender: Gender) -> Result<(), ClassifierError> {
        if self.is_downloaded(gender) {
            return Ok(());
        }

        let dir = self.model_dir.join(gender.as_str());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ClassifierError::Download(format!(
                "failed to create model directory {}: {e}",
                dir.display()
            ))
        })?;

        let base = self.config.base_url(gender).trim_end_matches('/').to_string();

        let metadata_path = self.metadata_path(gender);
        if !metadata_path.exists() {
            download_file(&format!("{base}/{METADATA_FILE}"), &metadata_path).await?;
        }

        let model_path = self.model_path(gender);
        if !model_path.exists() {
            download_file(&format!("{base}/{MODEL_FILE}"), &model_path).await?;
        }

        Ok(())
    }

    /// Hands out the loaded model for a demographic, downloading and
    /// loading it on first use. Concurrent callers share a single load.
    pub async fn get_or_load(&self, gender: Gender) -> Result<Arc<LoadedModel>, ClassifierError> {
        let slot = self.slot(gender);
        let loaded = slot
            .cell
            .get_or_try_init(|| async {
                slot.loading.store(true, Ordering::Relaxed);
                let result = self.load_model(gender).await;
                slot.loading.store(false, Ordering::Relaxed);
                match &result {
                    Ok(_) => *slot.last_error.lock().unwrap() = None,
                    Err(e) => *slot.last_error.lock().unwrap() = Some(e.to_string()),
                }
                result.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(loaded))
    }

    async fn load_model(&self, gender: Gender) -> Result<LoadedModel, ClassifierError> {
        self.download(gender).await?;

        let metadata_path = self.metadata_path(gender);
        let metadata_raw = tokio::fs::read_to_string(&metadata_path).await.map_err(|e| {
            ClassifierError::Metadata(format!("failed to read {}: {e}", metadata_path.display()))
        })?;
        let metadata: ModelMetadata = serde_json::from_str(&metadata_raw).map_err(|e| {
            ClassifierError::Metadata(format!("failed to parse {}: {e}", metadata_path.display()))
        })?;
        if metadata.labels.is_empty() {
            return Err(ClassifierError::Metadata(format!(
                "{} lists no labels",
                metadata_path.display()
            )));
        }

        let model_path = self.model_path(gender);
        info!(gender = %gender, path = %model_path.display(), "loading model");
        let start = Instant::now();

        let session = tokio::task::spawn_blocking(move || -> Result<Session, ClassifierError> {
            let _ = ort::init().with_name("seasoning-face").commit();

            let session = Session::builder()
                .map_err(|e| ClassifierError::Load(format!("failed to create session builder: {e}")))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| ClassifierError::Load(format!("failed to set optimization level: {e}")))?
                .with_intra_threads(4)
                .map_err(|e| ClassifierError::Load(format!("failed to set intra threads: {e}")))?
                .with_execution_providers([
                    ort::execution_providers::CPU::default().build(),
                ])
                .map_err(|e| ClassifierError::Load(format!("failed to register execution provider: {e}")))?
                .commit_from_file(&model_path)
                .map_err(|e| ClassifierError::Load(format!("failed to load ONNX model: {e}")))?;

            Ok(session)
        })
        .await
        .map_err(|e| ClassifierError::Load(format!("model loading task failed: {e}")))??;

        info!(
            gender = %gender,
            labels = metadata.labels.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "model ready"
        );

        Ok(LoadedModel {
            session: Mutex::new(session),
            labels: metadata.labels,
            version: metadata.version.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

#[async_trait]
impl ClassifierBackend for ModelManager {
    async fn classify(
        &self,
        image: &PreparedImage,
        gender: Gender,
    ) -> Result<ModelOutput, ClassifierError> {
        let model = self.get_or_load(gender).await?;
        let image = image.clone();
        // Session::run is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || inference::classify(&model, &image))
            .await
            .map_err(|e| ClassifierError::Inference(format!("inference task failed: {e}")))?
    }
}

async fn download_file(url: &str, dest: &Path) -> Result<(), ClassifierError> {
    info!(url, dest = %dest.display(), "downloading");
    let client = reqwest::Client::new();
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(ClassifierError::Download(format!(
            "failed to download {url}: HTTP {}",
            response.status()
        )));
    }

    if let Err(err) = write_body(url, dest, response).await {
        // Clean up the partial file; is_downloaded trusts bare existence.
        let _ = tokio::fs::remove_file(dest).await;
        return Err(err);
    }
    Ok(())
}

async fn write_body(
    url: &str,
    dest: &Path,
    response: reqwest::Response,
) -> Result<(), ClassifierError> {
    let total_size = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
        ClassifierError::Download(format!("failed to create file {}: {e}", dest.display()))
    })?;

    let mut stream = response.bytes_stream();
    let mut last_logged = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        downloaded += chunk.len() as u64;
        tokio::io::AsyncWriteExt::write_all(&mut file, &chunk)
            .await
            .map_err(|e| {
                ClassifierError::Download(format!("failed to write {}: {e}", dest.display()))
            })?;

        if total_size > 0 {
            let progress = (downloaded * 100) / total_size;
            // Log every 10% to keep the output readable on large models.
            if progress >= last_logged + 10 {
                debug!(url, progress, "download progress");
                last_logged = progress;
            }
        }
    }

    info!(url, bytes = downloaded, "download complete");
    Ok(())
}
