//! The end-to-end quiz: validate, normalize, classify, persist, print.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::commands::render;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::seasoning::{Gender, Language};
use crate::services::classifier::engine::AnalysisEngine;
use crate::services::classifier::model_manager::ModelManager;
use crate::services::image_processor;
use crate::services::share;
use crate::services::store::StateStore;

pub async fn run(
    config: &AppConfig,
    photo: &Path,
    gender: Option<Gender>,
    lang: Option<Language>,
) -> Result<(), AppError> {
    let store = StateStore::new(&config.data_dir);
    let mut state = store.load();
    if let Some(gender) = gender {
        state.set_gender(gender);
    }
    if let Some(lang) = lang {
        state.set_language(lang);
    }

    let mime = image_processor::mime_for_path(photo);
    let size = tokio::fs::metadata(photo).await?.len();
    info!(file = %photo.display(), size, mime = %mime, "upload received");

    if let Err(err) = image_processor::validate_upload(size, &mime) {
        error!(kind = err.kind(), error = %err, "upload rejected");
        return Err(err.into());
    }

    let bytes = tokio::fs::read(photo).await?;
    let prepared = image_processor::prepare_image(&bytes)?;
    info!(
        width = prepared.width,
        height = prepared.height,
        bytes = prepared.jpeg.len(),
        "photo normalized"
    );
    state.set_pending_image(Some(prepared.clone()));

    let manager = ModelManager::new(&config.data_dir, config.model.clone());
    let engine = AnalysisEngine::new(Arc::new(manager));
    let outcome = engine.analyze(&prepared, state.gender).await;

    state.set_outcome(Some(outcome.clone()));
    store.save(&state)?;

    let t = super::translator_for(&state);
    println!("{}", render::result_card(&t, &outcome));
    println!();
    println!("{}", render::share_line(&t, &outcome));
    println!(
        "{}: {}",
        t.t("share.link"),
        share::share_url(&config.share_origin, &outcome.ranked)
    );
    Ok(())
}
