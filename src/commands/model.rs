//! Model cache maintenance: status and explicit prefetch.
//!
//! Analysis downloads on demand, so neither command is required before
//! `analyze`; prefetching just moves the wait to a convenient time.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::seasoning::Gender;
use crate::services::classifier::model_manager::ModelManager;

pub fn status(config: &AppConfig, gender: Option<Gender>) -> Result<(), AppError> {
    let manager = ModelManager::new(&config.data_dir, config.model.clone());
    for gender in selected(gender) {
        let status = manager.status(gender);
        println!(
            "{gender}: downloaded={} ready={} error={}",
            status.downloaded,
            status.ready,
            status.error.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn download(config: &AppConfig, gender: Option<Gender>) -> Result<(), AppError> {
    let manager = ModelManager::new(&config.data_dir, config.model.clone());
    for gender in selected(gender) {
        manager.download(gender).await?;
        println!("{gender}: cached at {}", manager.model_path(gender).display());
    }
    Ok(())
}

fn selected(gender: Option<Gender>) -> Vec<Gender> {
    match gender {
        Some(g) => vec![g],
        None => vec![Gender::Male, Gender::Female],
    }
}
