use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::seasoning::Gender;

const DEFAULT_SHARE_ORIGIN: &str = "https://seasoningface.app";
const DEFAULT_MODEL_URL_MALE: &str = "https://models.seasoningface.app/v1/male/";
const DEFAULT_MODEL_URL_FEMALE: &str = "https://models.seasoningface.app/v1/female/";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root for everything the app writes: model cache and the state record.
    pub data_dir: PathBuf,
    /// Origin used when building share links, e.g. `https://seasoningface.app`.
    pub share_origin: String,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub male_base_url: String,
    pub female_base_url: String,
}

impl ModelConfig {
    pub fn base_url(&self, gender: Gender) -> &str {
        match gender {
            Gender::Male => &self.male_base_url,
            Gender::Female => &self.female_base_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no usable data directory; set SEASONING_FACE_DATA_DIR")]
    NoDataDir,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let data_dir = env::var("SEASONING_FACE_DATA_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("seasoning-face")))
            .ok_or(ConfigError::NoDataDir)?;

        let share_origin = env::var("SEASONING_FACE_SHARE_ORIGIN")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SHARE_ORIGIN.to_string());

        let model = ModelConfig {
            male_base_url: env::var("SEASONING_FACE_MODEL_URL_MALE")
                .unwrap_or_else(|_| DEFAULT_MODEL_URL_MALE.to_string()),
            female_base_url: env::var("SEASONING_FACE_MODEL_URL_FEMALE")
                .unwrap_or_else(|_| DEFAULT_MODEL_URL_FEMALE.to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        Ok(Self {
            data_dir,
            share_origin,
            model,
            logging,
        })
    }
}
