pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::{load_config, AppConfig};
pub use error::{AppError, ClassifierError, ValidationError};
pub use models::seasoning::{
    AnalysisOutcome, ClassificationScore, Gender, Language, RankedResult, SeasoningCode,
};
