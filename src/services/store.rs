//! Application state and its on-disk record.
//!
//! State changes only through the named transition methods, so every
//! mutation site reads the same way and the persistence boundary stays
//! obvious: language, gender and the last outcome survive restarts, the
//! pending image never does.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::image_types::PreparedImage;
use crate::models::seasoning::{AnalysisOutcome, Gender, Language};

pub const STORAGE_FILE: &str = "seasoning-face-storage.json";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub language: Option<Language>,
    pub gender: Gender,
    pub pending_image: Option<PreparedImage>,
    pub outcome: Option<AnalysisOutcome>,
}

impl AppState {
    pub fn set_language(&mut self, language: Language) {
        self.language = Some(language);
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
    }

    pub fn set_pending_image(&mut self, image: Option<PreparedImage>) {
        self.pending_image = image;
    }

    pub fn set_outcome(&mut self, outcome: Option<AnalysisOutcome>) {
        self.outcome = outcome;
    }

    /// Resets the analysis, keeping language and gender.
    pub fn clear(&mut self) {
        self.pending_image = None;
        self.outcome = None;
    }
}

/// The subset of [`AppState`] that goes to disk.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    language: Option<Language>,
    #[serde(default)]
    gender: Gender,
    #[serde(default)]
    outcome: Option<AnalysisOutcome>,
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted record. A missing file, unreadable JSON or a
    /// foreign schema all load as defaults; the record carries no version
    /// marker to migrate on.
    pub fn load(&self) -> AppState {
        let persisted = fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<PersistedState>(&raw).ok())
            .unwrap_or_default();
        AppState {
            language: persisted.language,
            gender: persisted.gender,
            pending_image: None,
            outcome: persisted.outcome,
        }
    }

    pub fn save(&self, state: &AppState) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let record = PersistedState {
            language: state.language,
            gender: state.gender,
            outcome: state.outcome.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, json)
    }
}
