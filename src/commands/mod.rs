pub mod analyze;
pub mod model;
pub mod render;
pub mod result;
pub mod settings;

use crate::services::i18n::{self, Translator};
use crate::services::store::AppState;

/// Translator for the stored language, falling back to locale detection.
pub(crate) fn translator_for(state: &AppState) -> Translator {
    Translator::new(state.language.unwrap_or_else(i18n::detect_from_env))
}
