//! Persistent preferences: language, gender, and a summary view.

use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::seasoning::{Gender, Language};
use crate::services::i18n::Translator;
use crate::services::share;
use crate::services::store::StateStore;

pub fn set_language(config: &AppConfig, language: Language) -> Result<(), AppError> {
    let store = StateStore::new(&config.data_dir);
    let mut state = store.load();
    let previous = state.language;
    state.set_language(language);
    store.save(&state)?;

    info!(
        from = previous.map(|l| l.as_str()).unwrap_or("auto"),
        to = %language,
        "language changed"
    );
    println!("{}", Translator::new(language).t("app.title"));
    Ok(())
}

pub fn set_gender(config: &AppConfig, gender: Gender) -> Result<(), AppError> {
    let store = StateStore::new(&config.data_dir);
    let mut state = store.load();
    state.set_gender(gender);
    store.save(&state)?;

    info!(gender = %gender, "gender selected");
    let t = super::translator_for(&state);
    println!("{}: {}", t.t("gender.select"), t.t(&format!("gender.{gender}")));
    Ok(())
}

pub fn show(config: &AppConfig) -> Result<(), AppError> {
    let store = StateStore::new(&config.data_dir);
    let state = store.load();

    let language = state
        .language
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| "auto".to_string());
    println!("language: {language}");
    println!("gender:   {}", state.gender);
    match &state.outcome {
        Some(outcome) => println!("result:   {}", share::encode(&outcome.ranked)),
        None => println!("result:   -"),
    }
    println!("storage:  {}", store.path().display());
    Ok(())
}
