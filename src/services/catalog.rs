//! Static seasoning catalog, loaded once from the bundled configuration
//! table. Everything that needs display data, demographic eligibility or
//! model-label remapping goes through here.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::models::seasoning::{Gender, Language, SeasoningCode};

/// Model class names carry this trailing qualifier, e.g. `soy_sauce_face`.
const MODEL_LABEL_SUFFIX: &str = "_face";

#[derive(Debug, Clone, Deserialize)]
pub struct SeasoningInfo {
    pub code: SeasoningCode,
    pub name: LocalizedName,
    pub color: String,
    #[serde(rename = "descKey")]
    pub desc_key: String,
    #[serde(rename = "availableFor")]
    pub available_for: Vec<Gender>,
}

impl SeasoningInfo {
    pub fn is_available_for(&self, gender: Gender) -> bool {
        self.available_for.contains(&gender)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedName {
    pub ja: String,
    pub ko: String,
    pub en: String,
    pub zh: String,
}

impl LocalizedName {
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Ja => &self.ja,
            Language::Ko => &self.ko,
            Language::En => &self.en,
            Language::Zh => &self.zh,
        }
    }
}

static CATALOG: Lazy<Vec<SeasoningInfo>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/seasonings.json"))
        .expect("bundled seasoning catalog is valid JSON")
});

pub fn all() -> &'static [SeasoningInfo] {
    &CATALOG
}

pub fn find(code: SeasoningCode) -> Option<&'static SeasoningInfo> {
    CATALOG.iter().find(|s| s.code == code)
}

pub fn eligible_for(gender: Gender) -> impl Iterator<Item = &'static SeasoningInfo> {
    CATALOG.iter().filter(move |s| s.is_available_for(gender))
}

pub fn is_eligible(code: SeasoningCode, gender: Gender) -> bool {
    find(code).map(|s| s.is_available_for(gender)).unwrap_or(false)
}

/// Maps a raw model label onto a seasoning code.
///
/// One trailing `_face` qualifier is stripped (ASCII case-insensitive);
/// whatever remains must match a catalog code exactly. Unknown labels map
/// to `None` and are dropped by the caller, never an error.
pub fn from_model_label(label: &str) -> Option<SeasoningCode> {
    let bytes = label.as_bytes();
    let suffix = MODEL_LABEL_SUFFIX.as_bytes();
    let code = if bytes.len() >= suffix.len()
        && bytes[bytes.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    {
        // The matched tail is pure ASCII, so the boundary is safe.
        &label[..label.len() - MODEL_LABEL_SUFFIX.len()]
    } else {
        label
    };
    SeasoningCode::from_code(code)
}
