//! Message tables and locale detection.
//!
//! Translations are bundled at compile time, one JSON table per supported
//! language, and looked up by dotted key (`share.text`). A missing key
//! resolves to the key itself so a stale caller degrades visibly rather
//! than panicking.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::seasoning::Language;

static TABLES: Lazy<HashMap<Language, Value>> = Lazy::new(|| {
    HashMap::from([
        (Language::Ja, parse_table(include_str!("../../data/i18n/ja.json"))),
        (Language::Ko, parse_table(include_str!("../../data/i18n/ko.json"))),
        (Language::En, parse_table(include_str!("../../data/i18n/en.json"))),
        (Language::Zh, parse_table(include_str!("../../data/i18n/zh.json"))),
    ])
});

fn parse_table(raw: &str) -> Value {
    serde_json::from_str(raw).expect("bundled i18n table is valid JSON")
}

/// Picks a supported language for a locale string such as `ja`, `en-US`
/// or `zh_TW.UTF-8`.
///
/// Any Chinese variant maps to `zh`; otherwise the primary subtag decides
/// and anything unsupported falls back to Japanese, the app's home locale.
pub fn detect_language(locale: &str) -> Language {
    let normalized = locale.trim().to_ascii_lowercase().replace('_', "-");
    if normalized.starts_with("zh") {
        return Language::Zh;
    }
    let primary = normalized
        .split(['-', '.'])
        .next()
        .unwrap_or_default();
    Language::from_code(primary).unwrap_or(Language::Ja)
}

/// Locale detection from the process environment, `LC_ALL` over `LANG`.
pub fn detect_from_env() -> Language {
    let locale = std::env::var("LC_ALL")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var("LANG").ok().filter(|v| !v.is_empty()))
        .unwrap_or_default();
    detect_language(&locale)
}

#[derive(Debug, Clone, Copy)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Resolves a dotted key against this language's table.
    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }

    /// Like [`t`](Self::t), substituting `{{name}}`-style placeholders.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut text = self.t(key);
        for (name, value) in params {
            text = text.replace(&format!("{{{{{name}}}}}"), value);
        }
        text
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let mut node = TABLES.get(&self.language)?;
        for part in key.split('.') {
            node = node.get(part)?;
        }
        node.as_str().map(str::to_string)
    }
}
