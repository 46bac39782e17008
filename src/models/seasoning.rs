use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The nine seasoning categories the classifier can assign.
///
/// The set is closed and known at build time; display data (names, color,
/// eligibility) lives in the bundled catalog, keyed by this code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasoningCode {
    SoySauce,
    Miso,
    Salt,
    Sugar,
    Vinegar,
    Sauce,
    Mayo,
    Ketchup,
    Olive,
}

impl SeasoningCode {
    pub const ALL: [SeasoningCode; 9] = [
        SeasoningCode::SoySauce,
        SeasoningCode::Miso,
        SeasoningCode::Salt,
        SeasoningCode::Sugar,
        SeasoningCode::Vinegar,
        SeasoningCode::Sauce,
        SeasoningCode::Mayo,
        SeasoningCode::Ketchup,
        SeasoningCode::Olive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeasoningCode::SoySauce => "soy_sauce",
            SeasoningCode::Miso => "miso",
            SeasoningCode::Salt => "salt",
            SeasoningCode::Sugar => "sugar",
            SeasoningCode::Vinegar => "vinegar",
            SeasoningCode::Sauce => "sauce",
            SeasoningCode::Mayo => "mayo",
            SeasoningCode::Ketchup => "ketchup",
            SeasoningCode::Olive => "olive",
        }
    }

    pub fn from_code(code: &str) -> Option<SeasoningCode> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for SeasoningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary demographic selector. Chooses both the eligible category subset
/// and the classifier endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender `{other}` (expected male or female)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ja,
    Ko,
    En,
    Zh,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Ja, Language::Ko, Language::En, Language::Zh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Self::ALL.iter().copied().find(|l| l.as_str() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(&s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown language `{s}` (expected ja, ko, en or zh)"))
    }
}

/// One (category, probability) pair after remapping model output onto the
/// seasoning vocabulary. Probabilities from the real model need not sum to 1
/// once ineligible and unmapped labels are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScore {
    pub code: SeasoningCode,
    pub probability: f64,
}

impl ClassificationScore {
    pub fn new(code: SeasoningCode, probability: f64) -> Self {
        Self { code, probability }
    }
}

/// Top scores in presentation order, at most three entries.
///
/// Produced sorted-descending by `ranking::rank`; share-link decoding keeps
/// the encoded order as-is, so ordering is the producer's contract rather
/// than a type invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedResult(Vec<ClassificationScore>);

impl RankedResult {
    pub const MAX_ENTRIES: usize = 3;

    /// Wraps the given scores, truncating to the first three.
    pub fn new(mut entries: Vec<ClassificationScore>) -> Self {
        entries.truncate(Self::MAX_ENTRIES);
        Self(entries)
    }

    pub fn entries(&self) -> &[ClassificationScore] {
        &self.0
    }

    pub fn best(&self) -> Option<&ClassificationScore> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassificationScore> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a ClassificationScore;
    type IntoIter = std::slice::Iter<'a, ClassificationScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The persisted result of one completed analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub best: ClassificationScore,
    pub ranked: RankedResult,
    pub produced_at: DateTime<Utc>,
    pub model_version: String,
}

impl AnalysisOutcome {
    /// Builds an outcome from a non-empty ranked result; `best` is always
    /// the first ranked entry.
    pub fn new(ranked: RankedResult, model_version: impl Into<String>) -> Option<Self> {
        let best = *ranked.best()?;
        Some(Self {
            best,
            ranked,
            produced_at: Utc::now(),
            model_version: model_version.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasoning_code_round_trips_through_str() {
        for code in SeasoningCode::ALL {
            assert_eq!(SeasoningCode::from_code(code.as_str()), Some(code));
        }
        assert_eq!(SeasoningCode::from_code("wasabi"), None);
    }

    #[test]
    fn seasoning_code_serde_uses_snake_case() {
        let json = serde_json::to_string(&SeasoningCode::SoySauce).unwrap();
        assert_eq!(json, "\"soy_sauce\"");
        let back: SeasoningCode = serde_json::from_str("\"olive\"").unwrap();
        assert_eq!(back, SeasoningCode::Olive);
    }

    #[test]
    fn gender_defaults_to_male() {
        assert_eq!(Gender::default(), Gender::Male);
    }

    #[test]
    fn ranked_result_truncates_to_three() {
        let scores: Vec<ClassificationScore> = SeasoningCode::ALL
            .iter()
            .map(|&code| ClassificationScore::new(code, 0.1))
            .collect();
        let ranked = RankedResult::new(scores);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn outcome_best_matches_first_ranked_entry() {
        let ranked = RankedResult::new(vec![
            ClassificationScore::new(SeasoningCode::Miso, 0.6),
            ClassificationScore::new(SeasoningCode::Salt, 0.4),
        ]);
        let outcome = AnalysisOutcome::new(ranked, "1.2.0").unwrap();
        assert_eq!(outcome.best.code, SeasoningCode::Miso);
        assert_eq!(outcome.best, outcome.ranked.entries()[0]);
    }

    #[test]
    fn outcome_requires_at_least_one_entry() {
        assert!(AnalysisOutcome::new(RankedResult::new(Vec::new()), "1.2.0").is_none());
    }
}
