//! The full analysis: classify, remap onto the seasoning vocabulary,
//! rank, and package the outcome.
//!
//! Analysis always answers. A classifier that cannot download, load or
//! run is not the user's problem; the engine falls back to synthetic
//! scores and the quiz carries on.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};

use crate::models::classify_types::ModelOutput;
use crate::models::image_types::PreparedImage;
use crate::models::seasoning::{
    AnalysisOutcome, ClassificationScore, Gender, RankedResult, SeasoningCode,
};
use crate::services::catalog;
use crate::services::classifier::ClassifierBackend;
use crate::services::ranking;

/// Version recorded on outcomes the synthetic fallback produced. Mirrors
/// the app version so the result card reads the same either way; only the
/// operator log distinguishes the paths.
pub const FALLBACK_MODEL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AnalysisEngine {
    backend: Arc<dyn ClassifierBackend>,
}

impl AnalysisEngine {
    pub fn new(backend: Arc<dyn ClassifierBackend>) -> Self {
        Self { backend }
    }

    /// Analyzes a prepared photo for the selected demographic.
    pub async fn analyze(&self, image: &PreparedImage, gender: Gender) -> AnalysisOutcome {
        let start = Instant::now();
        info!(
            gender = %gender,
            width = image.width,
            height = image.height,
            "analysis started"
        );

        let (scores, model_version) = match self.backend.classify(image, gender).await {
            Ok(output) => {
                let scores = remap(&output, gender);
                if scores.is_empty() {
                    warn!(gender = %gender, "no model label mapped to a seasoning, using synthetic scores");
                    (synthetic_scores(gender), FALLBACK_MODEL_VERSION.to_string())
                } else {
                    (scores, output.model_version)
                }
            }
            Err(err) => {
                warn!(gender = %gender, error = %err, "classifier unavailable, using synthetic scores");
                (synthetic_scores(gender), FALLBACK_MODEL_VERSION.to_string())
            }
        };

        let outcome = build_outcome(&scores, model_version);
        info!(
            gender = %gender,
            best = %outcome.best.code,
            model_version = %outcome.model_version,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis finished"
        );
        outcome
    }
}

fn build_outcome(scores: &[ClassificationScore], model_version: String) -> AnalysisOutcome {
    let ranked = normalize(ranking::rank(scores));
    match AnalysisOutcome::new(ranked, model_version.clone()) {
        Some(outcome) => outcome,
        // Both score sources guarantee at least one entry; answer uniformly
        // over the first three categories if that ever stops holding.
        None => {
            let uniform = 1.0 / RankedResult::MAX_ENTRIES as f64;
            let entries: Vec<ClassificationScore> = SeasoningCode::ALL
                .iter()
                .take(RankedResult::MAX_ENTRIES)
                .map(|&code| ClassificationScore::new(code, uniform))
                .collect();
            AnalysisOutcome {
                best: ClassificationScore::new(SeasoningCode::ALL[0], uniform),
                ranked: RankedResult::new(entries),
                produced_at: Utc::now(),
                model_version,
            }
        }
    }
}

/// Projects raw model output onto the seasoning vocabulary. Labels with no
/// mapping and categories not offered for the demographic are dropped.
fn remap(output: &ModelOutput, gender: Gender) -> Vec<ClassificationScore> {
    output
        .predictions
        .iter()
        .filter_map(|p| {
            let code = catalog::from_model_label(&p.label)?;
            if !catalog::is_eligible(code, gender) {
                return None;
            }
            Some(ClassificationScore::new(code, f64::from(p.probability)))
        })
        .collect()
}

/// Uniform-random stand-in scores over the eligible categories, rescaled
/// to sum to 1.
fn synthetic_scores(gender: Gender) -> Vec<ClassificationScore> {
    let codes: Vec<SeasoningCode> = catalog::eligible_for(gender).map(|s| s.code).collect();
    let codes = if codes.is_empty() {
        SeasoningCode::ALL.to_vec()
    } else {
        codes
    };

    let mut rng = rand::thread_rng();
    let raws: Vec<f64> = codes.iter().map(|_| rng.gen::<f64>()).collect();
    let total: f64 = raws.iter().sum();

    codes
        .iter()
        .zip(raws)
        .map(|(&code, raw)| {
            let probability = if total > 0.0 {
                raw / total
            } else {
                1.0 / codes.len() as f64
            };
            ClassificationScore::new(code, probability)
        })
        .collect()
}

/// Rescales the retained entries so their probabilities sum to 1; the
/// percentages shown describe shares of what is listed, not of the whole
/// label space.
fn normalize(ranked: RankedResult) -> RankedResult {
    let total: f64 = ranked.iter().map(|s| s.probability).sum();
    let entries = ranked
        .iter()
        .map(|s| {
            let probability = if total > 0.0 {
                s.probability / total
            } else {
                1.0 / ranked.len() as f64
            };
            ClassificationScore::new(s.code, probability)
        })
        .collect();
    RankedResult::new(entries)
}
