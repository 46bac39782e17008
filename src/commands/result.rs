//! Display of the stored result, including adopting one from a share link.

use tracing::{info, warn};

use crate::commands::render;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::seasoning::AnalysisOutcome;
use crate::services::share;
use crate::services::store::StateStore;

/// Version tag on outcomes that arrived through a share link rather than
/// a local analysis.
const SHARED_MODEL_VERSION: &str = "shared";

pub fn run(config: &AppConfig, link: Option<&str>) -> Result<(), AppError> {
    let store = StateStore::new(&config.data_dir);
    let mut state = store.load();
    let t = super::translator_for(&state);

    if let Some(link) = link {
        let adopted = share::parse_share_url(link)
            .and_then(|ranked| AnalysisOutcome::new(ranked, SHARED_MODEL_VERSION));
        match adopted {
            Some(outcome) => {
                info!(best = %outcome.best.code, "result imported from share link");
                state.set_outcome(Some(outcome));
                store.save(&state)?;
            }
            None => {
                warn!(link, "share link carried no usable result");
                println!("{}", t.t("result.none"));
                return Ok(());
            }
        }
    }

    match &state.outcome {
        Some(outcome) => {
            println!("{}", render::result_card(&t, outcome));
            println!();
            println!("{}", render::share_line(&t, outcome));
            println!(
                "{}: {}",
                t.t("share.link"),
                share::share_url(&config.share_origin, &outcome.ranked)
            );
        }
        None => println!("{}", t.t("result.none")),
    }
    Ok(())
}
