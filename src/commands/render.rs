//! Text rendering of an analysis outcome.

use crate::models::seasoning::{AnalysisOutcome, SeasoningCode};
use crate::services::catalog;
use crate::services::i18n::Translator;
use crate::services::ranking;

const BAR_WIDTH: usize = 20;

/// The result card: best match with its description, then the top-three
/// mix as bars, then the model version.
pub fn result_card(t: &Translator, outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();

    out.push_str(&t.t("result.top"));
    out.push('\n');

    let best = &outcome.best;
    out.push_str(&format!(
        "★ {} ({}%)\n",
        display_name(t, best.code),
        ranking::percentage_of(best.probability)
    ));
    if let Some(info) = catalog::find(best.code) {
        out.push_str(&format!("  {}\n", t.t(&info.desc_key)));
    }

    out.push('\n');
    out.push_str(&t.t("result.mix"));
    out.push('\n');
    for score in &outcome.ranked {
        let percent = ranking::percentage_of(score.probability);
        let filled = BAR_WIDTH * percent as usize / 100;
        out.push_str(&format!(
            "  {:<10} {:>3}% {}{}\n",
            display_name(t, score.code),
            percent,
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled)
        ));
    }

    out.push_str(&format!(
        "\n{}: {}",
        t.t("footer.version"),
        outcome.model_version
    ));
    out
}

/// The one-liner meant for pasting next to the share link.
pub fn share_line(t: &Translator, outcome: &AnalysisOutcome) -> String {
    let best = &outcome.best;
    let percent = ranking::percentage_of(best.probability).to_string();
    t.t_with(
        "share.text",
        &[("name", display_name(t, best.code).as_str()), ("percent", &percent)],
    )
}

fn display_name(t: &Translator, code: SeasoningCode) -> String {
    catalog::find(code)
        .map(|info| info.name.get(t.language()).to_string())
        .unwrap_or_else(|| code.as_str().to_string())
}
