//! Compact text codec for shareable results.
//!
//! A ranking serializes to `code:percent` entries joined by commas, e.g.
//! `soy_sauce:42,miso:31,salt:27`, carried in the `r` query parameter of a
//! share link. Decoding is lenient: entries that fail to parse are dropped
//! and only a fully unusable payload yields `None`.

use url::Url;

use crate::models::seasoning::{ClassificationScore, RankedResult, SeasoningCode};
use crate::services::ranking::percentage_of;

pub const RESULT_PATH: &str = "/result";
pub const QUERY_PARAM: &str = "r";

const ENTRY_SEPARATOR: char = ',';
const FIELD_SEPARATOR: char = ':';

pub fn encode(ranked: &RankedResult) -> String {
    ranked
        .iter()
        .map(|s| {
            format!(
                "{}{}{}",
                s.code.as_str(),
                FIELD_SEPARATOR,
                percentage_of(s.probability)
            )
        })
        .collect::<Vec<_>>()
        .join(&ENTRY_SEPARATOR.to_string())
}

/// Decodes a `code:percent` list back into a ranking.
///
/// Malformed entries, unknown codes and percentages outside `0..=100` are
/// skipped; surviving entries keep their encoded order and are capped at
/// the usual top three. Returns `None` when nothing survives.
pub fn decode(encoded: &str) -> Option<RankedResult> {
    let mut entries = Vec::new();
    for part in encoded.split(ENTRY_SEPARATOR) {
        if entries.len() == RankedResult::MAX_ENTRIES {
            break;
        }
        let Some((code, percent)) = part.split_once(FIELD_SEPARATOR) else {
            continue;
        };
        let Some(code) = SeasoningCode::from_code(code) else {
            continue;
        };
        let Ok(percent) = percent.parse::<u8>() else {
            continue;
        };
        if percent > 100 {
            continue;
        }
        entries.push(ClassificationScore {
            code,
            probability: f64::from(percent) / 100.0,
        });
    }
    if entries.is_empty() {
        None
    } else {
        Some(RankedResult::new(entries))
    }
}

/// Builds the full share link for a ranking.
pub fn share_url(origin: &str, ranked: &RankedResult) -> String {
    format!(
        "{}{}?{}={}",
        origin.trim_end_matches('/'),
        RESULT_PATH,
        QUERY_PARAM,
        encode(ranked)
    )
}

/// Extracts a ranking from a pasted share link.
///
/// Accepts a full URL, a bare query string (`?r=...` or `r=...`) or just
/// the encoded payload itself.
pub fn parse_share_url(link: &str) -> Option<RankedResult> {
    if let Ok(url) = Url::parse(link) {
        if matches!(url.scheme(), "http" | "https") {
            return url
                .query_pairs()
                .find(|(key, _)| key == QUERY_PARAM)
                .and_then(|(_, value)| decode(&value));
        }
    }
    let trimmed = link.trim_start_matches('?');
    decode(trimmed.strip_prefix("r=").unwrap_or(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(entries: &[(SeasoningCode, f64)]) -> RankedResult {
        RankedResult::new(
            entries
                .iter()
                .map(|&(code, probability)| ClassificationScore { code, probability })
                .collect(),
        )
    }

    #[test]
    fn encode_joins_code_percent_pairs() {
        let result = ranked(&[
            (SeasoningCode::SoySauce, 0.42),
            (SeasoningCode::Miso, 0.31),
            (SeasoningCode::Salt, 0.27),
        ]);
        assert_eq!(encode(&result), "soy_sauce:42,miso:31,salt:27");
    }

    #[test]
    fn decode_round_trips_encoded_percentages() {
        let original = ranked(&[
            (SeasoningCode::Vinegar, 0.55),
            (SeasoningCode::Ketchup, 0.30),
            (SeasoningCode::Olive, 0.15),
        ]);
        let decoded = decode(&encode(&original)).unwrap();
        assert_eq!(decoded.len(), original.len());
        for (a, b) in decoded.iter().zip(original.iter()) {
            assert_eq!(a.code, b.code);
            assert_eq!(percentage_of(a.probability), percentage_of(b.probability));
        }
    }

    #[test]
    fn decode_drops_unrecognized_entries() {
        let decoded = decode("soy_sauce:50,bogus:30,miso:20").unwrap();
        let codes: Vec<_> = decoded.iter().map(|s| s.code).collect();
        assert_eq!(codes, vec![SeasoningCode::SoySauce, SeasoningCode::Miso]);
    }

    #[test]
    fn decode_drops_bad_percentages() {
        let decoded = decode("salt:abc,sugar:150,mayo:-5,sauce:61").unwrap();
        let codes: Vec<_> = decoded.iter().map(|s| s.code).collect();
        assert_eq!(codes, vec![SeasoningCode::Sauce]);
    }

    #[test]
    fn decode_caps_at_three_entries() {
        let decoded = decode("soy_sauce:40,miso:30,salt:20,sugar:10").unwrap();
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn decode_of_garbage_is_none() {
        assert!(decode("").is_none());
        assert!(decode("not a payload").is_none());
        assert!(decode(":,::,").is_none());
    }

    #[test]
    fn share_url_has_result_path_and_query() {
        let result = ranked(&[(SeasoningCode::Miso, 0.8), (SeasoningCode::Salt, 0.2)]);
        assert_eq!(
            share_url("https://seasoningface.app", &result),
            "https://seasoningface.app/result?r=miso:80,salt:20"
        );
        // Trailing slash on the origin collapses.
        assert_eq!(
            share_url("https://seasoningface.app/", &result),
            "https://seasoningface.app/result?r=miso:80,salt:20"
        );
    }

    #[test]
    fn parse_share_url_accepts_url_query_and_payload() {
        for link in [
            "https://seasoningface.app/result?r=soy_sauce:42,miso:31,salt:27",
            "?r=soy_sauce:42,miso:31,salt:27",
            "r=soy_sauce:42,miso:31,salt:27",
            "soy_sauce:42,miso:31,salt:27",
        ] {
            let decoded = parse_share_url(link).unwrap_or_else(|| panic!("failed on {link}"));
            assert_eq!(decoded.best().unwrap().code, SeasoningCode::SoySauce);
            assert_eq!(decoded.len(), 3);
        }
    }

    #[test]
    fn parse_share_url_without_payload_is_none() {
        assert!(parse_share_url("https://seasoningface.app/result").is_none());
        assert!(parse_share_url("https://seasoningface.app/result?x=1").is_none());
    }
}
