//! Era naming: prompt construction, LLM invocation, response validation and
//! deterministic fallback. Depends only on the `LlmClient` trait so a mock
//! implementation can stand in for tests.

use erawrapped_llm_client::LlmClient;
use serde::Deserialize;
use tracing::{info, warn};

use crate::model::Era;

const CLICHE_TITLES: &[&str] = &[
    "musical journey",
    "sonic journey",
    "a journey through music",
    "musical odyssey",
];

#[derive(Debug, Deserialize)]
struct NamingCandidate {
    title: String,
    summary: String,
}

struct NamedEra {
    title: String,
    summary: String,
}

/// Build the deterministic era-naming prompt.
fn build_prompt(era: &Era) -> String {
    let date_range = format_date_range(era);
    let duration = format_duration(era.duration_weeks());
    let hours = era.total_ms_played as f64 / 3_600_000.0;

    let top_artists: String = era
        .top_artists
        .iter()
        .take(5)
        .map(|a| format!("- {} ({} plays)", a.artist, a.plays))
        .collect::<Vec<_>>()
        .join("\n");

    let top_tracks: String = era
        .top_tracks
        .iter()
        .take(10)
        .map(|t| format!("- {} by {} ({} plays)", t.track, t.artist, t.plays))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are naming a distinct period (\"era\") of someone's music listening history.\n\n\
        Period: {date_range} ({duration})\n\
        Total listening time: {hours:.1} hours\n\n\
        Top artists:\n{top_artists}\n\n\
        Top tracks:\n{top_tracks}\n\n\
        Respond with a JSON object with exactly two keys:\n\
        - \"title\": 2-5 evocative words capturing this period. Avoid clichés like \"Musical Journey\".\n\
        - \"summary\": 2-3 sentences describing the era's listening character.\n\n\
        Output ONLY the JSON object, no other text."
    )
}

fn format_date_range(era: &Era) -> String {
    format!(
        "{} – {}",
        era.start_date.format("%B %Y"),
        era.end_date.format("%B %Y")
    )
}

fn format_duration(weeks: i64) -> String {
    if weeks < 8 {
        format!("{weeks} weeks")
    } else {
        let months = (weeks as f64 / 4.345).round() as i64;
        format!("{months} months")
    }
}

/// Parse the model's raw content into a candidate title/summary, attempting
/// strict JSON decode first, then a greedy first-`{...}` extraction.
fn parse_response(content: &str) -> Option<NamingCandidate> {
    if let Ok(candidate) = serde_json::from_str::<NamingCandidate>(content) {
        return Some(candidate);
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }

    serde_json::from_str::<NamingCandidate>(&content[start..=end]).ok()
}

/// Clean and validate a candidate, returning `None` if it fails validation.
fn clean_candidate(candidate: NamingCandidate) -> Option<NamedEra> {
    let title = clean_title(&candidate.title)?;
    let summary = clean_summary(&candidate.summary)?;
    Some(NamedEra { title, summary })
}

fn clean_title(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .replace(['\n', '\r'], " ");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return None;
    }

    Some(truncate_chars(cleaned, 50))
}

fn clean_summary(raw: &str) -> Option<String> {
    let dequoted = raw.trim().trim_matches(|c: char| c == '"' || c == '\'');
    let collapsed = dequoted.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() < 20 {
        return None;
    }

    Some(truncate_chars(&collapsed, 500))
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Deterministic fallback, built entirely from the era's own data. Must never fail.
fn fallback(era: &Era) -> NamedEra {
    let title = format!(
        "Era {}: {}",
        era.id,
        era.start_date.format("%B %Y")
    );

    let summary = match era.top_artists.first() {
        Some(top) => format!(
            "A {} period featuring {} and more.",
            format_duration(era.duration_weeks()),
            top.artist
        ),
        None => format!(
            "A {} period of listening.",
            format_duration(era.duration_weeks())
        ),
    };

    NamedEra { title, summary }
}

fn is_cliche(title: &str) -> bool {
    let lower = title.to_lowercase();
    CLICHE_TITLES.iter().any(|c| lower == *c)
}

/// Name a single era, calling the LLM once and falling back on any failure
/// (transport error, malformed response, or a clichéd/invalid candidate).
async fn name_era<C: LlmClient + ?Sized>(era: &Era, client: &C) -> NamedEra {
    let prompt = build_prompt(era);

    let content = match client.chat(&prompt).await {
        Ok(content) => content,
        Err(err) => {
            warn!(era_id = era.id, error = %err, "LLM call failed, using fallback era name");
            return fallback(era);
        }
    };

    match parse_response(&content).and_then(clean_candidate) {
        Some(named) if !is_cliche(&named.title) => named,
        Some(_) => {
            warn!(era_id = era.id, "LLM returned a clichéd title, using fallback era name");
            fallback(era)
        }
        None => {
            warn!(era_id = era.id, "LLM response failed validation, using fallback era name");
            fallback(era)
        }
    }
}

/// Name every era sequentially, reporting progress linearly mapped into
/// `[40, 70]`. A per-era failure is caught and replaced with the fallback;
/// processing always continues to completion.
pub async fn name_all_eras<C, F, Fut>(mut eras: Vec<Era>, client: &C, mut on_progress: F) -> Vec<Era>
where
    C: LlmClient + ?Sized,
    F: FnMut(u8) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let total = eras.len();

    for (i, era) in eras.iter_mut().enumerate() {
        let named = name_era(era, client).await;
        era.title = named.title;
        era.summary = named.summary;

        info!(era_id = era.id, title = %era.title, "named era");

        let percent = progress_for(i + 1, total);
        on_progress(percent).await;
    }

    eras
}

/// Map `completed / total` linearly into the `[40, 70]` band.
fn progress_for(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 70;
    }
    let fraction = completed as f64 / total as f64;
    (40.0 + fraction * 30.0).round() as u8
}
