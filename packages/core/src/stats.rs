//! Single-pass aggregate statistics over the full parsed event list, computed
//! once before the events are handed to the segmenter (and possibly dropped).

use std::collections::HashSet;

use chrono::Datelike;

use crate::model::{AggregateStats, DateRange, Event};

/// Compute totals and the inclusive local date range spanned by `events`.
///
/// `events` must be non-empty; the pipeline only calls this after a
/// successful parse, which guarantees at least one event.
pub fn compute(events: &[Event]) -> AggregateStats {
    let mut tracks: HashSet<(&str, &str)> = HashSet::new();
    let mut artists: HashSet<&str> = HashSet::new();
    let mut total_ms = 0i64;

    let mut min_date = events[0].timestamp.date_naive();
    let mut max_date = min_date;

    for event in events {
        tracks.insert((event.track.as_str(), event.artist.as_str()));
        artists.insert(event.artist.as_str());
        total_ms += event.ms_played;

        let date = event.timestamp.date_naive();
        if date < min_date {
            min_date = date;
        }
        if date > max_date {
            max_date = date;
        }
    }

    AggregateStats {
        total_tracks: tracks.len() as u64,
        total_artists: artists.len() as u64,
        total_ms,
        date_range: DateRange {
            start: min_date,
            end: max_date,
        },
    }
}
