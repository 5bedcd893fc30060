//! Pure, synchronous era segmentation: week bucketing, similarity-based
//! boundary detection, era assembly, and significance filtering.
//!
//! No I/O, no async: everything here is a plain function over
//! `Vec<Event>` / `Vec<WeekBucket>` / `Vec<Era>`.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use erawrapped_shared_config::SegmenterConfig;

use crate::model::{ArtistPlays, Era, Event, TrackPlays, WeekBucket};

/// Maximum number of top artists considered by the similarity function
const SIMILARITY_TOP_N: usize = 20;

/// Group events by ISO (year, week) and build a sorted list of WeekBuckets.
pub fn aggregate_weeks(events: &[Event]) -> Vec<WeekBucket> {
    let mut buckets: HashMap<(i32, u32), WeekBucket> = HashMap::new();

    for event in events {
        let iso = event.timestamp.iso_week();
        let key = (iso.year(), iso.week());

        let bucket = buckets.entry(key).or_insert_with(|| WeekBucket {
            week_key: key,
            week_start: monday_of_iso_week(iso.year(), iso.week()),
            artist_counts: HashMap::new(),
            track_counts: HashMap::new(),
            total_ms: 0,
        });

        *bucket.artist_counts.entry(event.artist.clone()).or_insert(0) += 1;
        *bucket
            .track_counts
            .entry((event.track.clone(), event.artist.clone()))
            .or_insert(0) += 1;
        bucket.total_ms += event.ms_played;
    }

    let mut result: Vec<WeekBucket> = buckets.into_values().collect();
    result.sort_by_key(|b| b.week_start);
    result
}

/// Jan 4th always falls in ISO week 1 of its year; walk back to that week's
/// Monday, then forward `iso_week - 1` weeks.
fn monday_of_iso_week(iso_year: i32, iso_week: u32) -> NaiveDate {
    let jan4 = NaiveDate::from_ymd_opt(iso_year, 1, 4).expect("valid year");
    let week1_monday = jan4 - Duration::days(jan4.weekday().num_days_from_monday() as i64);
    week1_monday + Duration::weeks(iso_week as i64 - 1)
}

/// Jaccard similarity of the top-N artist sets of two buckets.
///
/// Ties in play count are broken lexicographically by artist name to keep
/// the function deterministic. Returns 0.0 if either side has no artists,
/// or if the union of the two top-N sets is empty.
pub fn similarity(a: &WeekBucket, b: &WeekBucket) -> f64 {
    if a.artist_counts.is_empty() || b.artist_counts.is_empty() {
        return 0.0;
    }

    let n = SIMILARITY_TOP_N.min(a.artist_counts.len()).min(b.artist_counts.len());
    let sa = top_n_artists(a, n);
    let sb = top_n_artists(b, n);

    let intersection = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn top_n_artists(bucket: &WeekBucket, n: usize) -> std::collections::HashSet<String> {
    let mut pairs: Vec<(&String, &u32)> = bucket.artist_counts.iter().collect();
    pairs.sort_by(|(name_a, plays_a), (name_b, plays_b)| {
        plays_b.cmp(plays_a).then_with(|| name_a.cmp(name_b))
    });
    pairs.into_iter().take(n).map(|(name, _)| name.clone()).collect()
}

/// Detect era boundary indices in a sorted WeekBucket list.
///
/// The first index is always a boundary. A week more than `max_gap_days`
/// after its predecessor always starts a new era; otherwise a new era
/// starts when similarity to the predecessor drops below `threshold`.
pub fn detect_boundaries(weeks: &[WeekBucket], config: &SegmenterConfig) -> Vec<usize> {
    if weeks.is_empty() {
        return Vec::new();
    }

    let mut boundaries = vec![0];

    for i in 1..weeks.len() {
        let gap_days = (weeks[i].week_start - weeks[i - 1].week_start).num_days();

        if gap_days > config.max_gap_days {
            boundaries.push(i);
        } else if similarity(&weeks[i - 1], &weeks[i]) < config.similarity_threshold {
            boundaries.push(i);
        }
    }

    boundaries
}

/// Merge the weeks between consecutive boundaries into assembled eras.
/// Ids are preliminary (1-based in boundary order); `title`/`summary` are empty.
pub fn assemble_eras(weeks: &[WeekBucket], boundaries: &[usize]) -> Vec<Era> {
    let mut eras = Vec::with_capacity(boundaries.len());

    for (k, &start_idx) in boundaries.iter().enumerate() {
        let end_idx = boundaries.get(k + 1).copied().unwrap_or(weeks.len());
        let constituent = &weeks[start_idx..end_idx];
        eras.push(assemble_one_era((k + 1) as u32, constituent));
    }

    eras
}

fn assemble_one_era(id: u32, weeks: &[WeekBucket]) -> Era {
    let mut artist_counts: HashMap<String, u32> = HashMap::new();
    let mut track_counts: HashMap<(String, String), u32> = HashMap::new();
    let mut total_ms_played = 0i64;

    for week in weeks {
        for (artist, plays) in &week.artist_counts {
            *artist_counts.entry(artist.clone()).or_insert(0) += plays;
        }
        for (key, plays) in &week.track_counts {
            *track_counts.entry(key.clone()).or_insert(0) += plays;
        }
        total_ms_played += week.total_ms;
    }

    let top_artists = top_artists_ranked(&artist_counts, 10);
    let top_tracks = top_tracks_ranked(&track_counts, 20);

    let start_date = weeks.first().expect("non-empty era").week_start;
    let end_date = weeks.last().expect("non-empty era").week_start + Duration::days(6);

    Era {
        id,
        start_date,
        end_date,
        top_artists,
        top_tracks,
        total_ms_played,
        title: String::new(),
        summary: String::new(),
    }
}

fn top_artists_ranked(counts: &HashMap<String, u32>, limit: usize) -> Vec<ArtistPlays> {
    let mut pairs: Vec<(&String, &u32)> = counts.iter().collect();
    pairs.sort_by(|(name_a, plays_a), (name_b, plays_b)| {
        plays_b.cmp(plays_a).then_with(|| name_a.cmp(name_b))
    });
    pairs
        .into_iter()
        .take(limit)
        .map(|(artist, plays)| ArtistPlays {
            artist: artist.clone(),
            plays: *plays,
        })
        .collect()
}

fn top_tracks_ranked(counts: &HashMap<(String, String), u32>, limit: usize) -> Vec<TrackPlays> {
    let mut pairs: Vec<(&(String, String), &u32)> = counts.iter().collect();
    pairs.sort_by(|((track_a, artist_a), plays_a), ((track_b, artist_b), plays_b)| {
        plays_b
            .cmp(plays_a)
            .then_with(|| track_a.cmp(track_b))
            .then_with(|| artist_a.cmp(artist_b))
    });
    pairs
        .into_iter()
        .take(limit)
        .map(|((track, artist), plays)| TrackPlays {
            track: track.clone(),
            artist: artist.clone(),
            plays: *plays,
        })
        .collect()
}

/// Drop eras below `min_weeks`/`min_ms`, then renumber survivors 1..N in
/// chronological order. An empty result is not an error.
pub fn filter_significant(eras: Vec<Era>, config: &SegmenterConfig) -> Vec<Era> {
    let mut survivors: Vec<Era> = eras
        .into_iter()
        .filter(|era| era.duration_weeks() >= config.min_weeks && era.total_ms_played >= config.min_ms)
        .collect();

    survivors.sort_by_key(|e| e.start_date);
    for (i, era) in survivors.iter_mut().enumerate() {
        era.id = (i + 1) as u32;
    }

    survivors
}

/// Run the full segmentation pipeline: aggregate, detect boundaries, assemble,
/// filter. Empty input yields an empty era list.
pub fn segment(events: &[Event], config: &SegmenterConfig) -> Vec<Era> {
    let weeks = aggregate_weeks(events);
    let boundaries = detect_boundaries(&weeks, config);
    let eras = assemble_eras(&weeks, &boundaries);
    filter_significant(eras, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use erawrapped_test_utils::repeated_plays;

    fn to_events(entries: Vec<erawrapped_test_utils::RawEntry>) -> Vec<Event> {
        entries
            .into_iter()
            .filter_map(|e| {
                Some(Event {
                    timestamp: chrono::DateTime::parse_from_rfc3339(&e.ts)
                        .ok()?
                        .with_timezone(&chrono::Utc),
                    artist: e.artist?,
                    track: e.track?,
                    ms_played: e.ms_played,
                })
            })
            .collect()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate_weeks(&[]).is_empty());
        assert!(detect_boundaries(&[], &SegmenterConfig::default()).is_empty());
    }

    #[test]
    fn test_similarity_identity_and_symmetry() {
        let events = to_events(repeated_plays("2021-03-01T10:00:00Z", "A", "T", 5));
        let weeks = aggregate_weeks(&events);
        assert_eq!(weeks.len(), 1);
        assert_eq!(similarity(&weeks[0], &weeks[0]), 1.0);
    }

    #[test]
    fn test_similarity_disjoint_sets_is_zero() {
        let mut events = to_events(repeated_plays("2021-03-01T10:00:00Z", "A", "T1", 3));
        events.extend(to_events(repeated_plays("2021-03-08T10:00:00Z", "B", "T2", 3)));
        let weeks = aggregate_weeks(&events);
        assert_eq!(weeks.len(), 2);
        let sim = similarity(&weeks[0], &weeks[1]);
        assert_eq!(sim, 0.0);
        assert_eq!(sim, similarity(&weeks[1], &weeks[0]));
    }

    #[test]
    fn test_s1_tiny_happy_path() {
        let events = to_events(repeated_plays("2021-03-01T10:00:00Z", "A", "T", 3));
        let config = SegmenterConfig {
            min_weeks: 1,
            min_ms: 0,
            ..Default::default()
        };
        let eras = segment(&events, &config);
        assert_eq!(eras.len(), 1);
        assert_eq!(eras[0].id, 1);
        assert_eq!(eras[0].top_artists[0].artist, "A");
        assert_eq!(eras[0].top_artists[0].plays, 3);
    }

    #[test]
    fn test_s3_gap_split() {
        let mut events = to_events(repeated_plays("2021-01-11T10:00:00Z", "A", "T", 4)); // ISO week 2
        events.extend(to_events(repeated_plays("2021-03-01T10:00:00Z", "A", "T2", 4))); // ISO week 9
        let config = SegmenterConfig {
            min_weeks: 1,
            min_ms: 0,
            ..Default::default()
        };
        let eras = segment(&events, &config);
        assert_eq!(eras.len(), 2);
    }

    #[test]
    fn test_s4_similarity_split() {
        let mut events = Vec::new();
        for artist in ["A", "B", "C", "D", "E"] {
            events.extend(to_events(repeated_plays(
                "2021-03-01T10:00:00Z",
                artist,
                "T",
                2,
            )));
        }
        for artist in ["F", "G", "H", "I", "J"] {
            events.extend(to_events(repeated_plays(
                "2021-03-08T10:00:00Z",
                artist,
                "T",
                2,
            )));
        }

        let config = SegmenterConfig {
            min_weeks: 1,
            min_ms: 0,
            ..Default::default()
        };
        let eras = segment(&events, &config);
        assert_eq!(eras.len(), 2);
    }

    #[test]
    fn test_s5_insignificance_filter() {
        // one era: 1 week, 30 min listening (should be dropped: both too short and too few weeks)
        let short = to_events(vec![erawrapped_test_utils::RawEntry::new(
            "2021-01-04T10:00:00Z",
            "A",
            "T",
            30 * 60_000,
        )]);
        // one era: 4 weeks, well over an hour total (should survive)
        let mut long = Vec::new();
        for ts in [
            "2021-02-01T10:00:00Z",
            "2021-02-08T10:00:00Z",
            "2021-02-15T10:00:00Z",
            "2021-02-22T10:00:00Z",
        ] {
            long.extend(to_events(repeated_plays(ts, "B", "T", 16)));
        }

        let mut events = short;
        events.extend(long);

        let config = SegmenterConfig::default();
        let eras = segment(&events, &config);
        assert_eq!(eras.len(), 1);
        assert_eq!(eras[0].id, 1);
    }

    #[test]
    fn test_era_ids_sequential_and_chronological() {
        let mut events = to_events(repeated_plays("2021-01-11T10:00:00Z", "A", "T", 4));
        events.extend(to_events(repeated_plays("2021-03-01T10:00:00Z", "B", "T2", 4)));
        let config = SegmenterConfig {
            min_weeks: 1,
            min_ms: 0,
            ..Default::default()
        };
        let eras = segment(&events, &config);
        let ids: Vec<u32> = eras.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=ids.len() as u32).collect::<Vec<_>>());
        for pair in eras.windows(2) {
            assert!(pair[0].start_date <= pair[1].start_date);
        }
    }
}
