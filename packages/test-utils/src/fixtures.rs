//! Builders for synthetic extended-streaming-history JSON payloads
//!
//! Shared by the parser, segmenter and pipeline test suites so each doesn't
//! hand-roll its own JSON literals.

use serde_json::{json, Value};

/// One raw streaming-history entry before parsing
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub ts: String,
    pub artist: Option<String>,
    pub track: Option<String>,
    pub ms_played: i64,
    pub uri: Option<String>,
}

impl RawEntry {
    /// A valid entry at the given RFC3339 timestamp
    pub fn new(ts: &str, artist: &str, track: &str, ms_played: i64) -> Self {
        Self {
            ts: ts.to_string(),
            artist: Some(artist.to_string()),
            track: Some(track.to_string()),
            ms_played,
            uri: Some(format!("spotify:track:{track}")),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "ts": self.ts,
            "master_metadata_track_name": self.track,
            "master_metadata_album_artist_name": self.artist,
            "ms_played": self.ms_played,
            "spotify_track_uri": self.uri,
        })
    }
}

/// Serialize a list of raw entries as the JSON array the parser expects
pub fn streaming_history_json(entries: &[RawEntry]) -> String {
    let arr: Vec<Value> = entries.iter().map(RawEntry::to_json).collect();
    serde_json::to_string(&Value::Array(arr)).unwrap()
}

/// Build `count` plays of `artist`/`track` one minute apart, starting at `start_ts`
pub fn repeated_plays(start_ts: &str, artist: &str, track: &str, count: usize) -> Vec<RawEntry> {
    let start = chrono::DateTime::parse_from_rfc3339(start_ts)
        .expect("valid RFC3339 timestamp")
        .with_timezone(&chrono::Utc);

    (0..count)
        .map(|i| {
            let ts = start + chrono::Duration::minutes(i as i64);
            RawEntry::new(&ts.to_rfc3339(), artist, track, 60_000)
        })
        .collect()
}
