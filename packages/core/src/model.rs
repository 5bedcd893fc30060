//! Normalized event and aggregate types shared by every pipeline stage

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One validated listening occurrence.
///
/// Invariant: after parsing, `ms_played >= 30_000`, `artist` and `track` are
/// non-empty, and the triple `(timestamp, track, artist)` is unique within a
/// parsed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub artist: String,
    pub track: String,
    pub ms_played: i64,
}

/// Aggregation over one ISO week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekBucket {
    /// (ISO year, ISO week number): identity of the bucket
    pub week_key: (i32, u32),
    /// The Monday of this ISO week
    pub week_start: NaiveDate,
    pub artist_counts: HashMap<String, u32>,
    pub track_counts: HashMap<(String, String), u32>,
    pub total_ms: i64,
}

impl WeekBucket {
    pub fn event_count(&self) -> u32 {
        self.artist_counts.values().sum()
    }
}

/// `(artist, plays)`, ordered descending by plays, ties broken lexicographically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistPlays {
    pub artist: String,
    pub plays: u32,
}

/// `(track, artist, plays)`, ordered descending by plays, ties broken by (track, artist)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPlays {
    pub track: String,
    pub artist: String,
    pub plays: u32,
}

/// A maximal run of consecutive weeks forming one musical period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Era {
    /// 1-based, assigned after significance filtering
    pub id: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Length <= 10
    pub top_artists: Vec<ArtistPlays>,
    /// Length <= 20
    pub top_tracks: Vec<TrackPlays>,
    pub total_ms_played: i64,
    /// Empty until LLM naming completes
    pub title: String,
    /// Empty until LLM naming completes
    pub summary: String,
}

impl Era {
    /// Duration in whole weeks, per the significance filter's formula
    pub fn duration_weeks(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() / 7) + 1
    }
}

/// Derivative of an Era: the same top tracks with a null URI, ready to export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub track: String,
    pub artist: String,
    pub plays: u32,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub era_id: u32,
    pub tracks: Vec<PlaylistTrack>,
}

/// Computed once from the full event list before it is discarded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_tracks: u64,
    pub total_artists: u64,
    pub total_ms: i64,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Opaque, unguessable session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The pipeline's current position, per the state machine in §4.6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Uploading,
    Parsed,
    Segmenting,
    Segmented,
    Naming,
    Named,
    Playlists,
    Complete,
    Error,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Error)
    }
}

/// A consistent `{stage, percent, message?}` snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub stage: Stage,
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Progress {
    pub fn uploading() -> Self {
        Self {
            stage: Stage::Uploading,
            percent: 0,
            message: None,
        }
    }
}

/// Per-upload workspace. Exclusively owned by the session store.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// Populated after parse, may be dropped after segmentation to free memory
    pub events: Option<Vec<Event>>,
    pub stats: Option<AggregateStats>,
    pub eras: Option<Vec<Era>>,
    pub playlists: Option<Vec<Playlist>>,
    pub progress: Progress,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    /// Guards against spawning a second pipeline worker for this session
    pub running: bool,
}

impl Session {
    pub fn new(id: SessionId, events: Vec<Event>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            events: Some(events),
            stats: None,
            eras: None,
            playlists: None,
            progress: Progress {
                stage: Stage::Parsed,
                percent: 20,
                message: None,
            },
            error_message: None,
            created_at: now,
            last_accessed_at: now,
            running: false,
        }
    }
}
