//! Event model, parser, segmenter, era naming, playlist builder, session
//! store and pipeline driver for erawrapped.
//!
//! This crate is pure business logic: no HTTP, no process wiring. The
//! `erawrapped-api` binary owns the axum router and composes these pieces
//! per request.

mod error;
mod model;
mod naming;
mod parser;
mod pipeline;
mod playlist;
mod segmenter;
mod session;
mod stats;

pub use error::{ParseError, PipelineError, SegmentError};
pub use model::{
    AggregateStats, ArtistPlays, DateRange, Era, Event, Playlist, PlaylistTrack, Progress,
    Session, SessionId, Stage, TrackPlays, WeekBucket,
};
pub use parser::{parse, UploadKind};
pub use pipeline::run as run_pipeline;
pub use playlist::build_playlists;
pub use segmenter::segment;
pub use session::SessionStore;
pub use stats::compute as compute_stats;
