//! Read endpoints over a completed (or in-progress) session
//!
//! All three handlers share the same readiness gate: 404 if the session id
//! is unknown, 425 `NotReady` if the pipeline hasn't reached `complete` yet.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use erawrapped_core::{DateRange, Era, Session, SessionId, Stage};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total_eras: usize,
    pub date_range: DateRange,
    pub total_listening_time_ms: i64,
    pub total_tracks: u64,
    pub total_artists: u64,
}

#[derive(Debug, Serialize)]
pub struct EraArtistSummary {
    pub name: String,
    pub plays: u32,
}

#[derive(Debug, Serialize)]
pub struct EraSummary {
    pub id: u32,
    pub title: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub top_artists: Vec<EraArtistSummary>,
    pub playlist_track_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PlaylistTrackResponse {
    pub track_name: String,
    pub artist_name: String,
    pub play_count: u32,
    pub uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub era_id: u32,
    pub tracks: Vec<PlaylistTrackResponse>,
}

#[derive(Debug, Serialize)]
pub struct EraDetailResponse {
    pub id: u32,
    pub title: String,
    pub summary: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub total_ms_played: i64,
    pub top_artists: Vec<erawrapped_core::ArtistPlays>,
    pub top_tracks: Vec<erawrapped_core::TrackPlays>,
    pub playlist: Option<PlaylistResponse>,
}

fn parse_session_id(raw: &str) -> ApiResult<SessionId> {
    SessionId::from_str(raw).map_err(|_| ApiError::ValidationError("invalid session id".to_string()))
}

async fn load_ready_session(state: &AppState, session_id: SessionId) -> ApiResult<Session> {
    let session = state
        .sessions
        .get_snapshot(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound("unknown session".to_string()))?;

    if session.progress.stage == Stage::Error {
        return Err(ApiError::FailedProcessing(
            session
                .error_message
                .clone()
                .unwrap_or_else(|| "processing failed".to_string()),
        ));
    }

    if session.progress.stage != Stage::Complete {
        return Err(ApiError::NotReady {
            stage: stage_name(session.progress.stage),
        });
    }

    Ok(session)
}

fn stage_name(stage: Stage) -> String {
    serde_json::to_value(stage)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let session_id = parse_session_id(&session_id)?;
    let session = load_ready_session(&state, session_id).await?;

    let stats = session
        .stats
        .ok_or_else(|| ApiError::Internal("completed session missing stats".to_string()))?;
    let eras = session
        .eras
        .ok_or_else(|| ApiError::Internal("completed session missing eras".to_string()))?;

    Ok(Json(SummaryResponse {
        total_eras: eras.len(),
        date_range: stats.date_range,
        total_listening_time_ms: stats.total_ms,
        total_tracks: stats.total_tracks,
        total_artists: stats.total_artists,
    }))
}

fn era_to_summary(era: &Era, playlist_track_count: usize) -> EraSummary {
    EraSummary {
        id: era.id,
        title: era.title.clone(),
        start_date: era.start_date,
        end_date: era.end_date,
        top_artists: era
            .top_artists
            .iter()
            .take(3)
            .map(|a| EraArtistSummary {
                name: a.artist.clone(),
                plays: a.plays,
            })
            .collect(),
        playlist_track_count,
    }
}

pub async fn eras(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<EraSummary>>> {
    let session_id = parse_session_id(&session_id)?;
    let session = load_ready_session(&state, session_id).await?;

    let eras = session
        .eras
        .ok_or_else(|| ApiError::Internal("completed session missing eras".to_string()))?;
    let playlists = session.playlists.unwrap_or_default();

    let mut summaries: Vec<EraSummary> = eras
        .iter()
        .map(|era| {
            let track_count = playlists
                .iter()
                .find(|p| p.era_id == era.id)
                .map(|p| p.tracks.len())
                .unwrap_or(0);
            era_to_summary(era, track_count)
        })
        .collect();

    summaries.sort_by_key(|e| e.start_date);

    Ok(Json(summaries))
}

pub async fn era_detail(
    State(state): State<AppState>,
    Path((session_id, era_id)): Path<(String, String)>,
) -> ApiResult<Json<EraDetailResponse>> {
    let session_id = parse_session_id(&session_id)?;
    let era_id: u32 = era_id
        .parse()
        .map_err(|_| ApiError::ValidationError("invalid era id".to_string()))?;

    let session = load_ready_session(&state, session_id).await?;

    let eras = session
        .eras
        .ok_or_else(|| ApiError::Internal("completed session missing eras".to_string()))?;
    let era = eras
        .into_iter()
        .find(|e| e.id == era_id)
        .ok_or_else(|| ApiError::NotFound("unknown era".to_string()))?;

    let playlist = session
        .playlists
        .unwrap_or_default()
        .into_iter()
        .find(|p| p.era_id == era_id)
        .map(|p| PlaylistResponse {
            era_id: p.era_id,
            tracks: p
                .tracks
                .into_iter()
                .map(|t| PlaylistTrackResponse {
                    track_name: t.track,
                    artist_name: t.artist,
                    play_count: t.plays,
                    uri: t.uri,
                })
                .collect(),
        });

    Ok(Json(EraDetailResponse {
        id: era.id,
        title: era.title,
        summary: era.summary,
        start_date: era.start_date,
        end_date: era.end_date,
        total_ms_played: era.total_ms_played,
        top_artists: era.top_artists,
        top_tracks: era.top_tracks,
        playlist,
    }))
}
