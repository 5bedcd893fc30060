//! Pipeline driver: the sequence of steps that runs once per `/process`
//! trigger, spawned as its own `tokio::task` so distinct sessions' pipelines
//! run concurrently while one session's own steps stay sequential.

use erawrapped_llm_client::LlmClient;
use erawrapped_shared_config::SegmenterConfig;
use tracing::{error, info};

use crate::model::{Progress, Session, SessionId, Stage};
use crate::naming::name_all_eras;
use crate::playlist::build_playlists;
use crate::segmenter::segment;
use crate::session::SessionStore;
use crate::stats::compute as compute_stats;

/// Run the full pipeline for `session_id`: stats, segmentation, naming,
/// playlist building. Every transition writes through to the session store
/// so SSE readers observe a consistent snapshot at each step. Any failure
/// along the way lands the session in the terminal `error` stage.
pub async fn run<C: LlmClient + ?Sized>(
    store: &SessionStore,
    session_id: SessionId,
    segmenter_config: &SegmenterConfig,
    llm_client: &C,
) {
    let events = match store
        .with_session_mut(session_id, |session| session.events.clone())
        .await
    {
        Some(Some(events)) => events,
        Some(None) => {
            fail(store, session_id, "session has no parsed events").await;
            return;
        }
        None => {
            error!(%session_id, "pipeline triggered for unknown session");
            return;
        }
    };

    info!(%session_id, event_count = events.len(), "pipeline started");

    let stats = compute_stats(&events);

    let eras = segment(&events, segmenter_config);
    if eras.is_empty() {
        fail(store, session_id, "No distinct eras found").await;
        return;
    }

    info!(%session_id, era_count = eras.len(), "segmentation complete");

    store
        .with_session_mut(session_id, |session| {
            session.stats = Some(stats);
            session.eras = Some(eras.clone());
            // Reclaim memory: the raw event list is no longer needed past this point.
            session.events = None;
            set_progress(session, Stage::Segmented, 40, None);
        })
        .await;

    let named_eras = name_all_eras(eras, llm_client, |percent| async move {
        store
            .with_session_mut(session_id, |session| {
                set_progress(session, Stage::Naming, percent, None);
            })
            .await;
    })
    .await;

    store
        .with_session_mut(session_id, |session| {
            session.eras = Some(named_eras.clone());
            set_progress(session, Stage::Named, 70, None);
        })
        .await;

    info!(%session_id, "naming complete");

    let playlists = build_playlists(&named_eras);

    store
        .with_session_mut(session_id, |session| {
            set_progress(session, Stage::Playlists, 80, None);
            session.playlists = Some(playlists);
            set_progress(session, Stage::Complete, 100, None);
        })
        .await;

    info!(%session_id, "pipeline complete");
}

async fn fail(store: &SessionStore, session_id: SessionId, message: &str) {
    error!(%session_id, reason = message, "pipeline failed");
    store
        .with_session_mut(session_id, |session| {
            session.error_message = Some(message.to_string());
            set_progress(session, Stage::Error, session.progress.percent, Some(message.to_string()));
        })
        .await;
}

/// Apply a progress transition, forcing `percent` monotonically non-decreasing.
fn set_progress(session: &mut Session, stage: Stage, percent: u8, message: Option<String>) {
    let percent = percent.max(session.progress.percent);
    session.progress = Progress {
        stage,
        percent,
        message,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use erawrapped_llm_client::LlmResult;
    use erawrapped_test_utils::repeated_plays;

    fn to_events(entries: Vec<erawrapped_test_utils::RawEntry>) -> Vec<crate::model::Event> {
        entries
            .into_iter()
            .map(|e| crate::model::Event {
                timestamp: chrono::DateTime::parse_from_rfc3339(&e.ts)
                    .unwrap()
                    .with_timezone(&chrono::Utc),
                artist: e.artist.unwrap(),
                track: e.track.unwrap(),
                ms_played: e.ms_played,
            })
            .collect()
    }

    struct StaticLlmClient;

    #[async_trait]
    impl LlmClient for StaticLlmClient {
        async fn chat(&self, _prompt: &str) -> LlmResult<String> {
            Ok(r#"{"title": "Repeat Listens", "summary": "A short stretch spent entirely on one artist and one track, over and over."}"#.to_string())
        }
        async fn health_check(&self) -> LlmResult<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_pipeline_reaches_complete_with_sufficient_eras() {
        let store = SessionStore::new();
        let events = to_events(repeated_plays("2021-03-01T10:00:00Z", "A", "T", 120));
        let id = store.create(events).await;

        let config = SegmenterConfig {
            min_weeks: 1,
            min_ms: 0,
            ..Default::default()
        };

        run(&store, id, &config, &StaticLlmClient).await;

        let snapshot = store.get_snapshot(id).await.unwrap();
        assert_eq!(snapshot.progress.stage, Stage::Complete);
        assert_eq!(snapshot.progress.percent, 100);
        assert!(snapshot.events.is_none());
        assert!(snapshot.eras.unwrap()[0].title == "Repeat Listens");
        assert!(!snapshot.playlists.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_errors_when_no_eras_found() {
        let store = SessionStore::new();
        // A single, very short play: filtered out entirely by the significance filter.
        let events = to_events(repeated_plays("2021-03-01T10:00:00Z", "A", "T", 1));
        let id = store.create(events).await;

        run(&store, id, &SegmenterConfig::default(), &StaticLlmClient).await;

        let snapshot = store.get_snapshot(id).await.unwrap();
        assert_eq!(snapshot.progress.stage, Stage::Error);
        assert_eq!(
            snapshot.error_message.as_deref(),
            Some("No distinct eras found")
        );
    }

    #[tokio::test]
    async fn test_pipeline_unknown_session_is_noop() {
        let store = SessionStore::new();
        run(&store, SessionId::new(), &SegmenterConfig::default(), &StaticLlmClient).await;
        assert_eq!(store.len().await, 0);
    }
}
