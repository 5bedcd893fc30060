//! Playlist builder: a pure projection from eras to playlists.

use crate::model::{Era, Playlist, PlaylistTrack};

/// For each era, emit a Playlist whose tracks mirror `era.top_tracks` with a
/// null URI. No I/O, no failure modes.
pub fn build_playlists(eras: &[Era]) -> Vec<Playlist> {
    eras.iter()
        .map(|era| Playlist {
            era_id: era.id,
            tracks: era
                .top_tracks
                .iter()
                .map(|t| PlaylistTrack {
                    track: t.track.clone(),
                    artist: t.artist.clone(),
                    plays: t.plays,
                    uri: None,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackPlays;
    use chrono::NaiveDate;

    fn era_with_tracks(id: u32, tracks: Vec<TrackPlays>) -> Era {
        Era {
            id,
            start_date: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
            top_artists: Vec::new(),
            top_tracks: tracks,
            total_ms_played: 0,
            title: String::new(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_playlist_mirrors_top_tracks_with_null_uri() {
        let era = era_with_tracks(
            1,
            vec![TrackPlays {
                track: "Idioteque".to_string(),
                artist: "Radiohead".to_string(),
                plays: 12,
            }],
        );

        let playlists = build_playlists(&[era]);
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].era_id, 1);
        assert_eq!(playlists[0].tracks[0].track, "Idioteque");
        assert_eq!(playlists[0].tracks[0].uri, None);
    }

    #[test]
    fn test_empty_eras_yields_empty_playlists() {
        assert!(build_playlists(&[]).is_empty());
    }

    #[test]
    fn test_one_playlist_per_era_same_order() {
        let eras = vec![era_with_tracks(1, vec![]), era_with_tracks(2, vec![])];
        let playlists = build_playlists(&eras);
        assert_eq!(playlists.iter().map(|p| p.era_id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
