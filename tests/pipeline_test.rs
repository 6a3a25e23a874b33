mod common;

use std::path::Path;

use common::*;
use photo2playlist::{
    pipeline::{Caption, MAX_SONG_QUERIES, PipelineError},
    session::Session,
};
use tokio::sync::Mutex;

fn logged_in_session() -> Mutex<Session> {
    Mutex::new(Session::with_token("test", valid_token()))
}

#[tokio::test]
async fn test_end_to_end_two_of_three_resolved() {
    let h = harness(
        Caption::new("a calm sunset over water"),
        FixedSongs::new(&["Sunset - A", "Water - B", "Unknown - C"]),
        MockSearch::new(&[
            ("Sunset - A", SearchOutcome::Found("spotify:track:T1")),
            ("Water - B", SearchOutcome::Found("spotify:track:T2")),
            ("Unknown - C", SearchOutcome::NotFound),
        ]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = logged_in_session();

    let result = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap();

    assert_eq!(
        result.url.as_deref(),
        Some("https://open.spotify.com/playlist/P1")
    );
    assert_eq!(result.id.as_deref(), Some("P1"));
    assert_eq!(result.tracks_found, 2);
    assert_eq!(result.caption, "a calm sunset over water");
    assert!(!result.caption_degraded);

    assert_eq!(
        h.playlists.added_uris(),
        vec!["spotify:track:T1", "spotify:track:T2"]
    );
    let created = h.playlists.created.lock().unwrap().clone();
    assert_eq!(
        created,
        vec![(
            "user-1".to_string(),
            "Photo2Playlist: a calm sunset over water".to_string()
        )]
    );
    assert_eq!(result.matches.len(), 3);
    assert_eq!(result.matches[2].uri, None);
}

#[tokio::test]
async fn test_zero_matches_skips_playlist_creation() {
    let h = harness(
        Caption::new("empty room"),
        FixedSongs::new(&["A - X", "B - Y"]),
        MockSearch::new(&[("B - Y", SearchOutcome::Fails)]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = logged_in_session();

    let result = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap();

    assert_eq!(result.tracks_found, 0);
    assert_eq!(result.url, None);
    assert_eq!(result.id, None);
    assert_eq!(h.playlists.create_calls(), 0);
    assert!(h.playlists.added_uris().is_empty());
}

#[tokio::test]
async fn test_duplicate_matches_are_added_once() {
    let h = harness(
        Caption::new("party"),
        FixedSongs::new(&["A - X", "B - Y", "A - X"]),
        MockSearch::new(&[
            ("A - X", SearchOutcome::Found("spotify:track:T1")),
            ("B - Y", SearchOutcome::Found("spotify:track:T1")),
        ]),
        MockPlaylists::new("https://open.spotify.com/playlist/P9"),
    );
    let image = image_file();
    let session = logged_in_session();

    let result = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap();

    assert_eq!(result.tracks_found, 1);
    assert_eq!(h.playlists.added_uris(), vec!["spotify:track:T1"]);
    assert_eq!(
        result.matches.iter().filter(|m| m.is_resolved()).count(),
        3
    );
}

#[tokio::test]
async fn test_song_list_is_truncated() {
    let songs: Vec<String> = (0..35).map(|i| format!("Song {i} - Artist {i}")).collect();
    let song_refs: Vec<&str> = songs.iter().map(String::as_str).collect();

    let h = harness(
        Caption::new("crowded street"),
        FixedSongs::new(&song_refs),
        MockSearch::new(&[]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = logged_in_session();

    let result = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap();

    assert_eq!(h.search.query_count(), MAX_SONG_QUERIES);
    assert_eq!(result.matches.len(), MAX_SONG_QUERIES);
    assert_eq!(result.matches[0].query, "Song 0 - Artist 0");
    assert_eq!(result.matches[19].query, "Song 19 - Artist 19");
    assert!(result.tracks_found <= MAX_SONG_QUERIES);
}

#[tokio::test]
async fn test_missing_image_fails_before_auth() {
    let h = harness(
        Caption::new("unused"),
        FixedSongs::new(&["A - X"]),
        MockSearch::new(&[]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let session = Mutex::new(Session::with_token("test", expired_token()));

    let err = h.orchestrator.run(&session, None).await.unwrap_err();
    assert!(matches!(err, PipelineError::NoImage));

    let err = h
        .orchestrator
        .run(&session, Some(Path::new("/definitely/not/here.jpg")))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoImage));

    assert_eq!(h.oauth.calls(), 0);
    assert_eq!(h.search.query_count(), 0);
}

#[tokio::test]
async fn test_no_token_requires_auth() {
    let h = harness(
        Caption::new("unused"),
        FixedSongs::new(&["A - X"]),
        MockSearch::new(&[]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = Mutex::new(Session::new("anonymous"));

    let err = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::AuthRequired));
    assert_eq!(h.search.query_count(), 0);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_search() {
    let h = harness(
        Caption::new("forest"),
        FixedSongs::new(&["A - X"]),
        MockSearch::new(&[("A - X", SearchOutcome::Found("spotify:track:T1"))]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = Mutex::new(Session::with_token("test", expired_token()));

    h.orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap();

    assert_eq!(h.oauth.calls(), 1);
    let tokens = h.search.tokens.lock().unwrap().clone();
    assert_eq!(tokens, vec!["access-refreshed-1"]);
}

#[tokio::test]
async fn test_refresh_failure_stops_pipeline() {
    let h = harness_with_oauth(
        MockOAuth::failing(),
        Caption::new("forest"),
        FixedSongs::new(&["A - X"]),
        MockSearch::new(&[]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = Mutex::new(Session::with_token("test", expired_token()));

    let err = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::AuthRequired));
    assert!(session.lock().await.token.is_none());
    assert_eq!(h.search.query_count(), 0);
}

#[tokio::test]
async fn test_playlist_creation_failure_is_fatal() {
    let mut playlists = MockPlaylists::new("https://open.spotify.com/playlist/P1");
    playlists.fail_create = true;

    let h = harness(
        Caption::new("rain"),
        FixedSongs::new(&["A - X"]),
        MockSearch::new(&[("A - X", SearchOutcome::Found("spotify:track:T1"))]),
        playlists,
    );
    let image = image_file();
    let session = logged_in_session();

    let err = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap_err();

    match err {
        PipelineError::PlaylistCreation(msg) => assert!(msg.contains("403")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.playlists.create_calls(), 1);
}

#[tokio::test]
async fn test_user_lookup_failure_is_playlist_creation_error() {
    let mut playlists = MockPlaylists::new("https://open.spotify.com/playlist/P1");
    playlists.fail_user = true;

    let h = harness(
        Caption::new("rain"),
        FixedSongs::new(&["A - X"]),
        MockSearch::new(&[("A - X", SearchOutcome::Found("spotify:track:T1"))]),
        playlists,
    );
    let image = image_file();
    let session = logged_in_session();

    let err = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::PlaylistCreation(_)));
    assert_eq!(h.playlists.create_calls(), 0);
}

#[tokio::test]
async fn test_song_suggestion_failure_is_fatal() {
    let mut songs = FixedSongs::new(&[]);
    songs.fail = true;

    let h = harness(
        Caption::new("rain"),
        songs,
        MockSearch::new(&[]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = logged_in_session();

    let err = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::SongSuggestion(_)));
    assert_eq!(h.search.query_count(), 0);
}

#[tokio::test]
async fn test_degraded_caption_flows_through() {
    let h = harness(
        Caption::fallback("a peaceful everyday scene"),
        FixedSongs::new(&["A - X"]),
        MockSearch::new(&[("A - X", SearchOutcome::Found("spotify:track:T1"))]),
        MockPlaylists::new("https://open.spotify.com/playlist/P1"),
    );
    let image = image_file();
    let session = logged_in_session();

    let result = h
        .orchestrator
        .run(&session, Some(image.path()))
        .await
        .unwrap();

    assert!(result.caption_degraded);
    assert_eq!(result.caption, "a peaceful everyday scene");
    assert_eq!(result.tracks_found, 1);
}
