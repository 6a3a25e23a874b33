use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;

use super::{existing_session, message, render, with_session_cookie};
use crate::{pipeline::PipelineError, server::AppState, warning};

pub async fn generate_playlist(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some((id, handle)) = existing_session(&state, &headers).await else {
        return Redirect::to("/login").into_response();
    };

    // the session lock must be released before the pipeline takes it again
    let (logged_in, image_path) = {
        let session = handle.lock().await;
        let image_path = session.image.as_ref().map(|image| image.path.clone());
        (session.is_logged_in(), image_path)
    };

    if !logged_in {
        return with_session_cookie(&id, Redirect::to("/login"));
    }

    let response = match state.orchestrator.run(&handle, image_path.as_deref()).await {
        Ok(result) => render(
            &state,
            "playlist.html",
            context! {
                caption => result.caption,
                caption_degraded => result.caption_degraded,
                tracks_found => result.tracks_found,
                playlist_url => result.url,
                playlist_id => result.id,
                matches => result.matches,
            },
        ),
        Err(PipelineError::AuthRequired) => {
            return with_session_cookie(&id, Redirect::to("/login"));
        }
        Err(e @ PipelineError::NoImage) => message(&state, StatusCode::BAD_REQUEST, &e.to_string()),
        Err(e) => {
            warning!("Error in playlist creation: {}", e);
            message(&state, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    };

    with_session_cookie(&id, response)
}
