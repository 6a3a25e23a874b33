//! # API Module
//!
//! HTTP handlers of the Photo2Playlist web front end. The handlers are thin
//! glue: they resolve the caller's session from its cookie, hand the session
//! and the uploaded image to the [`Orchestrator`](crate::pipeline::Orchestrator)
//! and render the outcome.
//!
//! ## Endpoints
//!
//! - [`home`] - upload form, preview of the uploaded image, login state
//! - [`upload`] - stores the uploaded image and remembers it in the session
//! - [`login`] / [`callback`] - OAuth 2.0 PKCE login with Spotify
//! - [`generate_playlist`] - runs the pipeline and renders the playlist
//! - [`logout`] - forgets the session
//! - [`health`] - status and version for monitoring
//!
//! [`cli_callback`] serves the temporary callback server of the CLI `auth`
//! command and is not part of the web app's router.
//!
//! ## Sessions
//!
//! Sessions are created only by the routes that store something in them,
//! [`upload`] and [`login`]; the other routes look the cookie up and treat an
//! unknown one as anonymous. Sessions idle for longer than the store's TTL are
//! evicted, and an uploaded image is deleted as soon as no session refers to
//! it any more.

mod auth;
mod generate;
mod health;
mod home;
mod upload;

pub use auth::{callback, cli_callback, login, logout};
pub use generate::generate_playlist;
pub use health::health;
pub use home::home;
pub use upload::upload;

use axum::{
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use minijinja::{Value, context};

use crate::{
    server::AppState,
    session::{SessionHandle, UploadedImage, session_cookie, session_id_from_headers},
    warning,
};

/// The caller's session, if its cookie names a live one.
async fn existing_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Option<(String, SessionHandle)> {
    let id = session_id_from_headers(headers)?;
    let handle = state.sessions.get(&id).await?;
    Some((id, handle))
}

/// The caller's session, created when missing. Creating a session first
/// evicts idle ones together with their uploaded images.
async fn current_session(state: &AppState, headers: &HeaderMap) -> (String, SessionHandle) {
    if let Some(found) = existing_session(state, headers).await {
        return found;
    }

    for handle in state.sessions.evict_idle().await {
        let image = handle.lock().await.image.take();
        discard_image(image).await;
    }

    state.sessions.get_or_create(None).await
}

/// Deletes an uploaded image that is no longer referenced.
async fn discard_image(image: Option<UploadedImage>) {
    let Some(image) = image else {
        return;
    };

    match async_fs::remove_file(&image.path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warning!("Failed to remove {}: {}", image.path.display(), e),
    }
}

fn with_session_cookie(id: &str, response: impl IntoResponse) -> Response {
    ([(header::SET_COOKIE, session_cookie(id))], response).into_response()
}

fn render(state: &AppState, name: &str, ctx: Value) -> Response {
    let rendered = state
        .templates
        .get_template(name)
        .and_then(|template| template.render(ctx));

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warning!("Failed to render {}: {}", name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn message(state: &AppState, status: StatusCode, text: &str) -> Response {
    let mut response = render(state, "message.html", context! { message => text });
    if response.status().is_success() {
        *response.status_mut() = status;
    }
    response
}
