use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, Redirect, Response},
};
use tokio::sync::Mutex;

use super::{current_session, discard_image, existing_session, message, with_session_cookie};
use crate::{
    server::AppState, session::session_id_from_headers, spotify::SpotifyClient, success,
    types::PkceToken, utils, warning,
};

/// Starts the PKCE login: remembers a fresh verifier in the session and
/// redirects to Spotify.
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, handle) = current_session(&state, &headers).await;

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = match state.spotify.authorize_url(&code_challenge) {
        Ok(url) => url,
        Err(e) => {
            warning!("Cannot build authorization url: {}", e);
            return with_session_cookie(
                &id,
                message(&state, StatusCode::INTERNAL_SERVER_ERROR, "Login is misconfigured."),
            );
        }
    };

    handle.lock().await.code_verifier = Some(code_verifier);
    with_session_cookie(&id, Redirect::to(&auth_url))
}

/// OAuth redirect target of the web app. Stores the token in the session and
/// continues with playlist generation.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(code) = params.get("code") else {
        let reason = params.get("error").map(String::as_str).unwrap_or("missing code");
        warning!("Login rejected: {}", reason);
        return message(&state, StatusCode::BAD_REQUEST, "Login failed.");
    };

    // only a session that went through /login holds a verifier
    let Some((id, handle)) = existing_session(&state, &headers).await else {
        return message(&state, StatusCode::BAD_REQUEST, "Missing PKCE code verifier.");
    };

    let mut session = handle.lock().await;
    let Some(verifier) = session.code_verifier.take() else {
        let page = message(&state, StatusCode::BAD_REQUEST, "Missing PKCE code verifier.");
        return with_session_cookie(&id, page);
    };

    match state.spotify.exchange_code_pkce(code, &verifier).await {
        Ok(token) => {
            session.token = Some(token);
            success!("Session {} logged in", id);
            with_session_cookie(&id, Redirect::to("/generate_playlist"))
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            with_session_cookie(&id, message(&state, StatusCode::BAD_GATEWAY, "Login failed."))
        }
    }
}

/// Forgets the session, including its token, and deletes its uploaded image.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(id) = session_id_from_headers(&headers) {
        if let Some(handle) = state.sessions.remove(&id).await {
            let image = {
                let mut session = handle.lock().await;
                let image = session.image.take();
                session.clear();
                image
            };
            discard_image(image).await;
        }
    }

    Redirect::to("/")
}

/// OAuth redirect target of the CLI `auth` command.
pub async fn cli_callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PkceToken>>>>,
    Extension(client): Extension<SpotifyClient>,
) -> Html<&'static str> {
    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut state = shared_state.lock().await;
    let Some(pkce_state) = state.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    let verifier = pkce_state.code_verifier.clone();
    match client.exchange_code_pkce(code, &verifier).await {
        Ok(token) => {
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
