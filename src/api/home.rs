use axum::{extract::State, http::HeaderMap, response::Response};
use minijinja::context;

use super::{existing_session, render, with_session_cookie};
use crate::server::AppState;

/// Upload form. Renders anonymously, without creating a session, until the
/// visitor uploads or logs in.
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some((id, handle)) = existing_session(&state, &headers).await else {
        let ctx = context! { image_url => None::<String>, logged_in => false };
        return render(&state, "home.html", ctx);
    };

    let (image_url, logged_in) = {
        let session = handle.lock().await;
        let image_url = session
            .image
            .as_ref()
            .map(|image| format!("/uploads/{}", image.filename));
        (image_url, session.is_logged_in())
    };

    let page = render(
        &state,
        "home.html",
        context! { image_url => image_url, logged_in => logged_in },
    );
    with_session_cookie(&id, page)
}
