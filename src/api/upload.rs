use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{Redirect, Response},
};
use uuid::Uuid;

use super::{current_session, discard_image, message, with_session_cookie};
use crate::{info, server::AppState, session::UploadedImage, utils, warning};

/// Stores the multipart field `image` in the upload directory and remembers
/// it in the session. A new upload replaces the previous one, whose file is
/// deleted.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let (id, handle) = current_session(&state, &headers).await;

    let mut image = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("image") => {
                let name = utils::sanitize_filename(field.file_name().unwrap_or("image"));
                match field.bytes().await {
                    Ok(bytes) => image = Some((name, bytes)),
                    Err(e) => {
                        warning!("Failed to read upload: {}", e);
                        return with_session_cookie(
                            &id,
                            message(&state, StatusCode::BAD_REQUEST, "Upload failed."),
                        );
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                warning!("Malformed upload: {}", e);
                let page = message(&state, StatusCode::BAD_REQUEST, "Upload failed.");
                return with_session_cookie(&id, page);
            }
        }
    }

    let Some((name, bytes)) = image.filter(|(_, bytes)| !bytes.is_empty()) else {
        let page = message(&state, StatusCode::BAD_REQUEST, "No image in upload.");
        return with_session_cookie(&id, page);
    };

    let filename = format!("{}-{}", Uuid::new_v4().simple(), name);
    let path = state.upload_dir.join(&filename);

    let stored = async {
        async_fs::create_dir_all(&state.upload_dir).await?;
        async_fs::write(&path, &bytes).await
    }
    .await;

    if let Err(e) = stored {
        warning!("Failed to store upload {}: {}", path.display(), e);
        return with_session_cookie(
            &id,
            message(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not store the image.",
            ),
        );
    }

    info!("Image saved to: {}", path.display());
    let previous = handle
        .lock()
        .await
        .image
        .replace(UploadedImage { path, filename });
    discard_image(previous).await;

    with_session_cookie(&id, Redirect::to("/"))
}
