use crate::{config, error, server, spotify::SpotifyClient};

pub async fn serve() {
    let orchestrator = config::build_orchestrator();
    let spotify = SpotifyClient::from_env(config::http_client());

    let state = match server::AppState::new(orchestrator, spotify, config::upload_dir()) {
        Ok(state) => state.with_session_ttl(config::session_ttl()),
        Err(e) => error!("Cannot initialize web app: {}", e),
    };

    if let Err(e) = server::serve(state).await {
        error!("Server failed: {}", e);
    }
}
