use std::{net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use minijinja::Environment;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;

use crate::{
    Res, api, config, error, info,
    pipeline::Orchestrator,
    session::SessionStore,
    spotify::SpotifyClient,
    types::PkceToken,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared state of the web app.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub orchestrator: Arc<Orchestrator>,
    pub spotify: SpotifyClient,
    pub templates: Arc<Environment<'static>>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(
        orchestrator: Orchestrator,
        spotify: SpotifyClient,
        upload_dir: PathBuf,
    ) -> Res<Self> {
        Ok(AppState {
            sessions: SessionStore::new(),
            orchestrator: Arc::new(orchestrator),
            spotify,
            templates: Arc::new(templates()?),
            upload_dir,
        })
    }

    /// Replaces the session store with one evicting sessions idle for `ttl`.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = SessionStore::with_ttl(ttl);
        self
    }
}

pub fn templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("home.html", include_str!("../templates/home.html"))?;
    env.add_template("playlist.html", include_str!("../templates/playlist.html"))?;
    env.add_template("message.html", include_str!("../templates/message.html"))?;
    Ok(env)
}

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);

    Router::new()
        .route("/", get(api::home))
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/upload", post(api::upload))
        .route("/generate_playlist", get(api::generate_playlist))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Starts the web app on `SERVER_ADDRESS`.
pub async fn serve(state: AppState) -> Res<()> {
    async_fs::create_dir_all(&state.upload_dir).await?;

    let addr = SocketAddr::from_str(&config::server_addr())?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Routes of the CLI callback server.
pub fn callback_router(state: Arc<Mutex<Option<PkceToken>>>, client: SpotifyClient) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::cli_callback))
        .layer(Extension(state))
        .layer(Extension(client))
}

/// Temporary server answering the OAuth redirect of the CLI `auth` command.
pub async fn start_callback_server(state: Arc<Mutex<Option<PkceToken>>>, client: SpotifyClient) {
    let app = callback_router(state, client);

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Callback server failed: {}", e);
    }
}
