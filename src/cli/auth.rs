use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config,
    spotify::{self, SpotifyClient},
    types::PkceToken,
};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let client = SpotifyClient::from_env(config::http_client());
    spotify::auth::auth(shared_state, client).await;
}
