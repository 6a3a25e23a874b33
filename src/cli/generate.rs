use std::{path::PathBuf, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::sync::Mutex;

use crate::{
    config, error, info,
    management::TokenCache,
    pipeline::{PipelineError, PlaylistResult},
    session::Session,
    success,
    types::TrackMatchTableRow,
    warning,
};

/// Runs the pipeline for a local image with the token cached by `auth`.
pub async fn generate(image: PathBuf) {
    let token = match TokenCache::load().await {
        Ok(cache) => cache.into_token(),
        Err(e) => error!(
            "Failed to load token. Please run photo2playlist auth\n Error: {}",
            e
        ),
    };

    let orchestrator = config::build_orchestrator();
    let session = Mutex::new(Session::with_token("cli", token.clone()));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Building playlist for {}", image.display()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = orchestrator.run(&session, Some(image.as_path())).await;
    spinner.finish_and_clear();

    // keep a refreshed token for the next run
    let current = session.lock().await.token.clone();
    if let Some(current) = current {
        if current != token {
            if let Err(e) = TokenCache::new(current).persist().await {
                warning!("Failed to save refreshed token: {}", e);
            }
        }
    }

    match outcome {
        Ok(result) => print_result(&result),
        Err(PipelineError::AuthRequired) => {
            if let Err(e) = TokenCache::clear().await {
                warning!("Failed to clear token cache: {}", e);
            }
            error!("Authorization expired. Please run photo2playlist auth");
        }
        Err(e) => error!("{}", e),
    }
}

fn print_result(result: &PlaylistResult) {
    if result.caption_degraded {
        warning!("The image could not be described, used: {}", result.caption);
    } else {
        info!("Mood: {}", result.caption);
    }

    let rows: Vec<TrackMatchTableRow> = result
        .matches
        .iter()
        .map(|m| TrackMatchTableRow {
            song: m.query.clone(),
            track: m.uri.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows));

    match &result.url {
        Some(url) => success!("{} tracks added: {}", result.tracks_found, url),
        None => warning!("No tracks found, no playlist created."),
    }
}
