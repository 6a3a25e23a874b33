//! Photo to Playlist Library
//!
//! This library turns a single photograph into a Spotify playlist whose songs
//! match the mood of the picture. A vision model describes the photo, a chat
//! model suggests songs for the description, and the Spotify Web API resolves
//! those songs and stores them in a new playlist owned by the user.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the web front end
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - On-disk token cache used by the CLI
//! - `openai` - Caption and song suggestion providers backed by a chat model
//! - `pipeline` - The playlist generation pipeline and its provider traits
//! - `server` - Router and HTTP servers (web app and OAuth callback)
//! - `session` - Explicit per-user session state and its in-memory store
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use photo2playlist::{config, pipeline::Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> photo2playlist::Res<()> {
//!     config::load_env().await?;
//!     let orchestrator: Orchestrator = config::build_orchestrator();
//!     // Run the pipeline for a session...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod openai;
pub mod pipeline;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the glue code (CLI, server startup, configuration) where the
/// concrete error type does not matter to the caller. The pipeline itself
/// returns typed errors, see [`pipeline::PipelineError`].
///
/// # Example
///
/// ```
/// use photo2playlist::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Describing image {}", path.display());
/// info!("Got {} songs", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Playlist created: {}", url);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for unrecoverable errors in the CLI and during server startup.
/// Request handlers and the pipeline never call it; they return errors instead.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues such as a song that could not be found or a
/// caption provider that fell back to its generic description.
///
/// # Example
///
/// ```
/// warning!("Error searching for track '{}': {}", query, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
