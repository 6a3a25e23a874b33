//! # CLI Module
//!
//! Command implementations of the `photo2playlist` binary.
//!
//! - [`auth`] - Spotify login from the terminal (OAuth 2.0 PKCE); the token is
//!   cached in the local data directory
//! - [`generate`] - runs the playlist pipeline for a local image with the
//!   cached token and prints the matches
//! - [`serve`] - starts the web app
//!
//! ## Usage Patterns
//!
//! ```bash
//! photo2playlist auth                    # Authenticate with Spotify
//! photo2playlist generate beach.jpg      # Build a playlist for a photo
//! photo2playlist serve                   # Run the web app
//! ```
//!
//! Fatal problems (missing token, expired authorization, failed playlist
//! creation) are reported with `error!` and end the process with exit code 1.

mod auth;
mod generate;
mod serve;

pub use auth::auth;
pub use generate::generate;
pub use serve::serve;
