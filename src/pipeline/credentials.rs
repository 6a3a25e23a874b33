use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use super::{AuthRequired, providers::OAuthProvider};
use crate::{info, session::Session, types::Token, warning};

/// Seconds before the literal expiry at which a token already counts as
/// expired.
pub const DEFAULT_EXPIRY_MARGIN_SECS: i64 = 60;

/// Owns the OAuth token lifecycle of a session.
///
/// The returned access token is always unexpired at return time: refresh
/// happens eagerly, before use, never after a rejected call.
#[derive(Clone)]
pub struct CredentialManager {
    oauth: Arc<dyn OAuthProvider>,
    expiry_margin: Duration,
}

impl CredentialManager {
    pub fn new(oauth: Arc<dyn OAuthProvider>) -> Self {
        CredentialManager {
            oauth,
            expiry_margin: Duration::seconds(DEFAULT_EXPIRY_MARGIN_SECS),
        }
    }

    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    /// Returns a valid access token for the session, refreshing it if needed.
    ///
    /// The session lock is held from the expiry check until the refreshed
    /// token is stored, so concurrent requests on one session refresh at most
    /// once and never reuse a rotated refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthRequired`] when the session holds no token, or when the
    /// refresh fails. In the latter case the session's auth state is cleared
    /// so that later calls fail without another refresh attempt.
    pub async fn ensure_valid_token(
        &self,
        session: &Mutex<Session>,
    ) -> Result<String, AuthRequired> {
        let mut session = session.lock().await;

        let Some(token) = session.token.as_ref() else {
            return Err(AuthRequired);
        };

        let now = Utc::now();
        if !token.is_expired(now, self.expiry_margin) {
            return Ok(token.access_token.clone());
        }

        info!("Access token expired, refreshing...");
        let previous = token.clone();
        match self.oauth.refresh(&previous.refresh_token).await {
            Ok(grant) => {
                let refreshed = Token::from_grant(grant, Some(&previous), Utc::now());
                let access_token = refreshed.access_token.clone();
                session.token = Some(refreshed);
                Ok(access_token)
            }
            Err(e) => {
                warning!("Error refreshing token: {}", e);
                session.clear_auth();
                Err(AuthRequired)
            }
        }
    }
}
