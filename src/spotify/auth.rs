use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Url;
use tokio::sync::Mutex;

use super::{SpotifyClient, check_status};
use crate::{
    error,
    management::TokenCache,
    pipeline::ProviderError,
    server::start_callback_server,
    success,
    types::{PkceToken, Token, TokenGrant},
    utils, warning,
};

impl SpotifyClient {
    /// Builds the Spotify authorization URL for a PKCE code challenge.
    ///
    /// Parameters are percent-encoded, so scopes containing spaces and redirect
    /// URIs with query strings survive the round trip.
    pub fn authorize_url(&self, code_challenge: &str) -> Result<String, ProviderError> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
                ("scope", self.scope.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Invalid(format!("invalid authorize url: {}", e)))?;

        Ok(url.into())
    }

    /// Exchanges an authorization code for a token using PKCE.
    ///
    /// Completes the OAuth 2.0 PKCE flow by exchanging the authorization code
    /// received from the callback for an access token. The verifier must match
    /// the challenge that was sent in the initial authorization request.
    ///
    /// # Errors
    ///
    /// - Invalid or expired authorization code
    /// - Code verifier doesn't match the challenge
    /// - Network connectivity issues
    pub async fn exchange_code_pkce(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<Token, ProviderError> {
        let request = self.http.post(&self.token_url).form(&[
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", self.redirect_uri.as_str()),
        ]);

        let grant = self.token_request(request).await?;
        if grant.refresh_token.as_deref().unwrap_or_default().is_empty() {
            return Err(ProviderError::Invalid(
                "token response has no refresh token".to_string(),
            ));
        }

        Ok(Token::from_grant(grant, None, Utc::now()))
    }

    /// Exchanges a refresh token for a new grant.
    ///
    /// Spotify may rotate the refresh token; when the response carries none
    /// the caller keeps the old one.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, ProviderError> {
        let request = self.http.post(&self.token_url).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ]);

        self.token_request(request).await
    }

    async fn token_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<TokenGrant, ProviderError> {
        let request = match &self.client_secret {
            Some(secret) => request.basic_auth(&self.client_id, Some(secret)),
            None => request,
        };

        let response = request.send().await?;
        Ok(check_status(response).await?.json::<TokenGrant>().await?)
    }
}

/// Runs the OAuth 2.0 PKCE flow from the terminal and caches the token.
///
/// 1. Generates a code verifier and its SHA256 challenge
/// 2. Starts a local callback server
/// 3. Opens the authorization URL in the default browser
/// 4. Waits for the callback to exchange the code
/// 5. Persists the token for `generate`
///
/// Browser launch failures only print the URL; a timeout or a failed
/// persist terminates the program.
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>, client: SpotifyClient) {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = match client.authorize_url(&code_challenge) {
        Ok(url) => url,
        Err(e) => error!("Cannot build authorization url: {}", e),
    };

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier: code_verifier.clone(),
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_callback_server(server_state, client).await;
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(token) => {
            if let Err(e) = TokenCache::new(token).persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Polls the shared state for the token placed there by the callback handler.
/// Gives up after 120 seconds.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(120);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
