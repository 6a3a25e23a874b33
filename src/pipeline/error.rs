use thiserror::Error;

/// The session has no usable credentials; the caller must send the user
/// through the OAuth login again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("authorization required")]
pub struct AuthRequired;

/// Failure of a single call to an external service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Invalid(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No uploaded image in the session, or the file is gone.
    #[error("No image uploaded. Please go back and upload one.")]
    NoImage,

    /// Control signal: the surrounding handler must redirect to login.
    #[error("authorization required")]
    AuthRequired,

    #[error("Error generating song list: {0}")]
    SongSuggestion(#[source] ProviderError),

    #[error("Error creating playlist: {0}")]
    PlaylistCreation(String),
}

impl From<AuthRequired> for PipelineError {
    fn from(_: AuthRequired) -> Self {
        PipelineError::AuthRequired
    }
}
