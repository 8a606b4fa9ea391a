//! Hub REST adapter error types.

use ipadha_domain::error::IpadhaError;

/// Errors specific to the REST adapter.
#[derive(Debug, thiserror::Error)]
pub enum HubRestError {
    /// The configured hub URL does not parse.
    #[error("invalid hub url")]
    InvalidUrl(#[from] url::ParseError),

    /// The hub URL is not `http` or `https`.
    #[error("hub url must use http or https, got {0:?}")]
    UnsupportedScheme(String),

    /// The HTTP client could not be built.
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),

    /// The request failed or the hub answered with an error status.
    #[error("hub request failed")]
    Request(#[from] reqwest::Error),

    /// The hub answered 401.
    #[error("hub rejected the access token")]
    Unauthorized,
}

impl HubRestError {
    /// Convert into an [`IpadhaError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> IpadhaError {
        match self {
            Self::Unauthorized => IpadhaError::Unauthorized,
            other => IpadhaError::Transport(Box::new(other)),
        }
    }
}

impl From<HubRestError> for IpadhaError {
    fn from(err: HubRestError) -> Self {
        err.into_domain()
    }
}
