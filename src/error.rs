use thiserror::Error;

pub const NO_MOVIES_FOUND: &str = "No movies found";
pub const MOVIE_NOT_FOUND: &str = "Movie not found";
pub const BLANK_IMDB_ID: &str = "IMDb ID cannot be blank";

/// Every failure the search/detail flow can surface.
///
/// `NotFound` and `InvalidArgument` display exactly their message, since
/// that text ends up in view-model state unchanged.
#[derive(Debug, Error)]
pub enum MovieError {
    /// Carries no request URL; the API key travels in the query string.
    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("OMDb HTTP error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("failed to parse OMDb JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("cache error: {source}")]
    Cache {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<reqwest::Error> for MovieError {
    fn from(e: reqwest::Error) -> Self {
        MovieError::Network(e.without_url())
    }
}

impl MovieError {
    pub(crate) fn cache<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MovieError::Cache {
            source: Box::new(e),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MovieError::InvalidArgument(_))
    }
}
