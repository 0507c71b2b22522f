use std::sync::Arc;

use tracing::debug;

use crate::error::{MovieError, BLANK_IMDB_ID};
use crate::models::{MovieDetail, MovieSummary};
use crate::repository::MovieRepository;

/// Title search. A blank query short-circuits to an empty result without
/// touching the repository.
#[derive(Clone)]
pub struct SearchMovies {
    repository: Arc<dyn MovieRepository>,
}

impl SearchMovies {
    pub fn new(repository: Arc<dyn MovieRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, query: &str) -> Result<Vec<MovieSummary>, MovieError> {
        if query.trim().is_empty() {
            debug!("Blank search query, skipping lookup");
            return Ok(Vec::new());
        }
        self.repository.search_movies(query).await
    }
}

#[derive(Clone)]
pub struct GetMovieDetail {
    repository: Arc<dyn MovieRepository>,
}

impl GetMovieDetail {
    pub fn new(repository: Arc<dyn MovieRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, imdb_id: &str) -> Result<MovieDetail, MovieError> {
        if imdb_id.trim().is_empty() {
            return Err(MovieError::InvalidArgument(BLANK_IMDB_ID));
        }
        self.repository.get_movie_detail(imdb_id).await
    }
}
