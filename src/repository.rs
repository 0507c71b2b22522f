use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, info, warn};

use crate::cache::{MovieDetailEntity, MovieEntity, MovieStore};
use crate::error::{MovieError, MOVIE_NOT_FOUND, NO_MOVIES_FOUND};
use crate::models::{MovieDetail, MovieSummary};
use crate::omdb::{OmdbApi, SearchItem};

/// The one place that talks to both OMDb and the local cache.
///
/// Searches and detail lookups always go to the network; successful results
/// are written through to the cache. The cache is only read through the
/// dedicated `saved_*` operations.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, MovieError>;
    async fn get_movie_detail(&self, imdb_id: &str) -> Result<MovieDetail, MovieError>;
    async fn save_movies(&self, movies: &[MovieSummary]) -> Result<(), MovieError>;
    fn saved_movies(&self) -> BoxStream<'static, Result<Vec<MovieSummary>, MovieError>>;
    async fn save_movie_detail(&self, detail: &MovieDetail) -> Result<(), MovieError>;
    /// Cached detail, if any. Ratings are never cached, so the list is empty.
    async fn saved_movie_detail(&self, imdb_id: &str) -> Result<Option<MovieDetail>, MovieError>;
}

pub struct OmdbMovieRepository {
    api: Arc<dyn OmdbApi>,
    store: Arc<dyn MovieStore>,
}

impl OmdbMovieRepository {
    pub fn new(api: Arc<dyn OmdbApi>, store: Arc<dyn MovieStore>) -> Self {
        Self { api, store }
    }
}

#[async_trait]
impl MovieRepository for OmdbMovieRepository {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, MovieError> {
        debug!(query, "Searching OMDb");
        let response = self.api.search_movies(query).await?;
        if !response.is_success() {
            warn!(
                query,
                upstream_error = ?response.error,
                "OMDb search returned no results"
            );
            return Err(MovieError::NotFound(NO_MOVIES_FOUND));
        }
        let movies: Vec<MovieSummary> = response
            .search
            .unwrap_or_default()
            .into_iter()
            .map(SearchItem::into_summary)
            .collect();
        self.save_movies(&movies).await?;
        info!("Search for '{}' matched {} titles", query, movies.len());
        Ok(movies)
    }

    async fn get_movie_detail(&self, imdb_id: &str) -> Result<MovieDetail, MovieError> {
        debug!(imdb_id, "Fetching OMDb detail");
        let response = self.api.get_movie_detail(imdb_id).await?;
        if !response.is_success() {
            warn!(
                imdb_id,
                upstream_error = ?response.error,
                "OMDb detail lookup failed"
            );
            return Err(MovieError::NotFound(MOVIE_NOT_FOUND));
        }
        let detail = response.into_detail();
        self.save_movie_detail(&detail).await?;
        info!("Fetched '{}' ({})", detail.title, detail.imdb_id);
        Ok(detail)
    }

    async fn save_movies(&self, movies: &[MovieSummary]) -> Result<(), MovieError> {
        let entities = movies.iter().map(summary_to_entity).collect();
        self.store.insert_movies(entities).await
    }

    fn saved_movies(&self) -> BoxStream<'static, Result<Vec<MovieSummary>, MovieError>> {
        self.store
            .watch_movies()
            .map(|snapshot| {
                snapshot.map(|rows| rows.into_iter().map(entity_to_summary).collect::<Vec<_>>())
            })
            .boxed()
    }

    async fn save_movie_detail(&self, detail: &MovieDetail) -> Result<(), MovieError> {
        self.store.insert_movie_detail(detail_to_entity(detail)).await
    }

    async fn saved_movie_detail(&self, imdb_id: &str) -> Result<Option<MovieDetail>, MovieError> {
        Ok(self.store.movie_detail(imdb_id).await?.map(entity_to_detail))
    }
}

fn summary_to_entity(movie: &MovieSummary) -> MovieEntity {
    MovieEntity {
        imdb_id: movie.imdb_id.clone(),
        title: movie.title.clone(),
        year: movie.year.clone(),
        poster: movie.poster.clone(),
        media_type: movie.media_type.clone(),
    }
}

fn entity_to_summary(entity: MovieEntity) -> MovieSummary {
    MovieSummary {
        imdb_id: entity.imdb_id,
        title: entity.title,
        year: entity.year,
        poster: entity.poster,
        media_type: entity.media_type,
    }
}

fn detail_to_entity(detail: &MovieDetail) -> MovieDetailEntity {
    MovieDetailEntity {
        imdb_id: detail.imdb_id.clone(),
        title: detail.title.clone(),
        year: detail.year.clone(),
        rated: detail.rated.clone(),
        released: detail.released.clone(),
        runtime: detail.runtime.clone(),
        genre: detail.genre.clone(),
        director: detail.director.clone(),
        writer: detail.writer.clone(),
        actors: detail.actors.clone(),
        plot: detail.plot.clone(),
        poster: detail.poster.clone(),
        imdb_rating: detail.imdb_rating.clone(),
        imdb_votes: detail.imdb_votes.clone(),
        media_type: detail.media_type.clone(),
        dvd: detail.dvd.clone(),
        box_office: detail.box_office.clone(),
        production: detail.production.clone(),
        website: detail.website.clone(),
    }
}

fn entity_to_detail(entity: MovieDetailEntity) -> MovieDetail {
    MovieDetail {
        imdb_id: entity.imdb_id,
        title: entity.title,
        year: entity.year,
        rated: entity.rated,
        released: entity.released,
        runtime: entity.runtime,
        genre: entity.genre,
        director: entity.director,
        writer: entity.writer,
        actors: entity.actors,
        plot: entity.plot,
        poster: entity.poster,
        ratings: Vec::new(),
        imdb_rating: entity.imdb_rating,
        imdb_votes: entity.imdb_votes,
        media_type: entity.media_type,
        dvd: entity.dvd,
        box_office: entity.box_office,
        production: entity.production,
        website: entity.website,
    }
}
