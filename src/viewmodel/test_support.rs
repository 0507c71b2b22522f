use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::error::{MovieError, MOVIE_NOT_FOUND, NO_MOVIES_FOUND};
use crate::models::{MovieDetail, MovieSummary, Rating};
use crate::repository::MovieRepository;

pub(crate) const KNOWN_ID: &str = "tt0096895";

/// Answers after a fixed delay: the query "fail" and any ID other than
/// [`KNOWN_ID`] are reported as not found. Calls are recorded before the
/// delay, so cancelled lookups still show up. One query may be given its
/// own, longer delay.
#[derive(Default)]
pub(crate) struct ScriptedRepository {
    latency: Duration,
    slow_query: Option<(&'static str, Duration)>,
    pub searches: Mutex<Vec<String>>,
    pub details: Mutex<Vec<String>>,
}

impl ScriptedRepository {
    pub(crate) fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub(crate) fn with_slow_query(query: &'static str, latency: Duration) -> Self {
        Self {
            slow_query: Some((query, latency)),
            ..Self::default()
        }
    }

    fn search_latency(&self, query: &str) -> Duration {
        match self.slow_query {
            Some((slow, latency)) if slow == query => latency,
            _ => self.latency,
        }
    }
}

pub(crate) fn summary_for(query: &str) -> MovieSummary {
    MovieSummary {
        imdb_id: format!("tt-{query}"),
        title: query.to_string(),
        year: "1999".to_string(),
        poster: "N/A".to_string(),
        media_type: "movie".to_string(),
    }
}

pub(crate) fn known_detail() -> MovieDetail {
    MovieDetail {
        imdb_id: KNOWN_ID.to_string(),
        title: "Batman".to_string(),
        year: "1989".to_string(),
        rated: "PG-13".to_string(),
        released: "23 Jun 1989".to_string(),
        runtime: "126 min".to_string(),
        genre: "Action, Adventure".to_string(),
        director: "Tim Burton".to_string(),
        writer: "Bob Kane".to_string(),
        actors: "Michael Keaton".to_string(),
        plot: "Gotham's vigilante faces the Joker.".to_string(),
        poster: "N/A".to_string(),
        ratings: vec![Rating {
            source: "Internet Movie Database".to_string(),
            value: "7.5/10".to_string(),
        }],
        imdb_rating: "7.5".to_string(),
        imdb_votes: "400,000".to_string(),
        media_type: "movie".to_string(),
        dvd: "N/A".to_string(),
        box_office: "N/A".to_string(),
        production: "N/A".to_string(),
        website: "N/A".to_string(),
    }
}

#[async_trait]
impl MovieRepository for ScriptedRepository {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, MovieError> {
        self.searches.lock().unwrap().push(query.to_string());
        tokio::time::sleep(self.search_latency(query)).await;
        if query == "fail" {
            return Err(MovieError::NotFound(NO_MOVIES_FOUND));
        }
        Ok(vec![summary_for(query)])
    }

    async fn get_movie_detail(&self, imdb_id: &str) -> Result<MovieDetail, MovieError> {
        self.details.lock().unwrap().push(imdb_id.to_string());
        tokio::time::sleep(self.latency).await;
        if imdb_id == KNOWN_ID {
            Ok(known_detail())
        } else {
            Err(MovieError::NotFound(MOVIE_NOT_FOUND))
        }
    }

    async fn save_movies(&self, _movies: &[MovieSummary]) -> Result<(), MovieError> {
        Ok(())
    }

    fn saved_movies(&self) -> BoxStream<'static, Result<Vec<MovieSummary>, MovieError>> {
        stream::empty().boxed()
    }

    async fn save_movie_detail(&self, _detail: &MovieDetail) -> Result<(), MovieError> {
        Ok(())
    }

    async fn saved_movie_detail(&self, _imdb_id: &str) -> Result<Option<MovieDetail>, MovieError> {
        Ok(None)
    }
}
