use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::MovieError;
use crate::models::{MovieDetail, MovieSummary, Rating};

/// Read-only access to the OMDb API.
///
/// Implementations surface transport and HTTP failures as errors but never
/// look at the `Response` flag in the body; that is the caller's call.
#[async_trait]
pub trait OmdbApi: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<SearchResponse, MovieError>;
    async fn get_movie_detail(&self, imdb_id: &str) -> Result<MovieDetailResponse, MovieError>;
}

#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, MovieError> {
        let user_agent = format!("cineseek/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, MovieError> {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    async fn get_json<T: DeserializeOwned>(&self, param: &str, value: &str) -> Result<T, MovieError> {
        let url = format!(
            "{}/?apikey={}&{param}={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(value)
        );
        debug!(param, value, "OMDb request");
        let res = self.client.get(&url).send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        if !status.is_success() {
            return Err(MovieError::Server {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn search_movies(&self, query: &str) -> Result<SearchResponse, MovieError> {
        self.get_json("s", query).await
    }

    async fn get_movie_detail(&self, imdb_id: &str) -> Result<MovieDetailResponse, MovieError> {
        self.get_json("i", imdb_id).await
    }
}

/// Search envelope. `Search` is absent when nothing matched.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Search")]
    pub search: Option<Vec<SearchItem>>,
    #[serde(rename = "totalResults")]
    pub total_results: Option<String>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Type")]
    pub media_type: Option<String>,
}

impl SearchItem {
    pub fn into_summary(self) -> MovieSummary {
        MovieSummary {
            imdb_id: self.imdb_id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            poster: self.poster.unwrap_or_default(),
            media_type: self.media_type.unwrap_or_default(),
        }
    }
}

/// Detail record. A `"False"` response carries only `Response` and `Error`,
/// so every other field is optional here.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailResponse {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Rated")]
    pub rated: Option<String>,
    #[serde(rename = "Released")]
    pub released: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    #[serde(rename = "Writer")]
    pub writer: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Ratings")]
    pub ratings: Option<Vec<RatingItem>>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Type")]
    pub media_type: Option<String>,
    #[serde(rename = "DVD")]
    pub dvd: Option<String>,
    #[serde(rename = "BoxOffice")]
    pub box_office: Option<String>,
    #[serde(rename = "Production")]
    pub production: Option<String>,
    #[serde(rename = "Website")]
    pub website: Option<String>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl MovieDetailResponse {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    pub fn into_detail(self) -> MovieDetail {
        MovieDetail {
            imdb_id: self.imdb_id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            rated: self.rated.unwrap_or_default(),
            released: self.released.unwrap_or_default(),
            runtime: self.runtime.unwrap_or_default(),
            genre: self.genre.unwrap_or_default(),
            director: self.director.unwrap_or_default(),
            writer: self.writer.unwrap_or_default(),
            actors: self.actors.unwrap_or_default(),
            plot: self.plot.unwrap_or_default(),
            poster: self.poster.unwrap_or_default(),
            ratings: self
                .ratings
                .unwrap_or_default()
                .into_iter()
                .map(RatingItem::into_rating)
                .collect(),
            imdb_rating: self.imdb_rating.unwrap_or_default(),
            imdb_votes: self.imdb_votes.unwrap_or_default(),
            media_type: self.media_type.unwrap_or_default(),
            dvd: self.dvd.unwrap_or_default(),
            box_office: self.box_office.unwrap_or_default(),
            production: self.production.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingItem {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl RatingItem {
    pub fn into_rating(self) -> Rating {
        Rating {
            source: self.source,
            value: self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_envelope_maps_items_in_order() {
        let value = json!({
            "Search": [
                { "Title": "Batman", "Year": "1989", "imdbID": "tt0096895", "Type": "movie", "Poster": "https://m.media-amazon.com/batman.jpg" },
                { "Title": "Batman Returns", "Year": "1992", "imdbID": "tt0103776", "Type": "movie", "Poster": "N/A" }
            ],
            "totalResults": "2",
            "Response": "True"
        });
        let parsed: SearchResponse = serde_json::from_value(value).expect("search deserialize");
        assert!(parsed.is_success());
        assert_eq!(parsed.total_results.as_deref(), Some("2"));
        let movies: Vec<MovieSummary> = parsed
            .search
            .unwrap_or_default()
            .into_iter()
            .map(SearchItem::into_summary)
            .collect();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].imdb_id, "tt0096895");
        assert_eq!(movies[0].media_type, "movie");
        assert_eq!(movies[1].poster, "N/A");
    }

    #[test]
    fn failed_search_has_no_list() {
        let value = json!({ "Response": "False", "Error": "Movie not found!" });
        let parsed: SearchResponse = serde_json::from_value(value).expect("search deserialize");
        assert!(!parsed.is_success());
        assert!(parsed.search.is_none());
        assert_eq!(parsed.error.as_deref(), Some("Movie not found!"));
    }

    #[test]
    fn detail_keeps_ratings_and_coerces_missing_fields() {
        let value = json!({
            "Title": "Batman",
            "Year": "1989",
            "Rated": "PG-13",
            "Runtime": "126 min",
            "Director": "Tim Burton",
            "Plot": null,
            "Ratings": [
                { "Source": "Internet Movie Database", "Value": "7.5/10" },
                { "Source": "Rotten Tomatoes", "Value": "77%" }
            ],
            "imdbRating": "7.5",
            "imdbID": "tt0096895",
            "Type": "movie",
            "Response": "True"
        });
        let parsed: MovieDetailResponse = serde_json::from_value(value).expect("detail deserialize");
        assert!(parsed.is_success());
        let detail = parsed.into_detail();
        assert_eq!(detail.imdb_id, "tt0096895");
        assert_eq!(detail.director, "Tim Burton");
        assert_eq!(detail.plot, "");
        assert_eq!(detail.box_office, "");
        assert_eq!(detail.ratings.len(), 2);
        assert_eq!(detail.ratings[1].value, "77%");
    }

    #[tokio::test]
    async fn transport_failure_does_not_leak_the_api_key() {
        let client = OmdbClient::new("http://127.0.0.1:1", "SECRET-KEY-123").unwrap();
        let err = client.search_movies("Batman").await.unwrap_err();
        assert!(matches!(err, MovieError::Network(_)));
        let message = err.to_string();
        assert!(!message.contains("SECRET-KEY-123"), "leaked key: {message}");
        assert!(!message.contains("apikey"), "leaked query: {message}");
    }

    #[test]
    fn false_detail_parses_without_fields() {
        let value = json!({ "Response": "False", "Error": "Incorrect IMDb ID." });
        let parsed: MovieDetailResponse = serde_json::from_value(value).expect("detail deserialize");
        assert!(!parsed.is_success());
    }
}
