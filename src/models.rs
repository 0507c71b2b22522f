use serde::{Deserialize, Serialize};

/// One row of a title search.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MovieSummary {
    pub imdb_id: String,
    pub title: String,
    /// Free text ("1989", "2008–2013"), not necessarily numeric.
    pub year: String,
    /// Poster URL, or OMDb's "N/A" sentinel.
    pub poster: String,
    pub media_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub poster: String,
    pub ratings: Vec<Rating>,
    pub imdb_rating: String,
    pub imdb_votes: String,
    pub media_type: String,
    pub dvd: String,
    pub box_office: String,
    pub production: String,
    pub website: String,
}

/// A rating as reported by one source. Values stay opaque ("7.5/10", "72%").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Rating {
    pub source: String,
    pub value: String,
}
