//! SQLite-backed cache of fetched movies.
//!
//! Two tables, `movies` and `movie_details`, both keyed by IMDb ID. Writes
//! replace on key conflict; nothing is ever evicted. The store also
//! publishes a change signal for `movies` so callers can watch the row set.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use rusqlite::OptionalExtension;
use tokio::sync::watch;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::error::MovieError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS movies (
    imdb_id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    year TEXT NOT NULL,
    poster TEXT NOT NULL,
    type TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS movie_details (
    imdb_id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    year TEXT NOT NULL,
    rated TEXT NOT NULL,
    released TEXT NOT NULL,
    runtime TEXT NOT NULL,
    genre TEXT NOT NULL,
    director TEXT NOT NULL,
    writer TEXT NOT NULL,
    actors TEXT NOT NULL,
    plot TEXT NOT NULL,
    poster TEXT NOT NULL,
    imdb_rating TEXT NOT NULL,
    imdb_votes TEXT NOT NULL,
    type TEXT NOT NULL,
    dvd TEXT NOT NULL,
    box_office TEXT NOT NULL,
    production TEXT NOT NULL,
    website TEXT NOT NULL
);
";

/// A row of the `movies` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieEntity {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub media_type: String,
}

/// A row of the `movie_details` table. Ratings are not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDetailEntity {
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
    pub imdb_rating: String,
    pub imdb_votes: String,
    pub media_type: String,
    pub dvd: String,
    pub box_office: String,
    pub production: String,
    pub website: String,
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Upserts every entity; existing rows with the same ID are replaced.
    async fn insert_movies(&self, movies: Vec<MovieEntity>) -> Result<(), MovieError>;
    async fn insert_movie_detail(&self, detail: MovieDetailEntity) -> Result<(), MovieError>;
    /// Emits the current `movies` snapshot, then a fresh snapshot after every
    /// change to the row set.
    fn watch_movies(&self) -> BoxStream<'static, Result<Vec<MovieEntity>, MovieError>>;
    async fn all_movies(&self) -> Result<Vec<MovieEntity>, MovieError>;
    async fn movie_detail(&self, imdb_id: &str) -> Result<Option<MovieDetailEntity>, MovieError>;
    async fn delete_all_movies(&self) -> Result<(), MovieError>;
    async fn delete_all_movie_details(&self) -> Result<(), MovieError>;
}

pub struct SqliteMovieStore {
    conn: Arc<Connection>,
    movies_changed: watch::Sender<u64>,
}

impl SqliteMovieStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, MovieError> {
        let conn = Connection::open(path.as_ref())
            .await
            .map_err(MovieError::cache)?;
        Self::with_connection(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, MovieError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(MovieError::cache)?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, MovieError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(MovieError::cache)?;
        let (movies_changed, _) = watch::channel(0);
        Ok(Self {
            conn: Arc::new(conn),
            movies_changed,
        })
    }

    fn notify_movies_changed(&self) {
        self.movies_changed.send_modify(|version| *version += 1);
    }
}

async fn select_movies(conn: &Connection) -> Result<Vec<MovieEntity>, MovieError> {
    conn.call(|conn| -> Result<Vec<MovieEntity>, rusqlite::Error> {
        let mut stmt =
            conn.prepare("SELECT imdb_id, title, year, poster, type FROM movies ORDER BY rowid")?;
        let movies = stmt
            .query_map([], |row| {
                Ok(MovieEntity {
                    imdb_id: row.get(0)?,
                    title: row.get(1)?,
                    year: row.get(2)?,
                    poster: row.get(3)?,
                    media_type: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(movies)
    })
    .await
    .map_err(MovieError::cache)
}

#[async_trait]
impl MovieStore for SqliteMovieStore {
    async fn insert_movies(&self, movies: Vec<MovieEntity>) -> Result<(), MovieError> {
        let count = movies.len();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR REPLACE INTO movies (imdb_id, title, year, poster, type) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    for m in &movies {
                        stmt.execute(rusqlite::params![
                            m.imdb_id,
                            m.title,
                            m.year,
                            m.poster,
                            m.media_type,
                        ])?;
                    }
                }
                tx.commit()
            })
            .await
            .map_err(MovieError::cache)?;
        debug!(count, "Cached movies");
        self.notify_movies_changed();
        Ok(())
    }

    async fn insert_movie_detail(&self, detail: MovieDetailEntity) -> Result<(), MovieError> {
        let imdb_id = detail.imdb_id.clone();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO movie_details \
                     (imdb_id, title, year, rated, released, runtime, genre, director, writer, \
                      actors, plot, poster, imdb_rating, imdb_votes, type, dvd, box_office, \
                      production, website) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                             ?16, ?17, ?18, ?19)",
                    rusqlite::params![
                        detail.imdb_id,
                        detail.title,
                        detail.year,
                        detail.rated,
                        detail.released,
                        detail.runtime,
                        detail.genre,
                        detail.director,
                        detail.writer,
                        detail.actors,
                        detail.plot,
                        detail.poster,
                        detail.imdb_rating,
                        detail.imdb_votes,
                        detail.media_type,
                        detail.dvd,
                        detail.box_office,
                        detail.production,
                        detail.website,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(MovieError::cache)?;
        debug!(imdb_id = %imdb_id, "Cached movie detail");
        Ok(())
    }

    fn watch_movies(&self) -> BoxStream<'static, Result<Vec<MovieEntity>, MovieError>> {
        let conn = Arc::clone(&self.conn);
        let rx = self.movies_changed.subscribe();
        stream::unfold((conn, rx, true), |(conn, mut rx, first)| async move {
            // Ends once the store (and with it the sender) is dropped.
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let snapshot = select_movies(&conn).await;
            Some((snapshot, (conn, rx, false)))
        })
        .boxed()
    }

    async fn all_movies(&self) -> Result<Vec<MovieEntity>, MovieError> {
        select_movies(&self.conn).await
    }

    async fn movie_detail(&self, imdb_id: &str) -> Result<Option<MovieDetailEntity>, MovieError> {
        let imdb_id = imdb_id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<MovieDetailEntity>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT imdb_id, title, year, rated, released, runtime, genre, director, \
                     writer, actors, plot, poster, imdb_rating, imdb_votes, type, dvd, \
                     box_office, production, website \
                     FROM movie_details WHERE imdb_id = ?1",
                )?;
                let detail = stmt
                    .query_row(rusqlite::params![imdb_id], |row| {
                    Ok(MovieDetailEntity {
                        imdb_id: row.get(0)?,
                        title: row.get(1)?,
                        year: row.get(2)?,
                        rated: row.get(3)?,
                        released: row.get(4)?,
                        runtime: row.get(5)?,
                        genre: row.get(6)?,
                        director: row.get(7)?,
                        writer: row.get(8)?,
                        actors: row.get(9)?,
                        plot: row.get(10)?,
                        poster: row.get(11)?,
                        imdb_rating: row.get(12)?,
                        imdb_votes: row.get(13)?,
                        media_type: row.get(14)?,
                        dvd: row.get(15)?,
                        box_office: row.get(16)?,
                        production: row.get(17)?,
                        website: row.get(18)?,
                    })
                    })
                    .optional()?;
                Ok(detail)
            })
            .await
            .map_err(MovieError::cache)
    }

    async fn delete_all_movies(&self) -> Result<(), MovieError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM movies", [])?;
                Ok(())
            })
            .await
            .map_err(MovieError::cache)?;
        self.notify_movies_changed();
        Ok(())
    }

    async fn delete_all_movie_details(&self) -> Result<(), MovieError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM movie_details", [])?;
                Ok(())
            })
            .await
            .map_err(MovieError::cache)
    }
}
