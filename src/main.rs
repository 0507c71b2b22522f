use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cineseek::cache::{MovieStore, SqliteMovieStore};
use cineseek::config::Config;
use cineseek::models::{MovieDetail, MovieSummary};
use cineseek::omdb::OmdbClient;
use cineseek::repository::{MovieRepository, OmdbMovieRepository};
use cineseek::usecase::{GetMovieDetail, SearchMovies};
use cineseek::viewmodel::{
    ListConfig, ListEvent, MovieDetailViewModel, MovieListState, MovieListViewModel,
};
use dotenvy::dotenv;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cineseek", version, about = "Search OMDb and browse cached titles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show titles for a random trending keyword
    Trending,
    /// Search titles by name
    Search { query: String },
    /// Fetch full details for an IMDb ID
    Detail { imdb_id: String },
    /// List every cached search result
    Saved,
    /// Show the cached details for an IMDb ID
    SavedDetail { imdb_id: String },
    /// Delete all cached movies and details
    ClearCache,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    let config = Config::from_env()?;

    let store = Arc::new(
        SqliteMovieStore::open(&config.db_path)
            .await
            .with_context(|| format!("Failed to open cache at {}", config.db_path))?,
    );
    let api = Arc::new(OmdbClient::from_config(&config).context("Failed to build OMDb client")?);
    let repository: Arc<dyn MovieRepository> =
        Arc::new(OmdbMovieRepository::new(api, store.clone()));

    match cli.command {
        Command::Trending => {
            let vm = MovieListViewModel::new(SearchMovies::new(repository));
            let state = settled_list(&vm).await?;
            print_list(&state)
        }
        Command::Search { query } => {
            let config = ListConfig {
                trending_keywords: Vec::new(),
                ..ListConfig::default()
            };
            let vm = MovieListViewModel::with_config(SearchMovies::new(repository), config);
            vm.on_event(ListEvent::SearchChanged(query));
            let state = settled_list(&vm).await?;
            print_list(&state)
        }
        Command::Detail { imdb_id } => {
            let vm = MovieDetailViewModel::new(GetMovieDetail::new(repository), Some(imdb_id));
            let mut rx = vm.state();
            let state = rx
                .wait_for(|s| !s.is_loading)
                .await
                .context("Detail view closed before loading finished")?
                .clone();
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            if let Some(detail) = state.detail {
                print_detail(&detail);
            }
            Ok(())
        }
        Command::Saved => {
            let movies = repository
                .saved_movies()
                .next()
                .await
                .transpose()?
                .unwrap_or_default();
            if movies.is_empty() {
                println!("Cache is empty");
            }
            print_movies(&movies);
            Ok(())
        }
        Command::SavedDetail { imdb_id } => {
            match repository.saved_movie_detail(&imdb_id).await? {
                Some(detail) => print_detail(&detail),
                None => println!("No cached details for {}", imdb_id),
            }
            Ok(())
        }
        Command::ClearCache => {
            store.delete_all_movies().await?;
            store.delete_all_movie_details().await?;
            info!("Cleared cached movies and details");
            Ok(())
        }
    }
}

async fn settled_list(vm: &MovieListViewModel) -> Result<MovieListState> {
    let mut rx = vm.state();
    let state = rx
        .wait_for(|s| !s.is_loading)
        .await
        .context("List view closed before loading finished")?
        .clone();
    Ok(state)
}

fn print_list(state: &MovieListState) -> Result<()> {
    if let Some(error) = &state.error {
        anyhow::bail!("{}", error);
    }
    print_movies(&state.movies);
    Ok(())
}

fn print_movies(movies: &[MovieSummary]) {
    for m in movies {
        println!("{}  {} ({}) [{}]", m.imdb_id, m.title, m.year, m.media_type);
    }
}

fn print_detail(d: &MovieDetail) {
    println!("{} ({}) - {}", d.title, d.year, d.imdb_id);
    println!("Rated: {}  Runtime: {}  Released: {}", d.rated, d.runtime, d.released);
    println!("Genre: {}", d.genre);
    println!("Director: {}", d.director);
    println!("Writer: {}", d.writer);
    println!("Actors: {}", d.actors);
    println!("IMDb: {} ({} votes)", d.imdb_rating, d.imdb_votes);
    for r in &d.ratings {
        println!("  {}: {}", r.source, r.value);
    }
    println!("Box office: {}  DVD: {}", d.box_office, d.dvd);
    println!("Production: {}  Website: {}", d.production, d.website);
    println!("Poster: {}", d.poster);
    println!();
    println!("{}", d.plot);
}
