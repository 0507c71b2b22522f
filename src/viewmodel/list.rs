use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::TaskSlot;
use crate::error::MovieError;
use crate::models::MovieSummary;
use crate::usecase::SearchMovies;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const TRENDING_KEYWORDS: [&str; 5] = ["matrix", "action", "comedy", "drama", "thriller"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieListState {
    pub movies: Vec<MovieSummary>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// The search text changed; runs a debounced search.
    SearchChanged(String),
    ClearSearch,
    /// Re-runs the search for the current query text.
    Retry,
}

#[derive(Debug, Clone)]
pub struct ListConfig {
    pub debounce: Duration,
    /// One of these is searched on construction. Empty disables the fetch.
    pub trending_keywords: Vec<String>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            debounce: SEARCH_DEBOUNCE,
            trending_keywords: TRENDING_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

pub struct MovieListViewModel {
    inner: Arc<ListInner>,
}

struct ListInner {
    search_movies: SearchMovies,
    state: watch::Sender<MovieListState>,
    debounce: Duration,
    search_task: TaskSlot,
    trending_task: TaskSlot,
}

impl MovieListViewModel {
    /// Must be called from within a Tokio runtime; the trending fetch is
    /// spawned immediately.
    pub fn new(search_movies: SearchMovies) -> Self {
        Self::with_config(search_movies, ListConfig::default())
    }

    pub fn with_config(search_movies: SearchMovies, config: ListConfig) -> Self {
        let (state, _) = watch::channel(MovieListState::default());
        let vm = Self {
            inner: Arc::new(ListInner {
                search_movies,
                state,
                debounce: config.debounce,
                search_task: TaskSlot::new(),
                trending_task: TaskSlot::new(),
            }),
        };
        let keyword = config
            .trending_keywords
            .choose(&mut rand::thread_rng())
            .cloned();
        if let Some(keyword) = keyword {
            vm.fetch_trending(keyword);
        }
        vm
    }

    pub fn state(&self) -> watch::Receiver<MovieListState> {
        self.inner.state.subscribe()
    }

    pub fn current(&self) -> MovieListState {
        self.inner.state.borrow().clone()
    }

    pub fn on_event(&self, event: ListEvent) {
        match event {
            ListEvent::SearchChanged(query) => self.search(query),
            ListEvent::ClearSearch => self.clear_search(),
            ListEvent::Retry => {
                let query = self.inner.state.borrow().search_query.clone();
                self.search(query);
            }
        }
    }

    fn fetch_trending(&self, keyword: String) {
        let token = self.inner.trending_task.restart(|| {
            self.inner.state.send_modify(|s| {
                s.is_loading = true;
                s.error = None;
            });
        });
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            info!("Fetching trending titles for '{}'", keyword);
            let outcome = tokio::select! {
                _ = token.cancelled() => return,
                outcome = inner.search_movies.execute(&keyword) => outcome,
            };
            inner
                .trending_task
                .commit(&token, || inner.apply(outcome));
        });
    }

    /// Any user search supersedes the trending fetch, which must not
    /// overwrite results for a query the user typed.
    fn search(&self, query: String) {
        let token = self.inner.search_task.restart(|| {
            self.inner.trending_task.cancel();
            self.inner.state.send_modify(|s| {
                s.is_loading = true;
                s.error = None;
                s.search_query = query.clone();
            });
        });
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!(query = %query, "Search superseded");
                    return;
                }
                outcome = async {
                    tokio::time::sleep(inner.debounce).await;
                    inner.search_movies.execute(&query).await
                } => outcome,
            };
            if !inner.search_task.commit(&token, || inner.apply(outcome)) {
                debug!(query = %query, "Discarded stale search result");
            }
        });
    }

    fn clear_search(&self) {
        self.inner.search_task.restart(|| {
            self.inner.trending_task.cancel();
            self.inner.state.send_modify(|s| {
                s.search_query.clear();
                s.movies.clear();
                s.is_loading = false;
            });
        });
    }
}

impl ListInner {
    fn apply(&self, outcome: Result<Vec<MovieSummary>, MovieError>) {
        match outcome {
            Ok(movies) => self.state.send_modify(|s| {
                s.movies = movies;
                s.is_loading = false;
                s.error = None;
            }),
            Err(e) => {
                warn!("Movie search failed: {}", e);
                self.state.send_modify(|s| {
                    s.movies.clear();
                    s.is_loading = false;
                    s.error = Some(e.to_string());
                });
            }
        }
    }
}

impl Drop for MovieListViewModel {
    fn drop(&mut self) {
        self.inner.search_task.cancel();
        self.inner.trending_task.cancel();
    }
}
