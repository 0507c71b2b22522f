use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use super::TaskSlot;
use crate::models::MovieDetail;
use crate::usecase::GetMovieDetail;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieDetailState {
    pub detail: Option<MovieDetail>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Detail screen state. The fetch runs once, on construction; there is no
/// retry.
pub struct MovieDetailViewModel {
    inner: Arc<DetailInner>,
}

struct DetailInner {
    get_movie_detail: GetMovieDetail,
    state: watch::Sender<MovieDetailState>,
    detail_task: TaskSlot,
}

impl MovieDetailViewModel {
    /// `imdb_id` is the identifier carried by the navigation route, if any.
    pub fn new(get_movie_detail: GetMovieDetail, imdb_id: Option<String>) -> Self {
        let (state, _) = watch::channel(MovieDetailState::default());
        let vm = Self {
            inner: Arc::new(DetailInner {
                get_movie_detail,
                state,
                detail_task: TaskSlot::new(),
            }),
        };
        if let Some(imdb_id) = imdb_id {
            vm.fetch_detail(imdb_id);
        }
        vm
    }

    pub fn state(&self) -> watch::Receiver<MovieDetailState> {
        self.inner.state.subscribe()
    }

    pub fn current(&self) -> MovieDetailState {
        self.inner.state.borrow().clone()
    }

    fn fetch_detail(&self, imdb_id: String) {
        let token = self.inner.detail_task.restart(|| {
            self.inner.state.send_modify(|s| {
                s.is_loading = true;
                s.error = None;
            });
        });
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => return,
                outcome = inner.get_movie_detail.execute(&imdb_id) => outcome,
            };
            inner.detail_task.commit(&token, || match outcome {
                Ok(detail) => inner.state.send_modify(|s| {
                    s.detail = Some(detail);
                    s.is_loading = false;
                    s.error = None;
                }),
                Err(e) => {
                    warn!(imdb_id = %imdb_id, "Movie detail failed: {}", e);
                    inner.state.send_modify(|s| {
                        s.is_loading = false;
                        s.error = Some(e.to_string());
                    });
                }
            });
        });
    }
}

impl Drop for MovieDetailViewModel {
    fn drop(&mut self) {
        self.inner.detail_task.cancel();
    }
}
