//! Observable state for the list and detail screens.
//!
//! Each view model keeps its state in a `watch` channel and runs background
//! work in [`TaskSlot`]s, one per kind of operation. Starting a new task of a
//! kind cancels the previous one; a cancelled task never writes state.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

mod detail;
mod list;

#[cfg(test)]
mod test_support;

pub use detail::{MovieDetailState, MovieDetailViewModel};
pub use list::{
    ListConfig, ListEvent, MovieListState, MovieListViewModel, SEARCH_DEBOUNCE, TRENDING_KEYWORDS,
};

/// Latest-wins slot for one kind of background task.
///
/// Replacing the token and committing a result both happen under the same
/// lock, so a task whose token was cancelled cannot slip a write in after
/// its replacement has started.
pub(crate) struct TaskSlot {
    token: Mutex<CancellationToken>,
}

impl TaskSlot {
    pub(crate) fn new() -> Self {
        Self {
            token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Cancels the current task, runs `update` while still holding the slot,
    /// and returns the token for the task that replaces it.
    pub(crate) fn restart(&self, update: impl FnOnce()) -> CancellationToken {
        let mut token = self.token.lock();
        token.cancel();
        *token = CancellationToken::new();
        update();
        token.clone()
    }

    /// Runs `write` only if `token` has not been cancelled. Returns whether it ran.
    pub(crate) fn commit(&self, token: &CancellationToken, write: impl FnOnce()) -> bool {
        let _slot = self.token.lock();
        if token.is_cancelled() {
            return false;
        }
        write();
        true
    }

    pub(crate) fn cancel(&self) {
        self.token.lock().cancel();
    }
}
