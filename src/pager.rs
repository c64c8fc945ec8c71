use std::cell::RefCell;

use crate::client::JobFetcher;
use crate::filter::FilterCriteria;
use crate::models::{JobPosting, PAGE_SIZE, PageResult};

/// Where the loader currently is. `Exhausted` is terminal until a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Exhausted,
}

#[derive(Debug)]
struct PaginationState {
    accumulated: Vec<JobPosting>,
    current_page: u32,
    has_more: bool,
    is_loading: bool,
    // Bumped on every reset; a fetch issued under an older generation
    // must not touch the state when it completes.
    generation: u64,
}

impl PaginationState {
    fn fresh(generation: u64) -> Self {
        Self {
            accumulated: Vec::new(),
            current_page: 1,
            has_more: true,
            is_loading: false,
            generation,
        }
    }
}

/// Read-only copy of the pagination state for the rendering layer.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub postings: Vec<JobPosting>,
    pub next_page: u32,
    pub has_more: bool,
    pub is_loading: bool,
}

/// Owns the accumulated result list and the page cursor. All mutation
/// goes through `reset` and `load_next`; everyone else reads snapshots.
///
/// Single-threaded cooperative model: state sits in a RefCell and no
/// borrow is held across an await, so the `is_loading` flag alone is
/// enough to keep at most one fetch eligible to mutate the list.
pub struct PaginationController<F: JobFetcher> {
    fetcher: F,
    state: RefCell<PaginationState>,
}

impl<F: JobFetcher> PaginationController<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            state: RefCell::new(PaginationState::fresh(0)),
        }
    }

    /// Discards everything and immediately loads page 1 for the given
    /// criteria. Any fetch still in flight is invalidated by the
    /// generation bump and will be dropped when it resolves.
    pub async fn reset(&self, criteria: &FilterCriteria) {
        {
            let mut state = self.state.borrow_mut();
            let generation = state.generation + 1;
            *state = PaginationState::fresh(generation);
        }
        self.load_next(criteria).await;
    }

    /// Fetches the next page and merges it in. No-op while a load is in
    /// flight or once the result set is exhausted.
    pub async fn load_next(&self, criteria: &FilterCriteria) {
        let (page, generation) = {
            let mut state = self.state.borrow_mut();
            if state.is_loading || !state.has_more {
                return;
            }
            state.is_loading = true;
            (state.current_page, state.generation)
        };

        let result = self.fetcher.fetch_page(criteria, page).await;

        let mut state = self.state.borrow_mut();
        if state.generation != generation {
            // A reset superseded this request while it was in flight.
            // Its postings belong to an abandoned filter set, and the
            // loading flag now belongs to the newer generation.
            log::debug!("discarding stale response for page {page}");
            return;
        }

        match result {
            Ok(PageResult { postings, .. }) => {
                state.has_more = postings.len() == PAGE_SIZE;
                state.accumulated.extend(postings);
                state.current_page += 1;
                state.is_loading = false;
            }
            Err(err) => {
                // Leave has_more and the accumulated list untouched so
                // another scroll can retry the same page.
                log::warn!("failed to load page {page}: {err}");
                state.is_loading = false;
            }
        }
    }

    pub fn phase(&self) -> LoadPhase {
        let state = self.state.borrow();
        if state.is_loading {
            LoadPhase::Loading
        } else if !state.has_more {
            LoadPhase::Exhausted
        } else {
            LoadPhase::Idle
        }
    }

    pub fn has_more(&self) -> bool {
        self.state.borrow().has_more
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.borrow();
        FeedSnapshot {
            postings: state.accumulated.clone(),
            next_page: state.current_page,
            has_more: state.has_more,
            is_loading: state.is_loading,
        }
    }
}
