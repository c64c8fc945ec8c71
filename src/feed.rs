use crate::client::JobFetcher;
use crate::filter::{self, FilterCriteria, FilterField, FilterState};
use crate::models::JobPosting;
use crate::pager::{FeedSnapshot, LoadPhase, PaginationController};
use crate::trigger::ViewportTrigger;

/// Ties the pieces together: filter changes reset pagination, sentinel
/// visibility loads the next page, and the displayed subset is re-derived
/// from the accumulated list on every read.
pub struct JobFeed<F: JobFetcher> {
    filters: FilterState,
    pager: PaginationController<F>,
    trigger: ViewportTrigger,
}

impl<F: JobFetcher> JobFeed<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_criteria(fetcher, FilterCriteria::default())
    }

    pub fn with_criteria(fetcher: F, criteria: FilterCriteria) -> Self {
        Self {
            filters: FilterState::new(criteria),
            pager: PaginationController::new(fetcher),
            trigger: ViewportTrigger::new(),
        }
    }

    /// Initial load of page 1 under the starting criteria.
    pub async fn start(&self) {
        self.pager.reset(&self.filters.snapshot()).await;
        self.sync_trigger();
    }

    /// Applies a single-field filter change: snapshot the new criteria,
    /// re-arm the sentinel, then reset-and-reload. Any fetch still in
    /// flight for the old criteria is discarded when it resolves.
    pub async fn apply_filter(&self, field: FilterField) {
        let criteria = self.filters.set(field);
        self.trigger.attach();
        self.pager.reset(&criteria).await;
        self.sync_trigger();
    }

    /// Loads the next page for the current criteria. Safe to call from
    /// any trigger source; the pager's guards drop redundant calls.
    pub async fn load_more(&self) {
        self.pager.load_next(&self.filters.snapshot()).await;
        self.sync_trigger();
    }

    /// The sentinel observer for the rendering layer to report into and
    /// subscribe load requests on.
    pub fn trigger(&self) -> &ViewportTrigger {
        &self.trigger
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.filters.snapshot()
    }

    pub fn phase(&self) -> LoadPhase {
        self.pager.phase()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.pager.snapshot()
    }

    /// The displayed subset: accumulated postings re-checked against the
    /// current criteria, in arrival order.
    pub fn visible_postings(&self) -> Vec<JobPosting> {
        let criteria = self.filters.snapshot();
        let snapshot = self.pager.snapshot();
        filter::visible_postings(&snapshot.postings, &criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    // Once the result set is exhausted the sentinel has nothing left to
    // ask for; disconnect it until a filter change re-arms it.
    fn sync_trigger(&self) {
        if !self.pager.has_more() {
            self.trigger.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FetchError;
    use crate::filter::Role;
    use crate::models::{PAGE_SIZE, PageResult};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;
    use tokio::sync::oneshot;

    fn posting(company: &str, role: &str) -> JobPosting {
        JobPosting {
            company_name: company.to_string(),
            job_role: role.to_string(),
            location: String::new(),
            min_exp: None,
            min_jd_salary: None,
            max_jd_salary: None,
            logo_url: String::new(),
            job_details_from_company: String::new(),
        }
    }

    fn page_of(role: &str, count: usize, page_no: u32) -> Result<PageResult, FetchError> {
        Ok(PageResult {
            postings: (0..count)
                .map(|i| posting(&format!("{role}-co-{i}"), role))
                .collect(),
            requested_page: page_no,
        })
    }

    /// Serves scripted pages in order, optionally suspending a call on
    /// a gate so the test controls when it resolves.
    #[derive(Clone, Default)]
    struct QueueFetcher {
        calls: Rc<Cell<usize>>,
        results: Rc<RefCell<VecDeque<Result<PageResult, FetchError>>>>,
        gates: Rc<RefCell<VecDeque<oneshot::Receiver<()>>>>,
    }

    impl QueueFetcher {
        fn push(&self, result: Result<PageResult, FetchError>) {
            self.results.borrow_mut().push_back(result);
        }

        fn gate_next_call(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().push_back(rx);
            tx
        }
    }

    impl JobFetcher for QueueFetcher {
        async fn fetch_page(
            &self,
            _criteria: &FilterCriteria,
            page: u32,
        ) -> Result<PageResult, FetchError> {
            self.calls.set(self.calls.get() + 1);
            // Claim the scripted result at issue time so a gated call
            // keeps its page even if later calls resolve first.
            let result = self.results.borrow_mut().pop_front();
            let gate = self.gates.borrow_mut().pop_front();
            if let Some(gate) = gate {
                gate.await.expect("gate sender dropped");
            }
            result.unwrap_or_else(|| {
                Ok(PageResult {
                    postings: Vec::new(),
                    requested_page: page,
                })
            })
        }
    }

    #[tokio::test]
    async fn test_filter_change_while_page_two_in_flight() {
        // Scenario: role=all has loaded page 1 and is fetching page 2
        // when the user switches to backend. The stale page-2 response
        // resolves afterwards and must leave no trace.
        let fetcher = QueueFetcher::default();
        fetcher.push(page_of("all", PAGE_SIZE, 1));
        let feed = JobFeed::new(fetcher.clone());
        feed.start().await;
        assert_eq!(feed.snapshot().postings.len(), PAGE_SIZE);

        let stale_gate = fetcher.gate_next_call();
        fetcher.push(page_of("all", PAGE_SIZE, 2));
        fetcher.push(page_of("backend", 4, 1));

        tokio::join!(
            feed.load_more(),
            feed.apply_filter(FilterField::Role(Role::Backend)),
            async {
                stale_gate.send(()).unwrap();
            },
        );

        let snap = feed.snapshot();
        assert_eq!(snap.postings.len(), 4);
        assert!(snap.postings.iter().all(|p| p.job_role == "backend"));
        assert_eq!(feed.criteria().role, Role::Backend);
        // Page 1 of all, page 2 of all (discarded), page 1 of backend.
        assert_eq!(fetcher.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_sentinel_drives_pagination_until_exhausted() {
        let fetcher = QueueFetcher::default();
        fetcher.push(page_of("all", PAGE_SIZE, 1));
        fetcher.push(page_of("all", PAGE_SIZE, 2));
        fetcher.push(page_of("all", 3, 3));
        let feed = JobFeed::new(fetcher.clone());
        feed.start().await;

        // Render loop: the sentinel entering the viewport requests a
        // load; the loop services requests until the trigger detaches.
        let requested = Rc::new(Cell::new(false));
        let flag = requested.clone();
        let _sub = feed.trigger().subscribe(move || flag.set(true));

        while feed.trigger().is_attached() {
            feed.trigger().set_intersecting(true);
            if requested.replace(false) {
                feed.load_more().await;
            }
            feed.trigger().set_intersecting(false);
        }

        assert_eq!(feed.phase(), LoadPhase::Exhausted);
        assert_eq!(feed.snapshot().postings.len(), 2 * PAGE_SIZE + 3);
        assert_eq!(fetcher.calls.get(), 3);

        // A dangling sentinel after exhaustion requests nothing.
        feed.trigger().set_intersecting(true);
        assert!(!requested.get());
    }

    #[tokio::test]
    async fn test_filter_change_rearms_detached_trigger() {
        let fetcher = QueueFetcher::default();
        fetcher.push(page_of("all", 2, 1));
        let feed = JobFeed::new(fetcher.clone());
        feed.start().await;
        assert!(!feed.trigger().is_attached());

        fetcher.push(page_of("backend", PAGE_SIZE, 1));
        feed.apply_filter(FilterField::Role(Role::Backend)).await;
        assert!(feed.trigger().is_attached());
        assert_eq!(feed.phase(), LoadPhase::Idle);
    }

    #[tokio::test]
    async fn test_visible_postings_reapply_filters_locally() {
        // The server ignored the role filter; the local derivation must
        // still hide the mismatched postings.
        let fetcher = QueueFetcher::default();
        fetcher.push(Ok(PageResult {
            postings: vec![
                posting("Acme", "backend"),
                posting("Globex", "frontend"),
                posting("Initech", "backend"),
            ],
            requested_page: 1,
        }));
        let feed = JobFeed::with_criteria(
            fetcher,
            FilterCriteria {
                role: Role::Backend,
                ..Default::default()
            },
        );
        feed.start().await;

        assert_eq!(feed.snapshot().postings.len(), 3);
        let visible = feed.visible_postings();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|p| p.job_role == "backend"));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_feed_scrollable() {
        let fetcher = QueueFetcher::default();
        fetcher.push(page_of("all", PAGE_SIZE, 1));
        let feed = JobFeed::new(fetcher.clone());
        feed.start().await;

        fetcher.push(Err(FetchError::Network("timeout".to_string())));
        feed.load_more().await;
        assert_eq!(feed.phase(), LoadPhase::Idle);
        assert!(feed.trigger().is_attached());

        fetcher.push(page_of("all", 5, 2));
        feed.load_more().await;
        assert_eq!(feed.snapshot().postings.len(), PAGE_SIZE + 5);
        assert_eq!(feed.phase(), LoadPhase::Exhausted);
    }
}
