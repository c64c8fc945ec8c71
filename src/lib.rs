pub mod client;
pub mod feed;
pub mod filter;
pub mod models;
pub mod pager;
pub mod trigger;

pub use client::{FetchError, JobFetcher, SearchClient};
pub use feed::JobFeed;
pub use filter::{FilterCriteria, FilterField, FilterState, Role};
pub use models::{JobPosting, PAGE_SIZE, PageResult};
pub use pager::{FeedSnapshot, LoadPhase, PaginationController};
pub use trigger::{Subscription, ViewportTrigger};
