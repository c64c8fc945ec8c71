use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::FilterCriteria;
use crate::models::{JobPosting, PAGE_SIZE, PageResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.weekday.technology/adhoc/getSampleJdJSON";

/// Why a page fetch produced no data. Both kinds are recovered locally:
/// the pagination state is left untouched so a later scroll can retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network request failed: {0}")]
    Network(String),

    #[error("malformed search response: {0}")]
    Decode(String),
}

/// Seam between the pagination engine and the network, so the engine can
/// be driven by scripted fetchers in tests.
pub trait JobFetcher {
    fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> impl Future<Output = Result<PageResult, FetchError>>;
}

/// JSON body sent with each page request. Built fresh from an immutable
/// criteria snapshot on every call; there is no shared request state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub limit: usize,
    pub offset: usize,
    pub role: String,
    pub location: String,
    pub experiences: String,
    pub remote: String,
    pub salary: String,
    pub company: String,
    pub search_term: String,
}

impl SearchRequest {
    pub fn new(criteria: &FilterCriteria, page: u32) -> Self {
        Self {
            limit: PAGE_SIZE,
            offset: (page.saturating_sub(1) as usize) * PAGE_SIZE,
            role: criteria.role.as_str().to_string(),
            location: criteria.location.clone(),
            experiences: optional_number(criteria.min_experience),
            // No control is bound to the remote dimension yet; the server
            // expects the field regardless.
            remote: String::new(),
            salary: optional_number(criteria.min_salary),
            company: String::new(),
            search_term: criteria.company_search.clone(),
        }
    }
}

/// Query parameters mirroring the filter fields; the server reads the
/// page cursor from here rather than from the body offset.
pub fn query_params(criteria: &FilterCriteria, page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.to_string()),
        ("role", criteria.role.as_str().to_string()),
        ("employees", criteria.location.clone()),
        ("experience", optional_number(criteria.min_experience)),
        ("salary", optional_number(criteria.min_salary)),
        ("searchTerm", criteria.company_search.clone()),
    ]
}

fn optional_number(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, rename = "jdList")]
    jd_list: Option<Vec<JobPosting>>,
}

/// Stateless client for the paginated search endpoint. One request per
/// call; retry policy, if any, belongs to the caller.
#[derive(Debug, Clone)]
pub struct SearchClient {
    endpoint: String,
    client: reqwest::Client,
}

impl SearchClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JobFetcher for SearchClient {
    async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<PageResult, FetchError> {
        let body = SearchRequest::new(criteria, page);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&query_params(criteria, page))
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        // A missing or null jdList means the same as an empty page:
        // the result set is exhausted.
        Ok(PageResult {
            postings: parsed.jd_list.unwrap_or_default(),
            requested_page: page,
        })
    }
}
