use serde::{Deserialize, Serialize};

/// Fixed number of postings requested per page.
pub const PAGE_SIZE: usize = 10;

/// Company descriptions are shown truncated to this many characters,
/// with an expand control for the rest.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 400;

/// One job posting as returned by the search endpoint. Immutable once
/// received; the numeric salary/experience fields arrive as JSON null
/// for some postings and are read back as 0 through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub min_exp: Option<u32>,
    #[serde(default)]
    pub min_jd_salary: Option<u32>,
    #[serde(default)]
    pub max_jd_salary: Option<u32>,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub job_details_from_company: String,
}

impl JobPosting {
    pub fn min_experience_years(&self) -> u32 {
        self.min_exp.unwrap_or(0)
    }

    pub fn min_salary_lpa(&self) -> u32 {
        self.min_jd_salary.unwrap_or(0)
    }

    pub fn max_salary_lpa(&self) -> u32 {
        self.max_jd_salary.unwrap_or(0)
    }

    /// First 400 characters of the company description, cut on a char
    /// boundary, plus whether anything was cut off.
    pub fn description_preview(&self) -> (&str, bool) {
        let text = &self.job_details_from_company;
        match text.char_indices().nth(DESCRIPTION_PREVIEW_CHARS) {
            Some((byte_idx, _)) => (&text[..byte_idx], true),
            None => (text.as_str(), false),
        }
    }
}

/// The postings returned for a single page request.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub postings: Vec<JobPosting>,
    pub requested_page: u32,
}

impl PageResult {
    /// A short page (fewer postings than the page size) marks the end
    /// of the result set.
    pub fn is_short(&self) -> bool {
        self.postings.len() < PAGE_SIZE
    }
}
