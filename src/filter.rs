use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::models::JobPosting;

/// Role filter dimension. `All` is the sentinel for "no constraint",
/// matching the wire value the search endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    All,
    Frontend,
    Backend,
    Lead,
    Android,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::All => "all",
            Role::Frontend => "frontend",
            Role::Backend => "backend",
            Role::Lead => "lead",
            Role::Android => "android",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Role::All),
            "frontend" => Ok(Role::Frontend),
            "backend" => Ok(Role::Backend),
            "lead" | "tech lead" => Ok(Role::Lead),
            "android" => Ok(Role::Android),
            _ => Err(anyhow!(
                "Unknown role '{}'. Available: all, frontend, backend, lead, android",
                s
            )),
        }
    }
}

/// Current query parameters. Empty strings and `Role::All` mean "no
/// constraint" for that dimension; `None` likewise for the numeric ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub role: Role,
    pub location: String,
    pub min_experience: Option<u32>,
    pub min_salary: Option<u32>,
    pub company_search: String,
}

/// A single-field update to the criteria.
#[derive(Debug, Clone)]
pub enum FilterField {
    Role(Role),
    Location(String),
    MinExperience(Option<u32>),
    MinSalary(Option<u32>),
    CompanySearch(String),
}

impl FilterCriteria {
    /// Copy of the criteria with exactly one field replaced.
    pub fn with(&self, field: FilterField) -> FilterCriteria {
        let mut next = self.clone();
        match field {
            FilterField::Role(role) => next.role = role,
            FilterField::Location(location) => next.location = location,
            FilterField::MinExperience(years) => next.min_experience = years,
            FilterField::MinSalary(salary) => next.min_salary = salary,
            FilterField::CompanySearch(text) => next.company_search = text,
        }
        next
    }

    /// Re-checks a posting against the criteria locally. The server is
    /// asked to filter too, but its results are not trusted to honor
    /// every field.
    pub fn matches(&self, posting: &JobPosting) -> bool {
        if self.role != Role::All && posting.job_role != self.role.as_str() {
            return false;
        }
        if !self.location.is_empty() && posting.location != self.location {
            return false;
        }
        // Experience filters by exact years, not a minimum. Upstream
        // behavior kept as-is pending product clarification; see DESIGN.md.
        if let Some(years) = self.min_experience {
            if posting.min_exp != Some(years) {
                return false;
            }
        }
        if let Some(salary) = self.min_salary {
            if posting.min_salary_lpa() < salary {
                return false;
            }
        }
        if !self.company_search.is_empty() {
            let needle = self.company_search.to_lowercase();
            if !posting.company_name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Pure derivation of the displayed subset from the accumulated list.
pub fn visible_postings<'a>(
    accumulated: &'a [JobPosting],
    criteria: &FilterCriteria,
) -> Vec<&'a JobPosting> {
    accumulated.iter().filter(|p| criteria.matches(p)).collect()
}

/// Holds the current criteria. Each `set` replaces one field and hands
/// back the new immutable snapshot for the caller to act on (the feed
/// resets pagination with it).
#[derive(Debug, Default)]
pub struct FilterState {
    current: RefCell<FilterCriteria>,
}

impl FilterState {
    pub fn new(initial: FilterCriteria) -> Self {
        Self {
            current: RefCell::new(initial),
        }
    }

    pub fn set(&self, field: FilterField) -> FilterCriteria {
        let next = self.current.borrow().with(field);
        *self.current.borrow_mut() = next.clone();
        next
    }

    pub fn snapshot(&self) -> FilterCriteria {
        self.current.borrow().clone()
    }
}
