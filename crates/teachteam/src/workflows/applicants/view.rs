//! Derived dashboard views: filtering, sorting, and the pending/confirmed split.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{Applicant, ApplicantId, Availability};

/// Course filter; `All` disables it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CourseFilter {
    #[default]
    All,
    Code(String),
}

impl CourseFilter {
    pub const ALL_SENTINEL: &'static str = "ALL";

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == Self::ALL_SENTINEL {
            Self::All
        } else {
            Self::Code(trimmed.to_string())
        }
    }

    fn matches(&self, applicant: &Applicant) -> bool {
        match self {
            CourseFilter::All => true,
            CourseFilter::Code(code) => applicant.course.as_str() == code,
        }
    }
}

/// Active lecturer filters plus the pending/confirmed visibility switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub course: CourseFilter,
    pub availability: Option<Availability>,
    pub skill: String,
    pub name: String,
    pub show_pending: bool,
    pub show_confirmed: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            course: CourseFilter::All,
            availability: None,
            skill: String::new(),
            name: String::new(),
            show_pending: true,
            show_confirmed: true,
        }
    }
}

impl FilterCriteria {
    pub fn course(code: &str) -> Self {
        Self {
            course: CourseFilter::parse(code),
            ..Self::default()
        }
    }

    pub fn matches(&self, applicant: &Applicant) -> bool {
        self.course.matches(applicant)
            && self
                .availability
                .map_or(true, |availability| applicant.availability == availability)
            && skill_matches(applicant, &self.skill)
            && name_matches(applicant, &self.name)
    }
}

fn skill_matches(applicant: &Applicant, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    applicant
        .skill_tokens()
        .any(|token| token.to_lowercase().contains(&needle))
}

fn name_matches(applicant: &Applicant, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    applicant.full_name().to_lowercase().contains(&needle)
}

/// Pending list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Course,
    Availability,
}

impl SortKey {
    fn key(self, applicant: &Applicant) -> String {
        match self {
            SortKey::Course => applicant.course.as_str().to_lowercase(),
            SortKey::Availability => applicant.availability.label().to_lowercase(),
        }
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "course" => Ok(Self::Course),
            "availability" => Ok(Self::Availability),
            _ => Err(UnknownSortKey(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sort must be 'course' or 'availability', got '{}'", self.0)
    }
}

impl std::error::Error for UnknownSortKey {}

/// Filter `records`, then stable-sort by `sort` when given.
pub fn view<'a>(
    records: &'a [Applicant],
    criteria: &FilterCriteria,
    sort: Option<SortKey>,
) -> Vec<&'a Applicant> {
    let filtered = records
        .iter()
        .filter(|applicant| criteria.matches(applicant))
        .collect();
    sorted(filtered, sort)
}

/// Applicants not in `confirmed` that match `criteria`; confirmed ones never appear here.
pub fn pending_view<'a>(
    records: &'a [Applicant],
    confirmed: &[ApplicantId],
    criteria: &FilterCriteria,
    sort: Option<SortKey>,
) -> Vec<&'a Applicant> {
    if !criteria.show_pending {
        return Vec::new();
    }
    let filtered = records
        .iter()
        .filter(|applicant| !confirmed.contains(&applicant.id))
        .filter(|applicant| criteria.matches(applicant))
        .collect();
    sorted(filtered, sort)
}

/// Confirmed applicants matching `criteria`, by rank with unranked last.
pub fn confirmed_view<'a>(
    confirmed: impl IntoIterator<Item = &'a Applicant>,
    criteria: &FilterCriteria,
) -> Vec<&'a Applicant> {
    if !criteria.show_confirmed {
        return Vec::new();
    }
    let mut filtered: Vec<&Applicant> = confirmed
        .into_iter()
        .filter(|applicant| criteria.matches(applicant))
        .collect();
    filtered.sort_by_key(|applicant| applicant.rank.map_or(u8::MAX, |rank| rank.get()));
    filtered
}

fn sorted(mut applicants: Vec<&Applicant>, sort: Option<SortKey>) -> Vec<&Applicant> {
    if let Some(key) = sort {
        applicants.sort_by(|left, right| compare_by(key, left, right));
    }
    applicants
}

fn compare_by(key: SortKey, left: &Applicant, right: &Applicant) -> Ordering {
    key.key(left).cmp(&key.key(right))
}
