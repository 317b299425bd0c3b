//! Tutor applications and the lecturer review workflow.
//!
//! The [`ReviewBoard`] owns the applicant repository and the confirmed list and keeps the two
//! consistent: a confirmed applicant is always selected, and never shows up in the pending view.

pub mod board;
pub mod domain;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;
pub mod stats;
pub mod view;

#[cfg(test)]
mod tests;

pub use board::{ConfirmOutcome, ReviewBoard, ReviewError};
pub use domain::{
    Applicant, ApplicantId, ApplicationSubmission, Availability, Course, CourseCode, Rank,
    ValidatedSubmission, ValidationError, COURSE_CATALOG,
};
pub use repository::{ApplicantRepository, RepositoryError};
pub use router::applicant_router;
pub use seed::default_applications;
pub use service::{ApplicantService, ApplicantServiceError, Dashboard};
pub use stats::ApplicantStats;
pub use view::{confirmed_view, pending_view, view, CourseFilter, FilterCriteria, SortKey};
