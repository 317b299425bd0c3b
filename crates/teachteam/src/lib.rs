//! Tutor applicant intake and lecturer review for the TeachTeam portal.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
