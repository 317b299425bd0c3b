pub mod accounts;
pub mod applicants;
