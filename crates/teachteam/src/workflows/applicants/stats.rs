//! Lecturer preference summary derived from the confirmed, ranked applicants.

use serde::Serialize;

use super::domain::{Applicant, ApplicantId};

/// Dashboard summary of lecturer preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantStats {
    pub most_chosen: Option<Applicant>,
    pub least_chosen: Option<Applicant>,
    pub not_selected: Vec<Applicant>,
}

impl ApplicantStats {
    /// Derive the summary from the repository snapshot and confirmed identifiers.
    ///
    /// Most/least chosen only consider confirmed applicants that carry a rank; ties keep the
    /// earliest applicant in repository order.
    pub fn compute(records: &[Applicant], confirmed: &[ApplicantId]) -> Self {
        let mut most_chosen: Option<&Applicant> = None;
        let mut least_chosen: Option<&Applicant> = None;

        for (applicant, rank) in records.iter().filter_map(|applicant| {
            let rank = applicant.rank?;
            confirmed.contains(&applicant.id).then_some((applicant, rank))
        }) {
            if most_chosen.and_then(|prev| prev.rank).map_or(true, |prev| rank < prev) {
                most_chosen = Some(applicant);
            }
            if least_chosen.and_then(|prev| prev.rank).map_or(true, |prev| rank > prev) {
                least_chosen = Some(applicant);
            }
        }

        Self {
            most_chosen: most_chosen.cloned(),
            least_chosen: least_chosen.cloned(),
            not_selected: records
                .iter()
                .filter(|applicant| !applicant.is_selected)
                .cloned()
                .collect(),
        }
    }

    pub fn describe_most_chosen(&self) -> String {
        describe(self.most_chosen.as_ref())
    }

    pub fn describe_least_chosen(&self) -> String {
        describe(self.least_chosen.as_ref())
    }
}

fn describe(applicant: Option<&Applicant>) -> String {
    match applicant {
        Some(applicant) => match applicant.rank {
            Some(rank) => format!("{} (Rank: {})", applicant.full_name(), rank.get()),
            None => applicant.full_name(),
        },
        None => "Not available".to_string(),
    }
}
