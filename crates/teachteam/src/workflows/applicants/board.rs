//! Lecturer review board: the applicant repository plus the confirmed list.
//!
//! Applicants move Pending → Confirmed → Pending any number of times. The confirmed list only
//! stores identifiers; `finalSelected` is written as snapshots of the repository records so a
//! reload sees the current rank and comment.

use tracing::{debug, info, warn};

use super::domain::{Applicant, ApplicantId, ApplicationSubmission, Rank};
use super::repository::{ApplicantRepository, RepositoryError};
use super::stats::ApplicantStats;
use super::view::{self, FilterCriteria, SortKey};
use crate::store::{self, KeyValueStore, StoreError, FINAL_SELECTED_KEY};

/// Result of a confirm request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed { acknowledgment: String },
    AlreadyConfirmed,
}

pub struct ReviewBoard<S> {
    repository: ApplicantRepository<S>,
    confirmed: Vec<ApplicantId>,
    store: S,
    revision: u64,
    stats: Option<(u64, ApplicantStats)>,
}

impl<S> ReviewBoard<S>
where
    S: KeyValueStore + Clone,
{
    /// Load both collections and repair the confirmed list against the repository.
    pub fn load(store: S) -> Self {
        let mut repository = ApplicantRepository::load(store.clone());
        let snapshots: Vec<Applicant> = store::load_collection(&store, FINAL_SELECTED_KEY);

        let mut confirmed = Vec::with_capacity(snapshots.len());
        let mut repaired = false;
        for snapshot in snapshots {
            if !repository.contains(snapshot.id) {
                warn!(id = %snapshot.id, "dropping confirmed entry with no matching applicant");
                repaired = true;
                continue;
            }
            if confirmed.contains(&snapshot.id) {
                repaired = true;
                continue;
            }
            if repository.get(snapshot.id).is_some_and(|record| !record.is_selected) {
                repaired = true;
                if let Err(err) = repository.set_selected(snapshot.id, true) {
                    warn!(id = %snapshot.id, error = %err, "failed to restore selection flag");
                }
            }
            confirmed.push(snapshot.id);
        }

        let board = Self {
            repository,
            confirmed,
            store,
            revision: 0,
            stats: None,
        };

        if repaired {
            if let Err(err) = board.persist_all() {
                warn!(error = %err, "failed to persist repaired review board");
            }
        }

        debug!(
            applicants = board.repository.len(),
            confirmed = board.confirmed.len(),
            "review board loaded"
        );
        board
    }

    pub fn submit(&mut self, submission: &ApplicationSubmission) -> Result<Applicant, ReviewError> {
        let before = self.repository.len();
        let added = self.repository.add(submission);
        if self.repository.len() != before {
            self.touch();
        }
        let record = added?;
        info!(id = %record.id, course = %record.course, "tutor application submitted");
        Ok(record)
    }

    /// Flip the selection checkbox of a pending applicant.
    ///
    /// Returns the resulting flag, or `None` for unknown ids. Confirmed applicants keep their
    /// flag; they leave the confirmed list through [`ReviewBoard::unconfirm`].
    pub fn toggle_selected(&mut self, id: ApplicantId) -> Result<Option<bool>, ReviewError> {
        if self.is_confirmed(id) {
            debug!(%id, "ignoring selection toggle on confirmed applicant");
            return Ok(Some(true));
        }
        let toggled = self.repository.toggle_selected(id);
        if !matches!(toggled, Ok(None)) {
            self.touch();
        }
        Ok(toggled?)
    }

    /// Returns `false` when the id is unknown.
    pub fn set_rank(&mut self, id: ApplicantId, rank: Rank) -> Result<bool, ReviewError> {
        let updated = self.repository.set_rank(id, rank);
        self.after_record_change(id, updated)
    }

    /// Returns `false` when the id is unknown.
    pub fn set_comment(
        &mut self,
        id: ApplicantId,
        comment: impl Into<String>,
    ) -> Result<bool, ReviewError> {
        let updated = self.repository.set_comment(id, comment);
        self.after_record_change(id, updated)
    }

    /// Move an applicant to the confirmed list. Confirming twice is a no-op.
    pub fn confirm(&mut self, id: ApplicantId) -> Result<ConfirmOutcome, ReviewError> {
        if self.is_confirmed(id) {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }
        let Some(applicant) = self.repository.get(id) else {
            return Err(ReviewError::NotFound(id));
        };
        let acknowledgment = format!("{} has been confirmed!", applicant.full_name());

        self.confirmed.push(id);
        self.touch();
        self.repository.set_selected(id, true)?;
        self.persist_confirmed()?;

        info!(%id, "{acknowledgment}");
        Ok(ConfirmOutcome::Confirmed { acknowledgment })
    }

    /// Move an applicant back to pending. Returns `false` if it was not confirmed.
    pub fn unconfirm(&mut self, id: ApplicantId) -> Result<bool, ReviewError> {
        let Some(position) = self.confirmed.iter().position(|confirmed| *confirmed == id) else {
            return Ok(false);
        };

        self.confirmed.remove(position);
        self.touch();
        self.repository.set_selected(id, false)?;
        self.persist_confirmed()?;

        info!(%id, "applicant removed from confirmed list");
        Ok(true)
    }

    pub fn applicants(&self) -> &[Applicant] {
        self.repository.all()
    }

    pub fn applicant(&self, id: ApplicantId) -> Option<&Applicant> {
        self.repository.get(id)
    }

    pub fn confirmed_ids(&self) -> &[ApplicantId] {
        &self.confirmed
    }

    /// Confirmed applicants in confirmation order.
    pub fn confirmed(&self) -> Vec<&Applicant> {
        self.confirmed
            .iter()
            .filter_map(|id| self.repository.get(*id))
            .collect()
    }

    pub fn is_confirmed(&self, id: ApplicantId) -> bool {
        self.confirmed.contains(&id)
    }

    /// Every confirmed applicant carries the selection flag in the repository.
    pub fn is_consistent(&self) -> bool {
        self.confirmed.iter().all(|id| {
            self.repository
                .get(*id)
                .is_some_and(|record| record.is_selected)
        })
    }

    pub fn pending_view(&self, criteria: &FilterCriteria, sort: Option<SortKey>) -> Vec<&Applicant> {
        view::pending_view(self.repository.all(), &self.confirmed, criteria, sort)
    }

    pub fn confirmed_view(&self, criteria: &FilterCriteria) -> Vec<&Applicant> {
        view::confirmed_view(self.confirmed(), criteria)
    }

    /// Summary recomputed after every mutation.
    pub fn statistics(&mut self) -> &ApplicantStats {
        let revision = self.revision;
        if !matches!(&self.stats, Some((cached, _)) if *cached == revision) {
            self.stats = None;
        }
        let (_, stats) = self.stats.get_or_insert_with(|| {
            (
                revision,
                ApplicantStats::compute(self.repository.all(), &self.confirmed),
            )
        });
        stats
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A repository error still means the record changed in memory.
    fn after_record_change(
        &mut self,
        id: ApplicantId,
        updated: Result<bool, RepositoryError>,
    ) -> Result<bool, ReviewError> {
        if matches!(updated, Ok(false)) {
            return Ok(false);
        }
        self.touch();
        updated?;
        if self.is_confirmed(id) {
            self.persist_confirmed()?;
        }
        Ok(true)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn persist_confirmed(&self) -> Result<(), ReviewError> {
        let snapshots = self.confirmed();
        store::save_value(&self.store, FINAL_SELECTED_KEY, &snapshots).map_err(|err| {
            warn!(error = %err, "failed to persist confirmed applicants");
            ReviewError::Store(err)
        })
    }

    fn persist_all(&self) -> Result<(), ReviewError> {
        self.repository.persist()?;
        self.persist_confirmed()
    }
}

/// Error raised by review board operations.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("applicant {0} not found")]
    NotFound(ApplicantId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
