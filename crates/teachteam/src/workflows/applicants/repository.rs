use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};

use super::domain::{Applicant, ApplicantId, ApplicationSubmission, Rank, ValidationError};
use crate::store::{self, KeyValueStore, StoreError, TUTOR_APPLICATIONS_KEY};

/// Ordered in-memory applicant collection, written through to the store on every mutation.
///
/// A failed write leaves the mutation applied in memory and returns the store error, so the two
/// copies can diverge until the next successful write.
#[derive(Debug)]
pub struct ApplicantRepository<S> {
    store: S,
    records: Vec<Applicant>,
}

impl<S> ApplicantRepository<S>
where
    S: KeyValueStore,
{
    /// Hydrate from `tutorApplications`. Malformed data loads as an empty collection and
    /// duplicate identifiers keep their first occurrence.
    pub fn load(store: S) -> Self {
        let loaded: Vec<Applicant> = store::load_collection(&store, TUTOR_APPLICATIONS_KEY);
        let mut seen = HashSet::with_capacity(loaded.len());
        let mut records = Vec::with_capacity(loaded.len());
        for record in loaded {
            if seen.insert(record.id) {
                records.push(record);
            } else {
                warn!(id = %record.id, "dropping applicant with duplicate identifier");
            }
        }

        debug!(count = records.len(), "applicant repository loaded");
        Self { store, records }
    }

    /// Validate and append a new applicant with a fresh identifier.
    pub fn add(&mut self, submission: &ApplicationSubmission) -> Result<Applicant, RepositoryError> {
        let validated = submission.validate()?;
        let record = Applicant {
            id: self.next_id()?,
            first_name: validated.first_name,
            last_name: validated.last_name,
            course: validated.course,
            availability: validated.availability,
            skills: validated.skills,
            academic_credentials: validated.academic_credentials,
            previous_roles: validated.previous_roles,
            is_selected: false,
            rank: None,
            comment: None,
        };

        self.records.push(record.clone());
        self.persist()?;
        Ok(record)
    }

    /// Flip the selection flag. Returns the new flag, or `None` when the id is unknown.
    pub fn toggle_selected(&mut self, id: ApplicantId) -> Result<Option<bool>, RepositoryError> {
        let Some(record) = self.find_mut(id) else {
            return Ok(None);
        };
        record.is_selected = !record.is_selected;
        let flag = record.is_selected;
        self.persist()?;
        Ok(Some(flag))
    }

    /// Returns `false` when the id is unknown.
    pub fn set_rank(&mut self, id: ApplicantId, rank: Rank) -> Result<bool, RepositoryError> {
        self.mutate(id, |record| record.rank = Some(rank))
    }

    /// Returns `false` when the id is unknown.
    pub fn set_comment(
        &mut self,
        id: ApplicantId,
        comment: impl Into<String>,
    ) -> Result<bool, RepositoryError> {
        let comment = comment.into();
        self.mutate(id, |record| record.comment = Some(comment))
    }

    pub(crate) fn set_selected(
        &mut self,
        id: ApplicantId,
        selected: bool,
    ) -> Result<bool, RepositoryError> {
        self.mutate(id, |record| record.is_selected = selected)
    }

    pub fn all(&self) -> &[Applicant] {
        &self.records
    }

    pub fn get(&self, id: ApplicantId) -> Option<&Applicant> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: ApplicantId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-serialize the full collection.
    pub fn persist(&self) -> Result<(), RepositoryError> {
        store::save_value(&self.store, TUTOR_APPLICATIONS_KEY, &self.records).map_err(|err| {
            warn!(error = %err, "failed to persist tutor applications");
            RepositoryError::Store(err)
        })
    }

    fn mutate(
        &mut self,
        id: ApplicantId,
        apply: impl FnOnce(&mut Applicant),
    ) -> Result<bool, RepositoryError> {
        let Some(record) = self.find_mut(id) else {
            return Ok(false);
        };
        apply(record);
        self.persist()?;
        Ok(true)
    }

    fn find_mut(&mut self, id: ApplicantId) -> Option<&mut Applicant> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Current time in milliseconds, bumped past the largest existing id.
    fn next_id(&self) -> Result<ApplicantId, RepositoryError> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let floor = match self.records.iter().map(|record| record.id.0).max() {
            Some(largest) => largest
                .checked_add(1)
                .ok_or(RepositoryError::IdentifierSpaceExhausted)?,
            None => 0,
        };
        Ok(ApplicantId(now.max(floor)))
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no applicant identifiers left after {}", u64::MAX)]
    IdentifierSpaceExhausted,
}
