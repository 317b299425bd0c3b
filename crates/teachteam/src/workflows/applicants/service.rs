use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use super::board::{ConfirmOutcome, ReviewBoard, ReviewError};
use super::domain::{Applicant, ApplicantId, ApplicationSubmission, Rank, ValidationError};
use super::repository::RepositoryError;
use super::stats::ApplicantStats;
use super::view::{FilterCriteria, SortKey};
use crate::store::KeyValueStore;
use crate::workflows::accounts::{AccessError, Role, SessionGate};

/// Lecturer dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub pending: Vec<Applicant>,
    pub confirmed: Vec<Applicant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Role-gated facade over the review board shared by HTTP handlers.
///
/// The board is loaded from the store on the first request that passes the gate.
pub struct ApplicantService<S> {
    gate: SessionGate<S>,
    store: S,
    board: Mutex<Option<ReviewBoard<S>>>,
}

impl<S> ApplicantService<S>
where
    S: KeyValueStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            gate: SessionGate::new(store.clone()),
            store,
            board: Mutex::new(None),
        }
    }

    /// Tutor submission.
    pub fn submit(
        &self,
        submission: &ApplicationSubmission,
    ) -> Result<Applicant, ApplicantServiceError> {
        self.with_board(Role::Tutor, |board| Ok(board.submit(submission)?))
    }

    pub fn dashboard(
        &self,
        criteria: &FilterCriteria,
        sort: Option<SortKey>,
    ) -> Result<Dashboard, ApplicantServiceError> {
        self.with_board(Role::Lecturer, |board| {
            let pending: Vec<Applicant> = board
                .pending_view(criteria, sort)
                .into_iter()
                .cloned()
                .collect();
            let confirmed: Vec<Applicant> = board
                .confirmed_view(criteria)
                .into_iter()
                .cloned()
                .collect();
            let message = (pending.is_empty() && confirmed.is_empty())
                .then_some("No applicants for this course.");
            Ok(Dashboard {
                pending,
                confirmed,
                message,
            })
        })
    }

    /// Returns the new selection flag.
    pub fn toggle_selected(&self, id: ApplicantId) -> Result<bool, ApplicantServiceError> {
        self.with_board(Role::Lecturer, |board| {
            board
                .toggle_selected(id)?
                .ok_or(ApplicantServiceError::NotFound(id))
        })
    }

    pub fn set_rank(&self, id: ApplicantId, rank: i64) -> Result<Applicant, ApplicantServiceError> {
        self.with_board(Role::Lecturer, |board| {
            let rank = Rank::new(rank)?;
            if !board.set_rank(id, rank)? {
                return Err(ApplicantServiceError::NotFound(id));
            }
            current(board, id)
        })
    }

    pub fn set_comment(
        &self,
        id: ApplicantId,
        comment: String,
    ) -> Result<Applicant, ApplicantServiceError> {
        self.with_board(Role::Lecturer, |board| {
            if !board.set_comment(id, comment)? {
                return Err(ApplicantServiceError::NotFound(id));
            }
            current(board, id)
        })
    }

    pub fn confirm(&self, id: ApplicantId) -> Result<ConfirmOutcome, ApplicantServiceError> {
        self.with_board(Role::Lecturer, |board| Ok(board.confirm(id)?))
    }

    /// Returns whether the applicant was confirmed before the call.
    pub fn unconfirm(&self, id: ApplicantId) -> Result<bool, ApplicantServiceError> {
        self.with_board(Role::Lecturer, |board| Ok(board.unconfirm(id)?))
    }

    pub fn statistics(&self) -> Result<ApplicantStats, ApplicantServiceError> {
        self.with_board(Role::Lecturer, |board| Ok(board.statistics().clone()))
    }

    /// Populate an empty board with starter applications. Bypasses the role gate.
    pub fn seed_if_empty(
        &self,
        submissions: &[ApplicationSubmission],
    ) -> Result<usize, ApplicantServiceError> {
        let mut guard = self.lock()?;
        let board = guard.get_or_insert_with(|| ReviewBoard::load(self.store.clone()));
        if !board.applicants().is_empty() {
            return Ok(0);
        }
        for submission in submissions {
            board.submit(submission)?;
        }
        info!(count = submissions.len(), "seeded tutor applications");
        Ok(submissions.len())
    }

    fn with_board<T>(
        &self,
        role: Role,
        action: impl FnOnce(&mut ReviewBoard<S>) -> Result<T, ApplicantServiceError>,
    ) -> Result<T, ApplicantServiceError> {
        self.gate.require_role(role)?;
        let mut guard = self.lock()?;
        let board = guard.get_or_insert_with(|| ReviewBoard::load(self.store.clone()));
        action(board)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, Option<ReviewBoard<S>>>, ApplicantServiceError> {
        self.board
            .lock()
            .map_err(|_| ApplicantServiceError::Unavailable("review board mutex poisoned".to_string()))
    }
}

fn current<S>(board: &ReviewBoard<S>, id: ApplicantId) -> Result<Applicant, ApplicantServiceError>
where
    S: KeyValueStore + Clone,
{
    board
        .applicant(id)
        .cloned()
        .ok_or(ApplicantServiceError::NotFound(id))
}

/// Error raised by the applicant service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicantServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("applicant {0} not found")]
    NotFound(ApplicantId),
    #[error(transparent)]
    Review(ReviewError),
    #[error("review board unavailable: {0}")]
    Unavailable(String),
}

impl From<ReviewError> for ApplicantServiceError {
    fn from(value: ReviewError) -> Self {
        match value {
            ReviewError::NotFound(id) => Self::NotFound(id),
            ReviewError::Repository(RepositoryError::Validation(err)) => Self::Validation(err),
            other => Self::Review(other),
        }
    }
}
