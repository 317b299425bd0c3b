use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::board::ConfirmOutcome;
use super::domain::{Applicant, ApplicantId, ApplicationSubmission, Availability};
use super::service::{ApplicantService, ApplicantServiceError};
use super::stats::ApplicantStats;
use super::view::{CourseFilter, FilterCriteria, SortKey};
use crate::store::KeyValueStore;
use crate::workflows::accounts::AccessError;

/// Router builder exposing tutor intake and the lecturer review dashboard.
pub fn applicant_router<S>(service: Arc<ApplicantService<S>>) -> Router
where
    S: KeyValueStore + Clone + 'static,
{
    Router::new()
        .route(
            "/api/v1/applicants",
            post(submit_handler::<S>).get(dashboard_handler::<S>),
        )
        .route("/api/v1/applicants/stats", get(stats_handler::<S>))
        .route(
            "/api/v1/applicants/:applicant_id/toggle",
            post(toggle_handler::<S>),
        )
        .route("/api/v1/applicants/:applicant_id/rank", put(rank_handler::<S>))
        .route(
            "/api/v1/applicants/:applicant_id/comment",
            put(comment_handler::<S>),
        )
        .route(
            "/api/v1/applicants/:applicant_id/confirm",
            post(confirm_handler::<S>).delete(unconfirm_handler::<S>),
        )
        .with_state(service)
}

/// Dashboard query string. Empty values mean "no filter".
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DashboardQuery {
    course: Option<String>,
    availability: Option<String>,
    skill: Option<String>,
    name: Option<String>,
    sort: Option<String>,
    show_pending: Option<bool>,
    show_confirmed: Option<bool>,
}

impl DashboardQuery {
    fn into_parts(self) -> Result<(FilterCriteria, Option<SortKey>), String> {
        let availability = match self.availability.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Availability>().map_err(|err| err.to_string())?),
        };
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<SortKey>().map_err(|err| err.to_string())?),
        };

        let criteria = FilterCriteria {
            course: self
                .course
                .as_deref()
                .map_or(CourseFilter::All, CourseFilter::parse),
            availability,
            skill: self.skill.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            show_pending: self.show_pending.unwrap_or(true),
            show_confirmed: self.show_confirmed.unwrap_or(true),
        };
        Ok((criteria, sort))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    rank: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentRequest {
    comment: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionView {
    id: ApplicantId,
    is_selected: bool,
}

#[derive(Debug, Serialize)]
struct StatsView {
    #[serde(flatten)]
    stats: ApplicantStats,
    most_chosen_label: String,
    least_chosen_label: String,
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<ApplicantService<S>>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    match service.submit(&submission) {
        Ok(record) => {
            let message = format!("You have successfully applied for {}.", record.course);
            (
                StatusCode::CREATED,
                Json(json!({ "applicant": record, "message": message })),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<ApplicantService<S>>>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    let (criteria, sort) = match query.into_parts() {
        Ok(parts) => parts,
        Err(message) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    };

    match service.dashboard(&criteria, sort) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn toggle_handler<S>(
    State(service): State<Arc<ApplicantService<S>>>,
    Path(applicant_id): Path<u64>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    let id = ApplicantId(applicant_id);
    match service.toggle_selected(id) {
        Ok(is_selected) => (StatusCode::OK, Json(SelectionView { id, is_selected })).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rank_handler<S>(
    State(service): State<Arc<ApplicantService<S>>>,
    Path(applicant_id): Path<u64>,
    Json(request): Json<RankRequest>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    applicant_response(service.set_rank(ApplicantId(applicant_id), request.rank))
}

pub(crate) async fn comment_handler<S>(
    State(service): State<Arc<ApplicantService<S>>>,
    Path(applicant_id): Path<u64>,
    Json(request): Json<CommentRequest>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    applicant_response(service.set_comment(ApplicantId(applicant_id), request.comment))
}

pub(crate) async fn confirm_handler<S>(
    State(service): State<Arc<ApplicantService<S>>>,
    Path(applicant_id): Path<u64>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    match service.confirm(ApplicantId(applicant_id)) {
        Ok(ConfirmOutcome::Confirmed { acknowledgment }) => (
            StatusCode::OK,
            Json(json!({ "status": "confirmed", "message": acknowledgment })),
        )
            .into_response(),
        Ok(ConfirmOutcome::AlreadyConfirmed) => (
            StatusCode::OK,
            Json(json!({ "status": "already_confirmed" })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn unconfirm_handler<S>(
    State(service): State<Arc<ApplicantService<S>>>,
    Path(applicant_id): Path<u64>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    match service.unconfirm(ApplicantId(applicant_id)) {
        Ok(removed) => (StatusCode::OK, Json(json!({ "removed": removed }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<S>(State(service): State<Arc<ApplicantService<S>>>) -> Response
where
    S: KeyValueStore + Clone + 'static,
{
    match service.statistics() {
        Ok(stats) => {
            let view = StatsView {
                most_chosen_label: stats.describe_most_chosen(),
                least_chosen_label: stats.describe_least_chosen(),
                stats,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn applicant_response(result: Result<Applicant, ApplicantServiceError>) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(error: ApplicantServiceError) -> Response {
    match &error {
        ApplicantServiceError::Access(access) => {
            let status = match access {
                AccessError::NotSignedIn => StatusCode::UNAUTHORIZED,
                AccessError::WrongRole { .. } => StatusCode::FORBIDDEN,
            };
            let payload = json!({
                "error": access.to_string(),
                "redirect": access.redirect(),
            });
            (status, Json(payload)).into_response()
        }
        ApplicantServiceError::Validation(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
        ApplicantServiceError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
        ApplicantServiceError::Review(_) | ApplicantServiceError::Unavailable(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}
