use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{ApplicationSubmission, AssignmentPatch};
use super::service::{ApplicationService, ApplicationServiceError};
use crate::http::{error_response, found_or_404, listed, store_failure};
use crate::ids::{ApplicationId, TournamentId};
use crate::store::RecordStore;

#[derive(Debug, Deserialize)]
pub(crate) struct ApproveRequest {
    pub(crate) pool: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    pub(crate) reason: String,
}

/// Router exposing submission, review and listing endpoints.
pub fn application_router<S>(service: Arc<ApplicationService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<S>))
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/assignment",
            patch(assignment_handler::<S>),
        )
        .route(
            "/api/v1/tournaments/:tournament_id/applications",
            get(tournament_handler::<S>),
        )
        .route(
            "/api/v1/tournaments/:tournament_id/applications/approved",
            get(approved_handler::<S>),
        )
        .route(
            "/api/v1/coaches/:coach_email/applications",
            get(coach_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.submit(submission) {
        Ok(application) => (StatusCode::ACCEPTED, Json(application)).into_response(),
        Err(ApplicationServiceError::Invalid(error)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        Err(ApplicationServiceError::Store(error)) => store_failure(error),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    found_or_404(
        service.get(&ApplicationId(application_id)),
        "application",
    )
}

pub(crate) async fn approve_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    Json(request): Json<ApproveRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    let pool = request.pool.trim();
    if pool.is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "pool must be assigned explicitly on approval",
        );
    }
    found_or_404(
        service.approve(&ApplicationId(application_id), pool),
        "application",
    )
}

pub(crate) async fn reject_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    found_or_404(
        service.reject(&ApplicationId(application_id), &request.reason),
        "application",
    )
}

pub(crate) async fn assignment_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    Json(patch): Json<AssignmentPatch>,
) -> Response
where
    S: RecordStore + 'static,
{
    found_or_404(
        service.edit_assignment(&ApplicationId(application_id), patch),
        "application",
    )
}

pub(crate) async fn tournament_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(tournament_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    listed(service.list_by_tournament(&TournamentId(tournament_id)))
}

pub(crate) async fn approved_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(tournament_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    listed(service.approved_entries(&TournamentId(tournament_id)))
}

pub(crate) async fn coach_handler<S>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(coach_email): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    listed(service.list_by_coach(&coach_email).map(|applications| {
        applications
            .iter()
            .map(|application| application.status_view())
            .collect::<Vec<_>>()
    }))
}
