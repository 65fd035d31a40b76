//! Roster hand-off: a coach sends a team's roster to a tournament director.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::http::{error_response, listed, store_failure};
use crate::ids::{RosterId, TeamId, TournamentId};
use crate::store::{Collection, Record, RecordStore, Repository, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSubmission {
    pub id: RosterId,
    pub team_id: TeamId,
    pub tournament_id: TournamentId,
    pub coach_email: String,
    pub to_email: String,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Record for RosterSubmission {
    const COLLECTION: Collection = Collection::Rosters;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDraft {
    pub team_id: TeamId,
    pub tournament_id: TournamentId,
    pub coach_email: String,
    pub to_email: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RosterService<S> {
    rosters: Repository<S, RosterSubmission>,
}

impl<S: RecordStore> RosterService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            rosters: Repository::new(store),
        }
    }

    pub fn submit(&self, draft: RosterDraft) -> Result<RosterSubmission, RosterError> {
        let required = [
            ("team_id", draft.team_id.as_str()),
            ("tournament_id", draft.tournament_id.as_str()),
            ("coach_email", draft.coach_email.as_str()),
            ("to_email", draft.to_email.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RosterError::MissingField(*field));
        }

        let roster = self.rosters.insert(RosterSubmission {
            id: RosterId::generate(),
            team_id: draft.team_id,
            tournament_id: draft.tournament_id,
            coach_email: draft.coach_email.trim().to_string(),
            to_email: draft.to_email.trim().to_string(),
            note: draft.note,
            created_at: Utc::now(),
        })?;
        info!(
            roster_id = %roster.id,
            team_id = %roster.team_id,
            to = %roster.to_email,
            "roster submitted"
        );
        Ok(roster)
    }

    /// Submissions addressed to a director, newest first.
    pub fn list_for_director(&self, to_email: &str) -> Result<Vec<RosterSubmission>, StoreError> {
        self.rosters.list(|roster| roster.to_email == to_email)
    }

    pub fn list_by_coach(&self, coach_email: &str) -> Result<Vec<RosterSubmission>, StoreError> {
        self.rosters.list(|roster| roster.coach_email == coach_email)
    }
}

pub fn roster_router<S>(service: Arc<RosterService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/rosters", post(submit_handler::<S>))
        .route(
            "/api/v1/directors/:director_email/rosters",
            get(director_handler::<S>),
        )
        .route(
            "/api/v1/coaches/:coach_email/rosters",
            get(coach_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<RosterService<S>>>,
    Json(draft): Json<RosterDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.submit(draft) {
        Ok(roster) => (StatusCode::ACCEPTED, Json(roster)).into_response(),
        Err(RosterError::MissingField(field)) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("{field} is required"),
        ),
        Err(RosterError::Store(err)) => store_failure(err),
    }
}

async fn director_handler<S>(
    State(service): State<Arc<RosterService<S>>>,
    Path(director_email): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    listed(service.list_for_director(&director_email))
}

async fn coach_handler<S>(
    State(service): State<Arc<RosterService<S>>>,
    Path(coach_email): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    listed(service.list_by_coach(&coach_email))
}
