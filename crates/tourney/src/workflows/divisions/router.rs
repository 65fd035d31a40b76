use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use super::domain::{DivisionDraft, MatchDetailsPatch};
use super::scores::score_from_json;
use super::service::DivisionService;
use crate::http::{error_response, found_or_404, listed, store_failure};
use crate::ids::{DivisionId, MatchId, TeamId, TournamentId};
use crate::registry::TeamDirectory;
use crate::store::RecordStore;
use crate::workflows::schedule::{
    distinct_days, distinct_fields, render_csv, ScheduleFilter, ScheduleRow, Visibility,
};

type SharedService<S, D> = Arc<DivisionService<S, D>>;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateDivisionRequest {
    #[serde(default)]
    pub(crate) tier: String,
    #[serde(default)]
    pub(crate) pool: String,
    #[serde(default)]
    pub(crate) name: String,
}

/// Raw score cells as typed by the director; normalized before they reach the service.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScoreRequest {
    #[serde(default)]
    pub(crate) a_score: Value,
    #[serde(default)]
    pub(crate) b_score: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishRequest {
    pub(crate) published: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicSchedule {
    pub(crate) rows: Vec<ScheduleRow>,
    pub(crate) fields: Vec<String>,
    pub(crate) days: Vec<NaiveDate>,
}

/// Director-facing routes: division setup, fixtures, results and the full schedule.
pub fn division_router<S, D>(service: SharedService<S, D>) -> Router
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/tournaments/:tournament_id/divisions",
            post(create_handler::<S, D>).get(list_handler::<S, D>),
        )
        .route(
            "/api/v1/tournaments/:tournament_id/schedule",
            get(schedule_handler::<S, D>),
        )
        .route(
            "/api/v1/tournaments/:tournament_id/schedule.csv",
            get(schedule_csv_handler::<S, D>),
        )
        .route("/api/v1/divisions/:division_id", get(get_handler::<S, D>))
        .route(
            "/api/v1/divisions/:division_id/teams/:team_id",
            put(add_team_handler::<S, D>).delete(remove_team_handler::<S, D>),
        )
        .route(
            "/api/v1/divisions/:division_id/fixtures",
            post(fixtures_handler::<S, D>),
        )
        .route(
            "/api/v1/divisions/:division_id/published",
            put(publish_handler::<S, D>),
        )
        .route(
            "/api/v1/divisions/:division_id/matches/:match_id",
            patch(match_details_handler::<S, D>),
        )
        .route(
            "/api/v1/divisions/:division_id/matches/:match_id/score",
            put(score_handler::<S, D>).delete(clear_score_handler::<S, D>),
        )
        .route(
            "/api/v1/divisions/:division_id/standings",
            get(standings_handler::<S, D>),
        )
        .with_state(service)
}

/// Read-only routes for spectators and parents. Unpublished divisions never appear.
pub fn public_router<S, D>(service: SharedService<S, D>) -> Router
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/public/tournaments/:tournament_id/divisions",
            get(public_divisions_handler::<S, D>),
        )
        .route(
            "/api/v1/public/tournaments/:tournament_id/standings",
            get(public_standings_handler::<S, D>),
        )
        .route(
            "/api/v1/public/tournaments/:tournament_id/schedule",
            get(public_schedule_handler::<S, D>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(tournament_id): Path<String>,
    Json(request): Json<CreateDivisionRequest>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    let draft = DivisionDraft {
        tournament_id: TournamentId(tournament_id),
        tier: request.tier,
        pool: request.pool,
        name: request.name,
    };
    match service.create_division(draft) {
        Ok(division) => (StatusCode::CREATED, Json(division)).into_response(),
        Err(err) => store_failure(err),
    }
}

pub(crate) async fn list_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(tournament_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    listed(service.list_by_tournament(&TournamentId(tournament_id)))
}

pub(crate) async fn get_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(division_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(service.get(&DivisionId(division_id)), "division")
}

pub(crate) async fn add_team_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((division_id, team_id)): Path<(String, String)>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(
        service.add_team(&DivisionId(division_id), &TeamId(team_id)),
        "division or team",
    )
}

pub(crate) async fn remove_team_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((division_id, team_id)): Path<(String, String)>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(
        service.remove_team(&DivisionId(division_id), &TeamId(team_id)),
        "division",
    )
}

pub(crate) async fn fixtures_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(division_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(
        service.generate_round_robin(&DivisionId(division_id)),
        "division",
    )
}

pub(crate) async fn publish_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(division_id): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(
        service.set_published(&DivisionId(division_id), request.published),
        "division",
    )
}

pub(crate) async fn score_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((division_id, match_id)): Path<(String, String)>,
    Json(request): Json<ScoreRequest>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(
        service.set_match_score(
            &DivisionId(division_id),
            &MatchId(match_id),
            score_from_json(&request.a_score),
            score_from_json(&request.b_score),
        ),
        "division or match",
    )
}

pub(crate) async fn clear_score_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((division_id, match_id)): Path<(String, String)>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(
        service.clear_match_score(&DivisionId(division_id), &MatchId(match_id)),
        "division or match",
    )
}

pub(crate) async fn match_details_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((division_id, match_id)): Path<(String, String)>,
    Json(patch): Json<MatchDetailsPatch>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(
        service.set_match_details(&DivisionId(division_id), &MatchId(match_id), patch),
        "division or match",
    )
}

pub(crate) async fn standings_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(division_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    found_or_404(service.standings(&DivisionId(division_id)), "division")
}

pub(crate) async fn schedule_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(tournament_id): Path<String>,
    Query(filter): Query<ScheduleFilter>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    listed(
        service
            .schedule(&TournamentId(tournament_id), Visibility::All)
            .map(|rows| filter.apply(rows, Utc::now())),
    )
}

pub(crate) async fn schedule_csv_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(tournament_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    let rows = match service.schedule(&TournamentId(tournament_id), Visibility::All) {
        Ok(rows) => rows,
        Err(err) => return store_failure(err),
    };

    match render_csv(&rows) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "schedule export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub(crate) async fn public_divisions_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(tournament_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    listed(service.list_published_by_tournament(&TournamentId(tournament_id)))
}

pub(crate) async fn public_standings_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(tournament_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    listed(service.published_standings(&TournamentId(tournament_id)))
}

pub(crate) async fn public_schedule_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(tournament_id): Path<String>,
    Query(filter): Query<ScheduleFilter>,
) -> Response
where
    S: RecordStore + 'static,
    D: TeamDirectory + 'static,
{
    match service.schedule(&TournamentId(tournament_id), Visibility::PublishedOnly) {
        Ok(all_rows) => {
            let schedule = PublicSchedule {
                fields: distinct_fields(&all_rows),
                days: distinct_days(&all_rows),
                rows: filter.apply(all_rows, Utc::now()),
            };
            (StatusCode::OK, Json(schedule)).into_response()
        }
        Err(err) => store_failure(err),
    }
}
