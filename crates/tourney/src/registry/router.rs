use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::teams::{PlayerDraft, TeamDraft, TeamRegistry};
use super::users::{Role, UserDirectory};
use crate::http::{error_response, found_or_404, listed, store_failure};
use crate::ids::{PlayerId, TeamId};
use crate::store::RecordStore;

#[derive(Debug, Deserialize)]
pub(crate) struct RenameRequest {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CardRequest {
    pub(crate) document_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleRequest {
    pub(crate) role: Role,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleQuery {
    pub(crate) role: Role,
}

/// Coach-facing team and roster endpoints.
pub fn team_router<S>(registry: Arc<TeamRegistry<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/teams", post(create_team_handler::<S>))
        .route("/api/v1/teams/:team_id", get(get_team_handler::<S>))
        .route("/api/v1/teams/:team_id/name", put(rename_handler::<S>))
        .route(
            "/api/v1/teams/:team_id/players",
            post(add_player_handler::<S>),
        )
        .route(
            "/api/v1/teams/:team_id/players/:player_id",
            delete(remove_player_handler::<S>),
        )
        .route(
            "/api/v1/teams/:team_id/players/:player_id/card",
            put(player_card_handler::<S>),
        )
        .route(
            "/api/v1/coaches/:coach_email/teams",
            get(coach_teams_handler::<S>),
        )
        .with_state(registry)
}

pub fn user_router<S>(directory: Arc<UserDirectory<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/users", get(users_by_role_handler::<S>))
        .route("/api/v1/users/:email", get(get_user_handler::<S>))
        .route("/api/v1/users/:email/role", put(role_handler::<S>))
        .with_state(directory)
}

pub(crate) async fn create_team_handler<S>(
    State(registry): State<Arc<TeamRegistry<S>>>,
    Json(draft): Json<TeamDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    if draft.name.trim().is_empty() || draft.coach_email.trim().is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "team name and coach_email are required",
        );
    }
    match registry.create_team(draft) {
        Ok(team) => (StatusCode::CREATED, Json(team)).into_response(),
        Err(err) => store_failure(err),
    }
}

async fn get_team_handler<S>(
    State(registry): State<Arc<TeamRegistry<S>>>,
    Path(team_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    found_or_404(registry.get(&TeamId(team_id)), "team")
}

async fn rename_handler<S>(
    State(registry): State<Arc<TeamRegistry<S>>>,
    Path(team_id): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    if request.name.trim().is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "team name is required");
    }
    found_or_404(registry.rename(&TeamId(team_id), &request.name), "team")
}

pub(crate) async fn add_player_handler<S>(
    State(registry): State<Arc<TeamRegistry<S>>>,
    Path(team_id): Path<String>,
    Json(draft): Json<PlayerDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    if draft.name.trim().is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "player name is required");
    }
    match registry.add_player(&TeamId(team_id), draft) {
        Ok(Some(player)) => (StatusCode::CREATED, Json(player)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "team not found"),
        Err(err) => store_failure(err),
    }
}

async fn remove_player_handler<S>(
    State(registry): State<Arc<TeamRegistry<S>>>,
    Path((team_id, player_id)): Path<(String, String)>,
) -> Response
where
    S: RecordStore + 'static,
{
    found_or_404(
        registry.remove_player(&TeamId(team_id), &PlayerId(player_id)),
        "team",
    )
}

async fn player_card_handler<S>(
    State(registry): State<Arc<TeamRegistry<S>>>,
    Path((team_id, player_id)): Path<(String, String)>,
    Json(request): Json<CardRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    found_or_404(
        registry.set_player_card(&TeamId(team_id), &PlayerId(player_id), &request.document_id),
        "team",
    )
}

async fn coach_teams_handler<S>(
    State(registry): State<Arc<TeamRegistry<S>>>,
    Path(coach_email): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    listed(registry.list_by_coach(&coach_email))
}

async fn users_by_role_handler<S>(
    State(directory): State<Arc<UserDirectory<S>>>,
    Query(query): Query<RoleQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    listed(directory.list_by_role(query.role))
}

async fn get_user_handler<S>(
    State(directory): State<Arc<UserDirectory<S>>>,
    Path(email): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    found_or_404(directory.get(&email), "user")
}

async fn role_handler<S>(
    State(directory): State<Arc<UserDirectory<S>>>,
    Path(email): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Response
where
    S: RecordStore + 'static,
{
    match directory.upsert_role(&email, request.role) {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => error_response(StatusCode::UNPROCESSABLE_ENTITY, "email is required"),
        Err(err) => store_failure(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn coach_builds_a_team_and_roster() {
        let registry = Arc::new(TeamRegistry::new(Arc::new(MemoryStore::default())));
        let router = team_router(registry.clone());

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/v1/teams",
                json!({ "coach_email": "coach@example.com", "name": "Comets", "age_group": "U11" }),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
        let team_id = body_json(response).await["id"]
            .as_str()
            .expect("id")
            .to_string();

        let response = router
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/teams/{team_id}/players"),
                json!({ "name": " Ada ", "jersey": "9" }),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["name"], "Ada");

        let response = router
            .oneshot(
                Request::get("/api/v1/coaches/coach@example.com/teams")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let payload = body_json(response).await;
        assert_eq!(payload[0]["players"][0]["jersey"], "9");
    }

    #[tokio::test]
    async fn blank_player_name_and_unknown_team_are_rejected() {
        let registry = Arc::new(TeamRegistry::new(Arc::new(MemoryStore::default())));

        let response = add_player_handler::<MemoryStore>(
            State(registry.clone()),
            Path("team-ghost".to_string()),
            Json(PlayerDraft {
                name: "  ".to_string(),
                ..PlayerDraft::default()
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = add_player_handler::<MemoryStore>(
            State(registry),
            Path("team-ghost".to_string()),
            Json(PlayerDraft {
                name: "Bo".to_string(),
                ..PlayerDraft::default()
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn role_route_creates_unknown_users() {
        let directory = Arc::new(UserDirectory::new(Arc::new(MemoryStore::default())));
        let router = user_router(directory.clone());

        let response = router
            .clone()
            .oneshot(
                Request::put("/api/v1/users/parent.one@example.com/role")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "role": "parent" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "parent.one");

        let response = router
            .oneshot(
                Request::get("/api/v1/users?role=parent")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let payload = body_json(response).await;
        assert_eq!(payload.as_array().map(Vec::len), Some(1));
    }
}
