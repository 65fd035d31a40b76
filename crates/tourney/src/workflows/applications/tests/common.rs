use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::ids::{TeamId, TournamentId};
use crate::store::MemoryStore;
use crate::workflows::applications::{ApplicationService, ApplicationSubmission};

pub(super) fn tournament() -> TournamentId {
    TournamentId::from("mike-rose-fall-classic-2025")
}

pub(super) fn submission(team: &str, tier: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        tournament_id: tournament(),
        team_id: TeamId::from(team),
        coach_email: "coach@example.com".to_string(),
        tier: tier.to_string(),
        pool_pref: Some("B".to_string()),
    }
}

pub(super) fn build_service() -> (Arc<ApplicationService<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(ApplicationService::new(store.clone()));
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
