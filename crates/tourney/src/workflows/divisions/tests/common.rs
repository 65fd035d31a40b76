use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::ids::{TeamId, TournamentId};
use crate::registry::{TeamDraft, TeamRegistry};
use crate::store::MemoryStore;
use crate::workflows::divisions::{Division, DivisionDraft, DivisionService};

pub(super) type Service = DivisionService<MemoryStore, TeamRegistry<MemoryStore>>;

pub(super) struct Harness {
    pub(super) service: Arc<Service>,
    pub(super) teams: Arc<TeamRegistry<MemoryStore>>,
}

pub(super) fn tournament() -> TournamentId {
    TournamentId::from("mike-rose-fall-classic-2025")
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(MemoryStore::default());
    let teams = Arc::new(TeamRegistry::new(store.clone()));
    let service = Arc::new(DivisionService::new(store, teams.clone()));
    Harness { service, teams }
}

impl Harness {
    pub(super) fn team(&self, name: &str) -> TeamId {
        self.teams
            .create_team(TeamDraft {
                coach_email: "coach@example.com".to_string(),
                name: name.to_string(),
                age_group: "U11".to_string(),
            })
            .expect("create team")
            .id
    }

    pub(super) fn division(&self, tier: &str, pool: &str) -> Division {
        self.service
            .create_division(DivisionDraft {
                tournament_id: tournament(),
                tier: tier.to_string(),
                pool: pool.to_string(),
                name: String::new(),
            })
            .expect("create division")
    }

    /// Division with the given teams added in order and a fresh round-robin.
    pub(super) fn scheduled(&self, names: &[&str]) -> (Division, Vec<TeamId>) {
        let division = self.division("Gold", "A");
        let team_ids: Vec<TeamId> = names.iter().map(|name| self.team(name)).collect();
        for team_id in &team_ids {
            self.service
                .add_team(&division.id, team_id)
                .expect("add team")
                .expect("known division and team");
        }
        let division = self
            .service
            .generate_round_robin(&division.id)
            .expect("generate")
            .expect("known division");
        (division, team_ids)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
