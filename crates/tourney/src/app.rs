use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::registry::{team_router, user_router, TeamRegistry, UserDirectory};
use crate::store::{initialize_collections, RecordStore, StoreError};
use crate::workflows::applications::{application_router, ApplicationService};
use crate::workflows::divisions::{division_router, public_router, DivisionService};
use crate::workflows::rosters::{roster_router, RosterService};

/// Every workflow service wired over one shared store.
pub struct AppServices<S> {
    pub users: Arc<UserDirectory<S>>,
    pub teams: Arc<TeamRegistry<S>>,
    pub applications: Arc<ApplicationService<S>>,
    pub rosters: Arc<RosterService<S>>,
    pub divisions: Arc<DivisionService<S, TeamRegistry<S>>>,
}

impl<S> Clone for AppServices<S> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            teams: Arc::clone(&self.teams),
            applications: Arc::clone(&self.applications),
            rosters: Arc::clone(&self.rosters),
            divisions: Arc::clone(&self.divisions),
        }
    }
}

impl<S: RecordStore + 'static> AppServices<S> {
    pub fn new(store: Arc<S>) -> Self {
        let teams = Arc::new(TeamRegistry::new(store.clone()));
        Self {
            users: Arc::new(UserDirectory::new(store.clone())),
            applications: Arc::new(ApplicationService::new(store.clone())),
            rosters: Arc::new(RosterService::new(store.clone())),
            divisions: Arc::new(DivisionService::new(store, teams.clone())),
            teams,
        }
    }

    /// Director and coach routes plus the read-only public routes.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(user_router(self.users.clone()))
            .merge(team_router(self.teams.clone()))
            .merge(application_router(self.applications.clone()))
            .merge(roster_router(self.rosters.clone()))
            .merge(division_router(self.divisions.clone()))
            .merge(public_router(self.divisions.clone()))
    }
}

/// First-run setup: create missing collections and optionally seed the demo identities.
pub fn bootstrap<S: RecordStore>(store: Arc<S>, seed_demo: bool) -> Result<(), StoreError> {
    initialize_collections(store.as_ref())?;
    if seed_demo {
        UserDirectory::new(store).seed_demo_identities()?;
    }
    info!(seed_demo, "store initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Role;
    use crate::store::{Collection, MemoryStore};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn bootstrap_is_idempotent() {
        let store = Arc::new(MemoryStore::default());
        bootstrap(store.clone(), true).expect("first run");
        bootstrap(store.clone(), true).expect("second run");

        let users = UserDirectory::new(store.clone());
        assert_eq!(users.list_by_role(Role::Director).expect("list").len(), 1);
        assert_eq!(users.list_by_role(Role::Coach).expect("list").len(), 1);
        for collection in Collection::ALL {
            assert!(store.read(collection).expect("read").is_some());
        }
    }

    #[test]
    fn bootstrap_can_skip_seeding() {
        let store = Arc::new(MemoryStore::default());
        bootstrap(store.clone(), false).expect("bootstrap");
        assert_eq!(
            UserDirectory::new(store)
                .get("director@example.com")
                .expect("get"),
            None
        );
    }

    #[tokio::test]
    async fn merged_router_serves_every_workflow() {
        let services = AppServices::new(Arc::new(MemoryStore::default()));
        let router = services.router();

        for uri in [
            "/api/v1/coaches/coach@example.com/teams",
            "/api/v1/coaches/coach@example.com/applications",
            "/api/v1/coaches/coach@example.com/rosters",
            "/api/v1/tournaments/cup/divisions",
            "/api/v1/public/tournaments/cup/schedule",
        ] {
            let response = router
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}
