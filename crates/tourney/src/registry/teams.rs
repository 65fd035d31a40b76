use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ids::{PlayerId, TeamId};
use crate::store::{Collection, Record, RecordStore, Repository, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub coach_email: String,
    pub name: String,
    pub age_group: String,
    #[serde(default)]
    pub players: Vec<Player>,
    pub created_at: DateTime<Utc>,
}

impl Record for Team {
    const COLLECTION: Collection = Collection::Teams;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub jersey: String,
    #[serde(default)]
    pub dob: String,
    /// Document id of the player's registration card, when one was uploaded.
    #[serde(default)]
    pub card_doc_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDraft {
    pub coach_email: String,
    pub name: String,
    #[serde(default)]
    pub age_group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDraft {
    pub name: String,
    #[serde(default)]
    pub jersey: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub card_doc_id: Option<String>,
}

/// Lookup contract the division engine uses for existence checks and display joins.
pub trait TeamDirectory: Send + Sync {
    fn team(&self, id: &TeamId) -> Result<Option<Team>, StoreError>;
}

/// Coach-owned team records and their rosters.
pub struct TeamRegistry<S> {
    teams: Repository<S, Team>,
}

impl<S: RecordStore> TeamRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            teams: Repository::new(store),
        }
    }

    pub fn create_team(&self, draft: TeamDraft) -> Result<Team, StoreError> {
        let team = self.teams.insert(Team {
            id: TeamId::generate(),
            coach_email: draft.coach_email,
            name: draft.name.trim().to_string(),
            age_group: draft.age_group,
            players: Vec::new(),
            created_at: Utc::now(),
        })?;
        info!(team_id = %team.id, coach = %team.coach_email, "team created");
        Ok(team)
    }

    pub fn get(&self, id: &TeamId) -> Result<Option<Team>, StoreError> {
        self.teams.get(id.as_str())
    }

    pub fn list_by_coach(&self, coach_email: &str) -> Result<Vec<Team>, StoreError> {
        self.teams.list(|team| team.coach_email == coach_email)
    }

    pub fn rename(&self, id: &TeamId, name: &str) -> Result<Option<Team>, StoreError> {
        let name = name.trim().to_string();
        self.teams.modify(id.as_str(), |team| {
            let changed = team.name != name;
            team.name = name;
            changed
        })
    }

    /// Add a player ahead of the existing roster. Returns the stored player.
    pub fn add_player(
        &self,
        id: &TeamId,
        draft: PlayerDraft,
    ) -> Result<Option<Player>, StoreError> {
        let player = Player {
            id: PlayerId::generate(),
            name: draft.name.trim().to_string(),
            jersey: draft.jersey,
            dob: draft.dob,
            card_doc_id: draft.card_doc_id,
        };

        let stored = self.teams.modify(id.as_str(), |team| {
            team.players.insert(0, player.clone());
            true
        })?;
        Ok(stored.map(|_| player))
    }

    pub fn remove_player(
        &self,
        id: &TeamId,
        player_id: &PlayerId,
    ) -> Result<Option<Team>, StoreError> {
        self.teams.modify(id.as_str(), |team| {
            let before = team.players.len();
            team.players.retain(|player| &player.id != player_id);
            team.players.len() != before
        })
    }

    pub fn set_player_card(
        &self,
        id: &TeamId,
        player_id: &PlayerId,
        document_id: &str,
    ) -> Result<Option<Team>, StoreError> {
        self.teams.modify(id.as_str(), |team| {
            match team.players.iter_mut().find(|player| &player.id == player_id) {
                Some(player) => {
                    player.card_doc_id = Some(document_id.to_string());
                    true
                }
                None => {
                    debug!(team_id = %team.id, %player_id, "player card target not on roster");
                    false
                }
            }
        })
    }
}

impl<S: RecordStore> TeamDirectory for TeamRegistry<S> {
    fn team(&self, id: &TeamId) -> Result<Option<Team>, StoreError> {
        self.get(id)
    }
}
