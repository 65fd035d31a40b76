use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{Division, DivisionDraft, MatchDetailsPatch};
use super::fixtures::round_robin;
use crate::ids::{DivisionId, MatchId, TeamId, TournamentId};
use crate::registry::TeamDirectory;
use crate::store::{RecordStore, Repository, StoreError};
use crate::workflows::schedule::{build_schedule, ScheduleRow, Visibility};
use crate::workflows::standings::StandingsTable;

/// Division membership, fixture generation, match edits and publishing.
///
/// Destructive calls (regenerating fixtures, removing a member that already has fixtures)
/// go through without confirmation; asking the director first is the caller's job.
pub struct DivisionService<S, D> {
    divisions: Repository<S, Division>,
    teams: Arc<D>,
}

impl<S, D> DivisionService<S, D>
where
    S: RecordStore,
    D: TeamDirectory,
{
    pub fn new(store: Arc<S>, teams: Arc<D>) -> Self {
        Self {
            divisions: Repository::new(store),
            teams,
        }
    }

    pub fn create_division(&self, draft: DivisionDraft) -> Result<Division, StoreError> {
        let division = self.divisions.insert(Division {
            id: DivisionId::generate(),
            name: draft.display_name(),
            tournament_id: draft.tournament_id,
            tier: draft.tier.trim().to_string(),
            pool: draft.pool.trim().to_string(),
            team_ids: Vec::new(),
            matches: Vec::new(),
            published: false,
            created_at: Utc::now(),
        })?;
        info!(division_id = %division.id, name = %division.name, "division created");
        Ok(division)
    }

    pub fn get(&self, id: &DivisionId) -> Result<Option<Division>, StoreError> {
        self.divisions.get(id.as_str())
    }

    pub fn list_all(&self) -> Result<Vec<Division>, StoreError> {
        self.divisions.list(|_| true)
    }

    pub fn list_by_tournament(
        &self,
        tournament_id: &TournamentId,
    ) -> Result<Vec<Division>, StoreError> {
        self.divisions
            .list(|division| &division.tournament_id == tournament_id)
    }

    /// The only listing public views may read.
    pub fn list_published_by_tournament(
        &self,
        tournament_id: &TournamentId,
    ) -> Result<Vec<Division>, StoreError> {
        self.divisions.list(|division| {
            division.published && &division.tournament_id == tournament_id
        })
    }

    /// Append a registered team. Already-present teams leave the division untouched.
    pub fn add_team(
        &self,
        id: &DivisionId,
        team_id: &TeamId,
    ) -> Result<Option<Division>, StoreError> {
        if self.teams.team(team_id)?.is_none() {
            debug!(division_id = %id, %team_id, "add ignored: unknown team");
            return Ok(None);
        }

        self.divisions.modify(id.as_str(), |division| {
            if division.contains_team(team_id) {
                return false;
            }
            division.team_ids.push(team_id.clone());
            true
        })
    }

    /// Drop a member. Existing fixtures are kept and keep referencing the team.
    pub fn remove_team(
        &self,
        id: &DivisionId,
        team_id: &TeamId,
    ) -> Result<Option<Division>, StoreError> {
        self.divisions.modify(id.as_str(), |division| {
            let before = division.team_ids.len();
            division.team_ids.retain(|member| member != team_id);
            if division.team_ids.len() == before {
                return false;
            }

            let orphaned = division.matches_involving(team_id).count();
            if orphaned > 0 {
                warn!(
                    division_id = %division.id,
                    %team_id,
                    orphaned,
                    "team removed while fixtures still reference it"
                );
            }
            true
        })
    }

    pub fn set_published(
        &self,
        id: &DivisionId,
        published: bool,
    ) -> Result<Option<Division>, StoreError> {
        let division = self.divisions.modify(id.as_str(), |division| {
            let changed = division.published != published;
            division.published = published;
            changed
        })?;

        if let Some(division) = &division {
            info!(division_id = %division.id, published, "division visibility set");
        }
        Ok(division)
    }

    /// Replace the fixture list with a fresh single round-robin of the current members.
    ///
    /// Previously entered scores, fields and kickoff times are discarded. Fewer than two
    /// members yields an empty fixture list.
    pub fn generate_round_robin(&self, id: &DivisionId) -> Result<Option<Division>, StoreError> {
        let division = self.divisions.modify(id.as_str(), |division| {
            let discarded = division
                .matches
                .iter()
                .filter(|fixture| fixture.has_entries())
                .count();
            if discarded > 0 {
                warn!(division_id = %division.id, discarded, "regenerating over entered results");
            }
            division.matches = round_robin(&division.team_ids);
            true
        })?;

        if let Some(division) = &division {
            info!(
                division_id = %division.id,
                teams = division.team_ids.len(),
                matches = division.matches.len(),
                "round-robin generated"
            );
        }
        Ok(division)
    }

    /// Record (or clear) a result. Scores are already normalized by the edit boundary.
    pub fn set_match_score(
        &self,
        id: &DivisionId,
        match_id: &MatchId,
        a_score: Option<u32>,
        b_score: Option<u32>,
    ) -> Result<Option<Division>, StoreError> {
        let mut found = false;
        let division = self.divisions.modify(id.as_str(), |division| {
            let Some(fixture) = division.match_mut(match_id) else {
                return false;
            };
            found = true;
            let changed = fixture.a_score != a_score || fixture.b_score != b_score;
            fixture.a_score = a_score;
            fixture.b_score = b_score;
            changed
        })?;

        if division.is_some() && !found {
            debug!(division_id = %id, %match_id, "score ignored: unknown match");
        }
        Ok(division.filter(|_| found))
    }

    pub fn clear_match_score(
        &self,
        id: &DivisionId,
        match_id: &MatchId,
    ) -> Result<Option<Division>, StoreError> {
        self.set_match_score(id, match_id, None, None)
    }

    pub fn set_match_details(
        &self,
        id: &DivisionId,
        match_id: &MatchId,
        patch: MatchDetailsPatch,
    ) -> Result<Option<Division>, StoreError> {
        let mut found = false;
        let division = self.divisions.modify(id.as_str(), |division| {
            let Some(fixture) = division.match_mut(match_id) else {
                return false;
            };
            found = true;
            patch.apply(fixture)
        })?;

        if division.is_some() && !found {
            debug!(division_id = %id, %match_id, "details ignored: unknown match");
        }
        Ok(division.filter(|_| found))
    }

    pub fn standings(&self, id: &DivisionId) -> Result<Option<StandingsTable>, StoreError> {
        self.get(id)?
            .map(|division| StandingsTable::build(&division, self.teams.as_ref()))
            .transpose()
    }

    pub fn published_standings(
        &self,
        tournament_id: &TournamentId,
    ) -> Result<Vec<StandingsTable>, StoreError> {
        self.list_published_by_tournament(tournament_id)?
            .iter()
            .map(|division| StandingsTable::build(division, self.teams.as_ref()))
            .collect()
    }

    pub fn schedule(
        &self,
        tournament_id: &TournamentId,
        visibility: Visibility,
    ) -> Result<Vec<ScheduleRow>, StoreError> {
        let divisions = match visibility {
            Visibility::PublishedOnly => self.list_published_by_tournament(tournament_id)?,
            Visibility::All => self.list_by_tournament(tournament_id)?,
        };
        build_schedule(&divisions, self.teams.as_ref())
    }
}
