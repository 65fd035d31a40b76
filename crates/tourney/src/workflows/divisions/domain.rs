use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DivisionId, MatchId, TeamId, TournamentId};
use crate::store::{Collection, Record};

/// A tier+pool grouping of teams inside one tournament; owns its fixture list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub tier: String,
    pub pool: String,
    /// Insertion-ordered, duplicate-free membership.
    #[serde(default)]
    pub team_ids: Vec<TeamId>,
    /// Only replaced by fixture generation; never follows membership changes.
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Division {
    const COLLECTION: Collection = Collection::Divisions;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Division {
    pub fn contains_team(&self, team_id: &TeamId) -> bool {
        self.team_ids.contains(team_id)
    }

    pub fn find_match(&self, match_id: &MatchId) -> Option<&Match> {
        self.matches.iter().find(|fixture| &fixture.id == match_id)
    }

    pub(crate) fn match_mut(&mut self, match_id: &MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|fixture| &fixture.id == match_id)
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn matches_involving<'a>(&'a self, team_id: &'a TeamId) -> impl Iterator<Item = &'a Match> {
        self.matches.iter().filter(move |fixture| fixture.involves(team_id))
    }

    /// Fixtures pointing at a team that is no longer a member.
    pub fn stale_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |fixture| {
            !self.contains_team(&fixture.a_team_id) || !self.contains_team(&fixture.b_team_id)
        })
    }
}

/// One fixture. `a`/`b` only fix the score column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub a_team_id: TeamId,
    pub b_team_id: TeamId,
    #[serde(default)]
    pub a_score: Option<u32>,
    #[serde(default)]
    pub b_score: Option<u32>,
    #[serde(default)]
    pub field: String,
    /// `None` means the kickoff time is still to be decided.
    #[serde(default)]
    pub kickoff_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn between(a_team_id: TeamId, b_team_id: TeamId) -> Self {
        Self {
            id: MatchId::generate(),
            a_team_id,
            b_team_id,
            a_score: None,
            b_score: None,
            field: String::new(),
            kickoff_at: None,
        }
    }

    /// Final score when both sides are recorded.
    pub fn result(&self) -> Option<(u32, u32)> {
        self.a_score.zip(self.b_score)
    }

    pub fn involves(&self, team_id: &TeamId) -> bool {
        &self.a_team_id == team_id || &self.b_team_id == team_id
    }

    /// Whether a director entered anything that fixture regeneration would discard.
    pub fn has_entries(&self) -> bool {
        self.a_score.is_some()
            || self.b_score.is_some()
            || !self.field.is_empty()
            || self.kickoff_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionDraft {
    pub tournament_id: TournamentId,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub pool: String,
    /// Blank names are derived from tier and pool.
    #[serde(default)]
    pub name: String,
}

impl DivisionDraft {
    pub(crate) fn display_name(&self) -> String {
        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        let tier = match self.tier.trim() {
            "" => "Tier",
            tier => tier,
        };
        let pool = match self.pool.trim() {
            "" => "-",
            pool => pool,
        };
        format!("{tier} • Pool {pool}")
    }
}

/// Partial venue/time edit; omitted fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetailsPatch {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub kickoff_at: Option<DateTime<Utc>>,
}

impl MatchDetailsPatch {
    pub(crate) fn apply(self, fixture: &mut Match) -> bool {
        let mut changed = false;
        if let Some(field) = self.field {
            changed |= fixture.field != field;
            fixture.field = field;
        }
        if let Some(kickoff_at) = self.kickoff_at {
            changed |= fixture.kickoff_at != Some(kickoff_at);
            fixture.kickoff_at = Some(kickoff_at);
        }
        changed
    }
}
