//! Points table derived from a division's members and match results. Never persisted.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::ids::{DivisionId, TeamId};
use crate::registry::TeamDirectory;
use crate::store::StoreError;
use crate::workflows::divisions::Division;

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub gp: u32,
    pub w: u32,
    pub d: u32,
    pub l: u32,
    pub gf: u32,
    pub ga: u32,
    pub gd: i64,
    pub pts: u32,
}

impl StandingsRow {
    fn seeded(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Self::default()
        }
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.gp = self.gp.saturating_add(1);
        self.gf = self.gf.saturating_add(scored);
        self.ga = self.ga.saturating_add(conceded);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.w = self.w.saturating_add(1);
                self.pts = self.pts.saturating_add(POINTS_FOR_WIN);
            }
            Ordering::Equal => {
                self.d = self.d.saturating_add(1);
                self.pts = self.pts.saturating_add(POINTS_FOR_DRAW);
            }
            Ordering::Less => self.l = self.l.saturating_add(1),
        }
    }
}

/// Points, then goal difference, then goals for, all descending; team id ascending last.
pub fn rank_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.pts
        .cmp(&a.pts)
        .then_with(|| b.gd.cmp(&a.gd))
        .then_with(|| b.gf.cmp(&a.gf))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Compute the ranked table for `division`.
///
/// Only current members get a row. A match counts when both scores are set and both
/// teams are still members; fixtures left behind by a removed team are ignored here and
/// nowhere else.
pub fn compute_standings(division: &Division) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = Vec::with_capacity(division.team_ids.len());
    let mut index: HashMap<&TeamId, usize> = HashMap::with_capacity(division.team_ids.len());
    for team_id in &division.team_ids {
        if !index.contains_key(team_id) {
            index.insert(team_id, rows.len());
            rows.push(StandingsRow::seeded(team_id.clone()));
        }
    }

    for fixture in &division.matches {
        if fixture.a_team_id == fixture.b_team_id {
            continue;
        }
        let (Some(&a), Some(&b)) = (index.get(&fixture.a_team_id), index.get(&fixture.b_team_id))
        else {
            continue;
        };
        let Some((a_score, b_score)) = fixture.result() else {
            continue;
        };

        rows[a].record(a_score, b_score);
        rows[b].record(b_score, a_score);
    }

    for row in &mut rows {
        row.gd = i64::from(row.gf) - i64::from(row.ga);
    }

    rows.sort_by(rank_order);
    rows
}

/// Standings row joined with the team's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedStandingsRow {
    pub team_name: String,
    #[serde(flatten)]
    pub row: StandingsRow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsTable {
    pub division_id: DivisionId,
    pub division_name: String,
    pub rows: Vec<NamedStandingsRow>,
}

pub const UNKNOWN_TEAM_LABEL: &str = "Unknown team";

impl StandingsTable {
    pub fn build<D>(division: &Division, directory: &D) -> Result<Self, StoreError>
    where
        D: TeamDirectory + ?Sized,
    {
        let rows = compute_standings(division)
            .into_iter()
            .map(|row| {
                let team_name = directory
                    .team(&row.team_id)?
                    .map(|team| team.name)
                    .unwrap_or_else(|| UNKNOWN_TEAM_LABEL.to_string());
                Ok(NamedStandingsRow { team_name, row })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Self {
            division_id: division.id.clone(),
            division_name: division.name.clone(),
            rows,
        })
    }
}
