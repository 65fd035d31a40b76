//! Tournament-wide schedule: every fixture across a tournament's divisions, joined with
//! team names, filtered for the public pickers and exported as CSV.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{DivisionId, MatchId, TeamId};
use crate::registry::TeamDirectory;
use crate::store::StoreError;
use crate::workflows::divisions::Division;

pub const FALLBACK_TEAM_A: &str = "Team A";
pub const FALLBACK_TEAM_B: &str = "Team B";

/// Quick window around "now": 15 minutes back, two hours ahead.
const NOW_WINDOW_BEFORE_MINUTES: i64 = 15;
const NOW_WINDOW_AFTER_MINUTES: i64 = 120;

/// Which divisions a schedule may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    PublishedOnly,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub division_id: DivisionId,
    pub division_name: String,
    pub match_id: MatchId,
    pub a_team_id: TeamId,
    pub b_team_id: TeamId,
    pub a_team_name: String,
    pub b_team_name: String,
    pub a_score: Option<u32>,
    pub b_score: Option<u32>,
    pub field: String,
    pub kickoff_at: Option<DateTime<Utc>>,
    pub published: bool,
}

impl ScheduleRow {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.a_team_name, self.b_team_name)
    }
}

/// Kickoff ascending with undecided kickoffs last, then division name, then label.
pub fn schedule_order(a: &ScheduleRow, b: &ScheduleRow) -> Ordering {
    let kickoff = match (a.kickoff_at, b.kickoff_at) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    kickoff
        .then_with(|| a.division_name.cmp(&b.division_name))
        .then_with(|| a.label().cmp(&b.label()))
}

/// Flatten the fixtures of `divisions` into sorted schedule rows.
pub fn build_schedule<D>(
    divisions: &[Division],
    directory: &D,
) -> Result<Vec<ScheduleRow>, StoreError>
where
    D: TeamDirectory + ?Sized,
{
    let mut names: HashMap<TeamId, Option<String>> = HashMap::new();
    let mut lookup = |team_id: &TeamId| -> Result<Option<String>, StoreError> {
        if let Some(cached) = names.get(team_id) {
            return Ok(cached.clone());
        }
        let name = directory.team(team_id)?.map(|team| team.name);
        names.insert(team_id.clone(), name.clone());
        Ok(name)
    };

    let mut rows = Vec::new();
    for division in divisions {
        for fixture in &division.matches {
            let a_team_name =
                lookup(&fixture.a_team_id)?.unwrap_or_else(|| FALLBACK_TEAM_A.to_string());
            let b_team_name =
                lookup(&fixture.b_team_id)?.unwrap_or_else(|| FALLBACK_TEAM_B.to_string());
            rows.push(ScheduleRow {
                division_id: division.id.clone(),
                division_name: division.name.clone(),
                match_id: fixture.id.clone(),
                a_team_id: fixture.a_team_id.clone(),
                b_team_id: fixture.b_team_id.clone(),
                a_team_name,
                b_team_name,
                a_score: fixture.a_score,
                b_score: fixture.b_score,
                field: fixture.field.clone(),
                kickoff_at: fixture.kickoff_at,
                published: division.published,
            });
        }
    }

    rows.sort_by(schedule_order);
    Ok(rows)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickWindow {
    #[default]
    All,
    Now,
    Today,
}

/// Public schedule filters. Every populated criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFilter {
    /// Case-insensitive text over division and team names.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub day: Option<NaiveDate>,
    #[serde(default)]
    pub quick: QuickWindow,
}

impl ScheduleFilter {
    pub fn matches(&self, row: &ScheduleRow, now: DateTime<Utc>) -> bool {
        if let Some(query) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let hit = [&row.division_name, &row.a_team_name, &row.b_team_name]
                .iter()
                .any(|text| text.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }

        if let Some(field) = self.field.as_deref().filter(|f| !f.is_empty()) {
            if row.field != field {
                return false;
            }
        }

        if let Some(day) = self.day {
            if row.kickoff_at.map(|kickoff| kickoff.date_naive()) != Some(day) {
                return false;
            }
        }

        match self.quick {
            QuickWindow::All => true,
            QuickWindow::Now => row.kickoff_at.is_some_and(|kickoff| {
                kickoff >= now - Duration::minutes(NOW_WINDOW_BEFORE_MINUTES)
                    && kickoff <= now + Duration::minutes(NOW_WINDOW_AFTER_MINUTES)
            }),
            QuickWindow::Today => row
                .kickoff_at
                .is_some_and(|kickoff| kickoff.date_naive() == now.date_naive()),
        }
    }

    pub fn apply(&self, rows: Vec<ScheduleRow>, now: DateTime<Utc>) -> Vec<ScheduleRow> {
        rows.into_iter().filter(|row| self.matches(row, now)).collect()
    }
}

/// Non-empty fields in use, sorted.
pub fn distinct_fields(rows: &[ScheduleRow]) -> Vec<String> {
    rows.iter()
        .filter(|row| !row.field.is_empty())
        .map(|row| row.field.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn distinct_days(rows: &[ScheduleRow]) -> Vec<NaiveDate> {
    rows.iter()
        .filter_map(|row| row.kickoff_at.map(|kickoff| kickoff.date_naive()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Error)]
pub enum ScheduleExportError {
    #[error("failed to write schedule csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush schedule csv: {0}")]
    Io(#[from] std::io::Error),
}

pub const CSV_HEADER: [&str; 7] = [
    "Division", "Team A", "Team B", "A Score", "B Score", "Field", "Kickoff",
];

/// Write `rows` as CSV. Blank cells stand for unset scores and undecided kickoffs.
pub fn write_csv<W: Write>(rows: &[ScheduleRow], writer: W) -> Result<(), ScheduleExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for row in rows {
        let a_score = row.a_score.map(|score| score.to_string()).unwrap_or_default();
        let b_score = row.b_score.map(|score| score.to_string()).unwrap_or_default();
        let kickoff = row
            .kickoff_at
            .map(|kickoff| kickoff.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        csv.write_record([
            row.division_name.as_str(),
            row.a_team_name.as_str(),
            row.b_team_name.as_str(),
            a_score.as_str(),
            b_score.as_str(),
            row.field.as_str(),
            kickoff.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn render_csv(rows: &[ScheduleRow]) -> Result<String, ScheduleExportError> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
