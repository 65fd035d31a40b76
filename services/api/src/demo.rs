use crate::infra::ConfiguredStore;
use chrono::{Duration, TimeZone, Utc};
use clap::Args;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tourney::error::AppError;
use tourney::ids::{DivisionId, TournamentId};
use tourney::registry::TeamDraft;
use tourney::store::{JsonFileStore, RecordStore, StoreError};
use tourney::workflows::applications::ApplicationSubmission;
use tourney::workflows::divisions::{DivisionDraft, MatchDetailsPatch};
use tourney::workflows::schedule::{write_csv, ScheduleRow, Visibility};
use tourney::workflows::standings::StandingsTable;
use tourney::{bootstrap, AppServices};

const DEMO_TOURNAMENT: &str = "mike-rose-fall-classic-2025";
const DEMO_COACH: &str = "coach@example.com";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Persist demo records as JSON files in this directory instead of memory.
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportScheduleArgs {
    /// Tournament whose divisions are exported
    #[arg(long)]
    pub(crate) tournament: String,
    /// Directory holding the JSON collections
    #[arg(long)]
    pub(crate) data_dir: PathBuf,
    /// Destination file (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Leave out divisions that are not published yet
    #[arg(long)]
    pub(crate) published_only: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(ConfiguredStore::open(args.data_dir.as_deref())?);
    bootstrap(store.clone(), true)?;
    let services = AppServices::new(store);
    let tournament = TournamentId::from(DEMO_TOURNAMENT);

    println!("Tournament desk demo: {DEMO_TOURNAMENT}");
    let division_id = stage_tournament(&services, &tournament)?;

    let standings = services
        .divisions
        .standings(&division_id)?
        .ok_or_else(|| StoreError::Unavailable("demo division vanished".to_string()))?;
    render_standings(&standings);

    let schedule = services
        .divisions
        .schedule(&tournament, Visibility::PublishedOnly)?;
    render_schedule(&schedule);

    Ok(())
}

/// Teams apply, get approved into Gold pool A, play two of three fixtures, go public.
fn stage_tournament<S: RecordStore + 'static>(
    services: &AppServices<S>,
    tournament: &TournamentId,
) -> Result<DivisionId, AppError> {
    let mut approved = Vec::new();
    for name in ["Comets", "Rockets", "Bees"] {
        let team = services.teams.create_team(TeamDraft {
            coach_email: DEMO_COACH.to_string(),
            name: name.to_string(),
            age_group: "U11".to_string(),
        })?;
        let application = services
            .applications
            .submit(ApplicationSubmission {
                tournament_id: tournament.clone(),
                team_id: team.id.clone(),
                coach_email: DEMO_COACH.to_string(),
                tier: "Gold".to_string(),
                pool_pref: None,
            })?;
        services.applications.approve(&application.id, "A")?;
        approved.push(team.id);
    }
    println!("- {} applications approved into Gold / Pool A", approved.len());

    let division = services.divisions.create_division(DivisionDraft {
        tournament_id: tournament.clone(),
        tier: "Gold".to_string(),
        pool: "A".to_string(),
        name: String::new(),
    })?;
    // Entries list newest first; seed the division in approval order.
    for entry in services.applications.approved_entries(tournament)?.iter().rev() {
        services.divisions.add_team(&division.id, &entry.team_id)?;
    }

    let division = services
        .divisions
        .generate_round_robin(&division.id)?
        .ok_or_else(|| StoreError::Unavailable("demo division vanished".to_string()))?;
    println!(
        "- {} created with {} fixtures",
        division.name,
        division.matches.len()
    );

    let first_kickoff = Utc
        .with_ymd_and_hms(2025, 10, 4, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    for (slot, fixture) in division.matches.iter().enumerate() {
        services.divisions.set_match_details(
            &division.id,
            &fixture.id,
            MatchDetailsPatch {
                field: Some(format!("Field {}", slot % 2 + 1)),
                kickoff_at: Some(first_kickoff + Duration::hours(slot as i64)),
            },
        )?;
    }

    let results = [(2, 1), (0, 0)];
    for (fixture, (a_score, b_score)) in division.matches.iter().zip(results) {
        services
            .divisions
            .set_match_score(&division.id, &fixture.id, Some(a_score), Some(b_score))?;
    }
    services.divisions.set_published(&division.id, true)?;
    println!("- results entered and division published");

    Ok(division.id)
}

fn render_standings(table: &StandingsTable) {
    println!("\nStandings: {}", table.division_name);
    println!(
        "{:<4}{:<12}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>5}{:>5}",
        "#", "Team", "GP", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for (position, named) in table.rows.iter().enumerate() {
        let row = &named.row;
        println!(
            "{:<4}{:<12}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>5}{:>5}",
            position + 1,
            named.team_name,
            row.gp,
            row.w,
            row.d,
            row.l,
            row.gf,
            row.ga,
            row.gd,
            row.pts
        );
    }
}

fn render_schedule(rows: &[ScheduleRow]) {
    println!("\nSchedule");
    for row in rows {
        let kickoff = row
            .kickoff_at
            .map(|kickoff| kickoff.format("%a %H:%M").to_string())
            .unwrap_or_else(|| "TBD".to_string());
        let score = match (row.a_score, row.b_score) {
            (Some(a), Some(b)) => format!("{a}-{b}"),
            _ => "vs".to_string(),
        };
        let field = if row.field.is_empty() { "-" } else { &row.field };
        println!(
            "- {kickoff:<10} {field:<8} {} {score} {}",
            row.a_team_name, row.b_team_name
        );
    }
}

pub(crate) fn run_export_schedule(args: ExportScheduleArgs) -> Result<(), AppError> {
    let ExportScheduleArgs {
        tournament,
        data_dir,
        output,
        published_only,
    } = args;

    let store = Arc::new(JsonFileStore::open(data_dir)?);
    let services = AppServices::new(store);
    let visibility = if published_only {
        Visibility::PublishedOnly
    } else {
        Visibility::All
    };
    let rows = services
        .divisions
        .schedule(&TournamentId(tournament), visibility)?;

    match output {
        Some(path) => {
            let file = File::create(&path)?;
            write_csv(&rows, file)?;
            eprintln!("wrote {} matches to {}", rows.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_csv(&rows, &mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}
