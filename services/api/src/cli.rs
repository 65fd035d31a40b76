use crate::demo::{run_demo, run_export_schedule, DemoArgs, ExportScheduleArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tourney::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tournament Desk",
    about = "Run the tournament desk service or drive its workflows from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a tournament from applications to published standings
    Demo(DemoArgs),
    /// Write a tournament's schedule as CSV
    ExportSchedule(ExportScheduleArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::ExportSchedule(args) => run_export_schedule(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_requires_tournament_and_data_dir() {
        assert!(Cli::try_parse_from(["tourney-api", "export-schedule"]).is_err());

        let cli = Cli::try_parse_from([
            "tourney-api",
            "export-schedule",
            "--tournament",
            "mike-rose-fall-classic-2025",
            "--data-dir",
            "./data",
            "--published-only",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::ExportSchedule(args)) => {
                assert!(args.published_only);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
