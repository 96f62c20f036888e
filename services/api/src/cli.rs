use crate::demo::{run_demo, run_matches, DemoArgs, MatchesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use clinic_waitlist::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Clinic Waitlist Matcher",
    about = "Match waitlisted patients to open appointment slots and book them",
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
    /// Print the ranked match board for the demo clinic
    Matches(MatchesArgs),
    /// Walk through matching and booking against the demo clinic
    Demo(DemoArgs),
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
        Command::Matches(args) => run_matches(args),
        Command::Demo(args) => run_demo(args),
    }
}
