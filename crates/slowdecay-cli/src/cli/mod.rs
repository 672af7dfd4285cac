mod commands;
mod helpers;

use clap::Parser;
use slowdecay_core::domain::ProfileError;
use tracing_subscriber::EnvFilter;

const PROGRAM_NAME: &str = "slowdecay";
const DEFAULT_LOG_FILTER: &str = "info";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let profile_error = error.as_profile_error();
            eprintln!("{}", profile_error.diagnostic_line());
            if let Some(summary_line) = profile_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            profile_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_tracing(cli.log_level.as_deref());
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// Events go to stderr; stdout carries only command output.
fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A subscriber may already be installed when `run` is called repeatedly.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "slowdecay",
    version,
    about = "Slowness and decay-rate profiles from core-diffracted wave alignments"
)]
struct Cli {
    /// Tracing filter directives; overrides RUST_LOG (default: info)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Build cluster profiles from alignment results and persist one artifact per run
    Profiles(commands::ProfilesArgs),
    /// Summarize a persisted profile artifact
    Inspect(commands::InspectArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Profiles(args) => commands::run_profiles_command(args),
        CliCommand::Inspect(args) => commands::run_inspect_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(ProfileError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ProfileError> for CliError {
    fn from(error: ProfileError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_profile_error(&self) -> ProfileError {
        match self {
            Self::Usage(message) => {
                ProfileError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => ProfileError::internal("SYS.CLI", format!("{error:#}")),
        }
    }
}
