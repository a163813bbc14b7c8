mod commands;
mod helpers;

use clap::Parser;
use sir_core::domain::SirError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let sir_error = error.as_sir_error();
            eprintln!("{}", sir_error.diagnostic_line());
            eprintln!("{}", sir_error.fatal_exit_line());
            sir_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("sir-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_logging(cli.log_level.as_deref());
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

#[derive(Parser)]
#[command(
    name = "sir-rs",
    version,
    about = "Atmospheric model builder and synthesis-session tools"
)]
struct Cli {
    /// Log filter directive, overrides RUST_LOG (e.g. `debug`, `sir_core=trace`)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Print the spectral lines available in the LINEAS database
    Lines(commands::LinesArgs),
    /// Validate line groups and write the malla.grid wavelength grid
    Grid(commands::GridArgs),
    /// Build an 8-column atmospheric model from a JSON node configuration
    Model(commands::ModelArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Lines(args) => commands::run_lines_command(args),
        CliCommand::Grid(args) => commands::run_grid_command(args),
        CliCommand::Model(args) => commands::run_model_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(SirError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SirError> for CliError {
    fn from(error: SirError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_sir_error(&self) -> SirError {
        match self {
            Self::Usage(message) => SirError::parse("PARSE.CLI_USAGE", message.trim_end()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => SirError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
