// credclean - cleans credit-request CSV exports into an analysis-ready table

mod clean;
mod exit_codes;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use clean::{DatesArg, DedupArg, RunArgs};
use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "credclean")]
#[command(about = "Clean credit-request records (runs with default paths when no command is given)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Only print warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean an input file and write the result
    #[command(after_help = "\
Examples:
  credclean run
  credclean run --config job.clean.toml
  credclean run --input raw.csv --output clean.csv --json
  credclean run --dedup full-row --dates reformat")]
    Run {
        /// TOML config file; its paths are relative to the file's directory
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Input CSV (overrides the config)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Output CSV (overrides the config)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Which columns make two rows duplicates
        #[arg(long, value_enum)]
        dedup: Option<DedupArg>,

        /// How benefit dates are handled
        #[arg(long, value_enum)]
        dates: Option<DatesArg>,

        /// Print the cleaning report as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a config without running
    #[command(after_help = "\
Examples:
  credclean validate job.clean.toml")]
    Validate {
        /// Path to the .clean.toml config file
        config: PathBuf,
    },

    /// Check that a file is already clean (cleaning it would change nothing)
    #[command(after_help = "\
Examples:
  credclean verify files/output/solicitudes_de_credito.csv
  credclean verify clean.csv --config job.clean.toml --json")]
    Verify {
        /// CSV file to check
        file: PathBuf,

        /// TOML config file with the policies the file was cleaned under
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Print the check outcome as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.quiet);

    let result = match cli.command {
        None => clean::cmd_run(RunArgs::defaults(), cli.quiet),
        Some(Commands::Run { config, input, output, dedup, dates, json }) => clean::cmd_run(
            RunArgs { config, input, output, dedup, dates, json },
            cli.quiet,
        ),
        Some(Commands::Validate { config }) => clean::cmd_validate(config),
        Some(Commands::Verify { file, config, json }) => clean::cmd_verify(file, config, json, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
