//! `credclean run | validate | verify`: config resolution and the human summary.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use credclean_cleaner::{CleanConfig, CleanError, CleanReport, DatePolicy, DedupPolicy};

use crate::exit_codes::{clean_exit_code, exit_code_for, EXIT_CLEAN_IO, EXIT_CLEAN_NOT_CLEAN};
use crate::CliError;

/// Duplicate key, as accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DedupArg {
    /// Every bound field except the passthrough index
    KeySubset,
    /// Every column, passthrough included
    FullRow,
}

impl From<DedupArg> for DedupPolicy {
    fn from(arg: DedupArg) -> Self {
        match arg {
            DedupArg::KeySubset => DedupPolicy::KeySubset,
            DedupArg::FullRow => DedupPolicy::FullRow,
        }
    }
}

/// Benefit-date handling, as accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DatesArg {
    /// Parse dates in either order and sort by them
    Parse,
    /// Rewrite YYYY/MM/DD text only; other text is kept as-is
    Reformat,
}

impl From<DatesArg> for DatePolicy {
    fn from(arg: DatesArg) -> Self {
        match arg {
            DatesArg::Parse => DatePolicy::Parse,
            DatesArg::Reformat => DatePolicy::Reformat,
        }
    }
}

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub dedup: Option<DedupArg>,
    pub dates: Option<DatesArg>,
    pub json: bool,
}

impl RunArgs {
    /// The zero-argument invocation: defaults everywhere.
    pub fn defaults() -> Self {
        Self {
            config: None,
            input: None,
            output: None,
            dedup: None,
            dates: None,
            json: false,
        }
    }
}

fn clean_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn from_clean_error(err: CleanError) -> CliError {
    let hint = match &err {
        CleanError::MissingColumn { .. } => {
            Some("rename the header or map it under [columns] in the config".to_string())
        }
        _ => None,
    };
    CliError { code: clean_exit_code(&err), message: err.to_string(), hint }
}

fn from_io_error(err: credclean_io::IoError) -> CliError {
    let code = exit_code_for(&err);
    match err {
        credclean_io::IoError::Clean(inner) => from_clean_error(inner),
        other => clean_err(code, other.to_string()),
    }
}

/// Load a config file. Its `input`/`output` are resolved against the
/// config file's directory.
fn load_config(path: &Path) -> Result<(CleanConfig, PathBuf, PathBuf), CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| clean_err(EXIT_CLEAN_IO, format!("cannot read config {}: {e}", path.display())))?;
    let config = CleanConfig::from_toml(&text).map_err(from_clean_error)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let input = base_dir.join(&config.input);
    let output = base_dir.join(&config.output);
    Ok((config, input, output))
}

fn resolve(args: &RunArgs) -> Result<(CleanConfig, PathBuf, PathBuf), CliError> {
    let (mut config, mut input, mut output) = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let config = CleanConfig::default();
            let input = PathBuf::from(&config.input);
            let output = PathBuf::from(&config.output);
            (config, input, output)
        }
    };

    if let Some(path) = &args.input {
        input = path.clone();
    }
    if let Some(path) = &args.output {
        output = path.clone();
    }
    if let Some(dedup) = args.dedup {
        config.dedup = dedup.into();
    }
    if let Some(dates) = args.dates {
        config.dates = dates.into();
    }
    Ok((config, input, output))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| clean_err(crate::exit_codes::EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

fn print_summary(report: &CleanReport) {
    eprintln!(
        "cleaned {} rows -> {} rows (dedup: {}, dates: {})",
        report.rows_read, report.rows_written, report.dedup, report.dates,
    );
    for stage in report.stages.iter().filter(|s| s.dropped() > 0) {
        eprintln!("  {:<24}{:>6} dropped", stage.stage.to_string(), stage.dropped());
    }
    let c = &report.coercions;
    if c.amounts + c.strata + c.dates > 0 {
        eprintln!(
            "  unparseable values: {} amounts, {} strata, {} dates",
            c.amounts, c.strata, c.dates
        );
    }
}

pub fn cmd_run(args: RunArgs, quiet: bool) -> Result<(), CliError> {
    let (config, input, output) = resolve(&args)?;

    let report = credclean_io::csv::clean_file(&input, &output, &config).map_err(from_io_error)?;

    if args.json {
        print_json(&report)?;
    }
    if !quiet {
        print_summary(&report);
        eprintln!("wrote {}", output.display());
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let (config, input, output) = load_config(&config_path)?;
    eprintln!(
        "{}: ok (input {}, output {}, dedup {}, dates {})",
        config_path.display(),
        input.display(),
        output.display(),
        config.dedup,
        config.dates,
    );
    Ok(())
}

pub fn cmd_verify(file: PathBuf, config_path: Option<PathBuf>, json: bool, quiet: bool) -> Result<(), CliError> {
    let config = match &config_path {
        Some(path) => load_config(path)?.0,
        None => CleanConfig::default(),
    };

    let outcome = credclean_io::csv::check_file(&file, &config).map_err(from_io_error)?;

    if json {
        print_json(&outcome)?;
    }
    if outcome.already_clean {
        if !quiet {
            eprintln!("{}: clean ({} rows)", file.display(), outcome.report.rows_written);
        }
        return Ok(());
    }

    Err(CliError {
        code: EXIT_CLEAN_NOT_CLEAN,
        message: format!(
            "{}: cleaning would change {} of {} rows",
            file.display(),
            outcome.rows_changed,
            outcome.report.rows_read,
        ),
        hint: Some("run `credclean run --input <FILE> --output <FILE>` to rewrite it".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn config_paths_resolve_against_config_dir() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("job.clean.toml");
        fs::write(&config_path, "input = \"raw.csv\"\noutput = \"out/clean.csv\"\n").unwrap();

        let args = RunArgs { config: Some(config_path), ..RunArgs::defaults() };
        let (_, input, output) = resolve(&args).unwrap();
        assert_eq!(input, dir.path().join("raw.csv"));
        assert_eq!(output, dir.path().join("out/clean.csv"));
    }

    #[test]
    fn flags_override_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("job.clean.toml");
        fs::write(&config_path, "dedup = \"key_subset\"\ndates = \"parse\"\n").unwrap();

        let args = RunArgs {
            config: Some(config_path),
            input: Some(PathBuf::from("elsewhere.csv")),
            dedup: Some(DedupArg::FullRow),
            dates: Some(DatesArg::Reformat),
            ..RunArgs::defaults()
        };
        let (config, input, _) = resolve(&args).unwrap();
        assert_eq!(input, PathBuf::from("elsewhere.csv"));
        assert_eq!(config.dedup, DedupPolicy::FullRow);
        assert_eq!(config.dates, DatePolicy::Reformat);
    }

    #[test]
    fn defaults_use_fixed_relative_paths() {
        let (config, input, output) = resolve(&RunArgs::defaults()).unwrap();
        assert_eq!(input, PathBuf::from("files/input/solicitudes_de_credito.csv"));
        assert_eq!(output, PathBuf::from("files/output/solicitudes_de_credito.csv"));
        assert_eq!(config.dedup, DedupPolicy::KeySubset);
    }

    #[test]
    fn invalid_config_maps_to_config_code() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("bad.toml");
        fs::write(&config_path, "[stratum]\nmin = 5\nmax = 2\n").unwrap();
        let err = cmd_validate(config_path).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_CLEAN_INVALID_CONFIG);
    }
}
