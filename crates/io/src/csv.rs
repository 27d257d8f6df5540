// Delimited file import/export and the one-shot file cleaning procedure

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use credclean_cleaner::{CheckOutcome, CleanConfig, CleanError, CleanReport, Table};
use tracing::info;

use crate::error::IoError;

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Load a delimited file into a raw table.
pub fn import(path: &Path, config: &CleanConfig) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    Ok(credclean_cleaner::load_table(&content, config)?)
}

/// Write `table` to `path`, creating missing parent directories.
pub fn export(table: &Table, path: &Path, config: &CleanConfig) -> Result<(), IoError> {
    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let file = File::create(path).map_err(write_err)?;
    credclean_cleaner::write_table(table, BufWriter::new(file), config).map_err(|e| match e {
        CleanError::Io(source) => write_err(source),
        other => write_err(std::io::Error::other(other)),
    })?;
    Ok(())
}

/// Read `input`, clean it, write `output`.
pub fn clean_file(input: &Path, output: &Path, config: &CleanConfig) -> Result<CleanReport, IoError> {
    let mut table = import(input, config)?;
    let report = credclean_cleaner::clean(&mut table, config);
    export(&table, output, config)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows_read = report.rows_read,
        rows_written = report.rows_written,
        "wrote cleaned table"
    );
    Ok(report)
}

/// Clean `path` in memory and report whether it was already clean.
pub fn check_file(path: &Path, config: &CleanConfig) -> Result<CheckOutcome, IoError> {
    let content = read_file_as_utf8(path)?;
    Ok(credclean_cleaner::check(&content, config)?)
}
