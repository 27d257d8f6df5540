//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts branch on these values, so they only ever grow.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args, missing file) |
//! | 3-9     | clean     | Cleaning-specific codes                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `exit_code_for`

use credclean_cleaner::CleanError;
use credclean_io::IoError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// Emitted by clap itself on argument errors.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Clean (3-9)
// =============================================================================

/// Input file unreadable or output file unwritable.
pub const EXIT_CLEAN_IO: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_CLEAN_INVALID_CONFIG: u8 = 4;

/// Input is not a usable table (malformed CSV, missing or repeated column).
pub const EXIT_CLEAN_INPUT_FORMAT: u8 = 5;

/// `verify` found a file that cleaning would change.
pub const EXIT_CLEAN_NOT_CLEAN: u8 = 6;

/// Map an engine error to its exit code.
pub fn clean_exit_code(err: &CleanError) -> u8 {
    match err {
        CleanError::ConfigParse(_) | CleanError::ConfigValidation(_) => EXIT_CLEAN_INVALID_CONFIG,
        CleanError::Csv(e) if e.is_io_error() => EXIT_CLEAN_IO,
        CleanError::MissingColumn { .. } | CleanError::DuplicateColumn { .. } | CleanError::Csv(_) => {
            EXIT_CLEAN_INPUT_FORMAT
        }
        CleanError::Io(_) => EXIT_CLEAN_IO,
    }
}

/// Map a file-boundary error to its exit code.
pub fn exit_code_for(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } | IoError::Write { .. } => EXIT_CLEAN_IO,
        IoError::Clean(inner) => clean_exit_code(inner),
    }
}
