use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad delimiter, empty column name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A required column is absent from the input header.
    #[error("missing column '{column}'")]
    MissingColumn { column: String },
    /// Two input headers bind to the same field.
    #[error("column '{column}' appears more than once in the header")]
    DuplicateColumn { column: String },
    /// Malformed delimited input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// IO error while writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
