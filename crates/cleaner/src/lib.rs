//! `credclean-cleaner`: credit-request record cleaning engine.
//!
//! Pure engine crate: receives delimited text, returns the cleaned table and
//! a per-stage report. No CLI or filesystem dependencies.

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod load;
pub mod model;
pub mod normalize;
pub mod parse;

pub use config::{CleanConfig, DatePolicy, DedupPolicy};
pub use engine::{check, clean, run};
pub use error::CleanError;
pub use export::{to_csv_string, write_table};
pub use load::load_table;
pub use model::{CheckOutcome, CleanOutput, CleanReport, Field, Record, Table, Value};
