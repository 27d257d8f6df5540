use serde::{Deserialize, Serialize};

use crate::error::CleanError;
use crate::model::Field;

pub const DEFAULT_INPUT: &str = "files/input/solicitudes_de_credito.csv";
pub const DEFAULT_OUTPUT: &str = "files/output/solicitudes_de_credito.csv";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CleanConfig {
    #[serde(default = "default_input")]
    pub input: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Case-insensitive tokens read as a missing value.
    #[serde(default = "default_null_tokens")]
    pub null_tokens: Vec<String>,
    #[serde(default)]
    pub dedup: DedupPolicy,
    #[serde(default)]
    pub dates: DatePolicy,
    /// Drop any row with at least one missing field before deduplication.
    #[serde(default)]
    pub require_complete_rows: bool,
    #[serde(default)]
    pub stratum: StratumRange,
    #[serde(default)]
    pub columns: ColumnNames,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            delimiter: default_delimiter(),
            null_tokens: default_null_tokens(),
            dedup: DedupPolicy::default(),
            dates: DatePolicy::default(),
            require_complete_rows: false,
            stratum: StratumRange::default(),
            columns: ColumnNames::default(),
        }
    }
}

fn default_input() -> String {
    DEFAULT_INPUT.into()
}

fn default_output() -> String {
    DEFAULT_OUTPUT.into()
}

fn default_delimiter() -> char {
    ';'
}

fn default_null_tokens() -> Vec<String> {
    vec!["nan".into(), "null".into(), "none".into()]
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Which columns decide whether two rows are duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// The nine record fields; passthrough columns are ignored.
    #[default]
    KeySubset,
    /// Every column, passthrough columns included.
    FullRow,
}

/// How the benefit date is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Parse into a calendar date (day-first), unparseable values become missing.
    #[default]
    Parse,
    /// Rewrite `YYYY/MM/DD` to `DD/MM/YYYY` textually, leave anything else untouched.
    Reformat,
}

impl std::fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeySubset => write!(f, "key_subset"),
            Self::FullRow => write!(f, "full_row"),
        }
    }
}

impl std::fmt::Display for DatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Reformat => write!(f, "reformat"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stratum range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct StratumRange {
    pub min: i64,
    pub max: i64,
}

impl Default for StratumRange {
    fn default() -> Self {
        Self { min: 1, max: 6 }
    }
}

impl StratumRange {
    pub fn contains(&self, stratum: i64) -> bool {
        (self.min..=self.max).contains(&stratum)
    }
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Header names bound to each record field.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub sex: String,
    pub business_type: String,
    pub business_idea: String,
    pub neighborhood: String,
    pub stratum: String,
    pub commune: String,
    pub benefit_date: String,
    pub credit_amount: String,
    pub credit_line: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            sex: "sexo".into(),
            business_type: "tipo_de_emprendimiento".into(),
            business_idea: "idea_negocio".into(),
            neighborhood: "barrio".into(),
            stratum: "estrato".into(),
            commune: "comuna_ciudadano".into(),
            benefit_date: "fecha_de_beneficio".into(),
            credit_amount: "monto_del_credito".into(),
            credit_line: "línea_credito".into(),
        }
    }
}

impl ColumnNames {
    pub fn name_for(&self, field: Field) -> &str {
        match field {
            Field::Sex => &self.sex,
            Field::BusinessType => &self.business_type,
            Field::BusinessIdea => &self.business_idea,
            Field::Neighborhood => &self.neighborhood,
            Field::Stratum => &self.stratum,
            Field::Commune => &self.commune,
            Field::BenefitDate => &self.benefit_date,
            Field::CreditAmount => &self.credit_amount,
            Field::CreditLine => &self.credit_line,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing + validation
// ---------------------------------------------------------------------------

impl CleanConfig {
    pub fn from_toml(input: &str) -> Result<Self, CleanError> {
        let config: CleanConfig =
            toml::from_str(input).map_err(|e| CleanError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CleanError> {
        // The csv crate takes a single byte
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(CleanError::ConfigValidation(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )));
        }

        if self.stratum.min > self.stratum.max {
            return Err(CleanError::ConfigValidation(format!(
                "stratum.min ({}) is greater than stratum.max ({})",
                self.stratum.min, self.stratum.max
            )));
        }

        let mut seen: Vec<String> = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let name = self.columns.name_for(field);
            if name.trim().is_empty() {
                return Err(CleanError::ConfigValidation(format!(
                    "column name for '{field}' is empty"
                )));
            }
            let folded = crate::normalize::fold_header(name);
            if seen.contains(&folded) {
                return Err(CleanError::ConfigValidation(format!(
                    "column name '{name}' is bound to more than one field"
                )));
            }
            seen.push(folded);
        }

        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
