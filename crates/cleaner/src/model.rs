use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{DatePolicy, DedupPolicy};
use crate::parse::{format_amount, format_benefit_date};

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// The nine named fields of a credit-request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Sex,
    BusinessType,
    BusinessIdea,
    Neighborhood,
    Stratum,
    Commune,
    BenefitDate,
    CreditAmount,
    CreditLine,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Sex,
        Field::BusinessType,
        Field::BusinessIdea,
        Field::Neighborhood,
        Field::Stratum,
        Field::Commune,
        Field::BenefitDate,
        Field::CreditAmount,
        Field::CreditLine,
    ];

    /// A row missing any of these is dropped.
    pub const CRITICAL: [Field; 3] = [Field::Sex, Field::BusinessType, Field::BusinessIdea];

    /// Lower-cased during normalization, with `_` and `-` turned into spaces.
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            Field::Sex
                | Field::BusinessType
                | Field::BusinessIdea
                | Field::Neighborhood
                | Field::Commune
                | Field::CreditLine
        )
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sex => write!(f, "sex"),
            Self::BusinessType => write!(f, "business_type"),
            Self::BusinessIdea => write!(f, "business_idea"),
            Self::Neighborhood => write!(f, "neighborhood"),
            Self::Stratum => write!(f, "stratum"),
            Self::Commune => write!(f, "commune"),
            Self::BenefitDate => write!(f, "benefit_date"),
            Self::CreditAmount => write!(f, "credit_amount"),
            Self::CreditLine => write!(f, "credit_line"),
        }
    }
}

// ---------------------------------------------------------------------------
// Values + records
// ---------------------------------------------------------------------------

/// One cell. Starts as raw `Text` and is narrowed by the pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Output rendering. Missing values render as the empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Text(s) => s.clone(),
            Value::Integer(n) => n.to_string(),
            Value::Decimal(x) => format_amount(*x),
            Value::Date(d) => format_benefit_date(*d),
        }
    }
}

/// A row; `values` is parallel to `Table::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Value::is_missing)
    }

    pub fn is_complete(&self) -> bool {
        !self.values.iter().any(Value::is_missing)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// What a header column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Field(Field),
    /// Any other input column, carried through verbatim.
    Passthrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header text as read from the input.
    pub header: String,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Record>,
    /// Column index of each field, in `Field::ALL` order.
    field_index: [usize; 9],
}

impl Table {
    /// Build a table from a column layout that binds every field.
    /// Fails with the first field that has no column.
    pub fn new(columns: Vec<Column>, rows: Vec<Record>) -> Result<Self, Field> {
        let mut field_index = [0usize; 9];
        for field in Field::ALL {
            field_index[field as usize] = columns
                .iter()
                .position(|c| c.binding == Binding::Field(field))
                .ok_or(field)?;
        }
        Ok(Self {
            columns,
            rows,
            field_index,
        })
    }

    pub fn index_of(&self, field: Field) -> usize {
        // Field::ALL lists the variants in declaration order
        self.field_index[field as usize]
    }

    pub fn value<'a>(&self, row: &'a Record, field: Field) -> &'a Value {
        &row.values[self.index_of(field)]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row rendered to output strings, in column order.
    pub fn rendered_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| r.values.iter().map(Value::render).collect())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Row-dropping stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DropEmpty,
    DropIncomplete,
    DropDuplicates,
    DropInvalidAmount,
    DropInvalidStratum,
    DropMissingCritical,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DropEmpty => write!(f, "drop_empty"),
            Self::DropIncomplete => write!(f, "drop_incomplete"),
            Self::DropDuplicates => write!(f, "drop_duplicates"),
            Self::DropInvalidAmount => write!(f, "drop_invalid_amount"),
            Self::DropInvalidStratum => write!(f, "drop_invalid_stratum"),
            Self::DropMissingCritical => write!(f, "drop_missing_critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageCount {
    pub stage: Stage,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl StageCount {
    pub fn dropped(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Present-but-unparseable values coerced to missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coercions {
    pub amounts: usize,
    pub strata: usize,
    pub dates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanReport {
    pub dedup: DedupPolicy,
    pub dates: DatePolicy,
    pub rows_read: usize,
    pub rows_written: usize,
    pub stages: Vec<StageCount>,
    pub coercions: Coercions,
}

#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub table: Table,
    pub report: CleanReport,
}

/// Result of cleaning a file that may already be clean.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub already_clean: bool,
    /// Data rows whose rendering differs, or that were dropped or reordered.
    pub rows_changed: usize,
    pub report: CleanReport,
}
