//! Row validity rules and the retain helper used by every dropping stage.

use crate::config::StratumRange;
use crate::model::{Field, Record, Stage, StageCount, Table, Value};

/// Retain rows matching `keep` and record the before/after counts.
pub fn retain_rows<F>(table: &mut Table, stage: Stage, keep: F) -> StageCount
where
    F: FnMut(&Record) -> bool,
{
    let rows_before = table.rows.len();
    table.rows.retain(keep);
    StageCount {
        stage,
        rows_before,
        rows_after: table.rows.len(),
    }
}

pub fn amount_is_positive(value: &Value) -> bool {
    matches!(value, Value::Decimal(x) if *x > 0.0)
}

pub fn stratum_in_range(value: &Value, range: &StratumRange) -> bool {
    matches!(value, Value::Integer(n) if range.contains(*n))
}

pub fn has_critical_fields(table: &Table, row: &Record) -> bool {
    Field::CRITICAL
        .iter()
        .all(|f| !table.value(row, *f).is_missing())
}

pub fn drop_invalid_amounts(table: &mut Table) -> StageCount {
    let idx = table.index_of(Field::CreditAmount);
    retain_rows(table, Stage::DropInvalidAmount, |row| {
        amount_is_positive(&row.values[idx])
    })
}

pub fn drop_invalid_strata(table: &mut Table, range: &StratumRange) -> StageCount {
    let idx = table.index_of(Field::Stratum);
    retain_rows(table, Stage::DropInvalidStratum, |row| {
        stratum_in_range(&row.values[idx], range)
    })
}

pub fn drop_missing_critical(table: &mut Table) -> StageCount {
    let indices: Vec<usize> = Field::CRITICAL.iter().map(|f| table.index_of(*f)).collect();
    retain_rows(table, Stage::DropMissingCritical, |row| {
        indices.iter().all(|&i| !row.values[i].is_missing())
    })
}
