use std::collections::HashSet;

use crate::config::DedupPolicy;
use crate::model::{Binding, Record, Stage, StageCount, Table, Value};

/// Column indices that make up the duplicate key under `policy`.
pub fn key_columns(table: &Table, policy: DedupPolicy) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| match policy {
            DedupPolicy::FullRow => true,
            DedupPolicy::KeySubset => matches!(c.binding, Binding::Field(_)),
        })
        .map(|(i, _)| i)
        .collect()
}

/// Rendered key values; missing renders as empty, which never collides with
/// present text because stage one turns empty text into missing.
pub fn dedup_key(row: &Record, key_columns: &[usize]) -> Vec<String> {
    key_columns
        .iter()
        .map(|&i| row.values.get(i).map(Value::render).unwrap_or_default())
        .collect()
}

/// Keep the first occurrence of every key.
pub fn drop_duplicates(table: &mut Table, policy: DedupPolicy) -> StageCount {
    let columns = key_columns(table, policy);
    let rows_before = table.rows.len();

    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows_before);
    table.rows.retain(|row| seen.insert(dedup_key(row, &columns)));

    StageCount {
        stage: Stage::DropDuplicates,
        rows_before,
        rows_after: table.rows.len(),
    }
}
