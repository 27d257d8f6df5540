use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::{CleanConfig, DatePolicy};
use crate::dedup::drop_duplicates;
use crate::error::CleanError;
use crate::filter::{drop_invalid_amounts, drop_invalid_strata, drop_missing_critical, retain_rows};
use crate::load::load_table;
use crate::model::{
    Binding, CheckOutcome, CleanOutput, CleanReport, Coercions, Field, Record, Stage, Table, Value,
};
use crate::normalize::{lowercase, normalize_missing, normalize_separators};
use crate::parse::{
    parse_amount, parse_benefit_date, parse_stratum, reformat_benefit_date, sortable_date,
};

/// Load and clean delimited text.
pub fn run(csv_data: &str, config: &CleanConfig) -> Result<CleanOutput, CleanError> {
    let mut table = load_table(csv_data, config)?;
    let report = clean(&mut table, config);
    Ok(CleanOutput { table, report })
}

/// Run every pipeline stage over `table` in place.
///
/// Only `Text` values are normalized or parsed, so cleaning an already clean
/// table leaves it unchanged.
pub fn clean(table: &mut Table, config: &CleanConfig) -> CleanReport {
    let rows_read = table.len();
    info!(rows = rows_read, dedup = %config.dedup, dates = %config.dates, "cleaning table");

    normalize_text(table, config);
    let coercions = coerce_types(table, config);
    debug!(
        amounts = coercions.amounts,
        strata = coercions.strata,
        dates = coercions.dates,
        "unparseable values coerced to missing"
    );

    let mut stages = Vec::with_capacity(6);
    stages.push(retain_rows(table, Stage::DropEmpty, |row| !row.is_empty()));
    if config.require_complete_rows {
        stages.push(retain_rows(table, Stage::DropIncomplete, Record::is_complete));
    }
    stages.push(drop_duplicates(table, config.dedup));
    stages.push(drop_invalid_amounts(table));
    stages.push(drop_invalid_strata(table, &config.stratum));
    stages.push(drop_missing_critical(table));

    for count in &stages {
        info!(
            stage = %count.stage,
            rows_before = count.rows_before,
            rows_after = count.rows_after,
            "stage complete"
        );
    }

    sort_by_benefit_date(table);

    CleanReport {
        dedup: config.dedup,
        dates: config.dates,
        rows_read,
        rows_written: table.len(),
        stages,
        coercions,
    }
}

/// Clean `csv_data` and report whether the result differs from the input.
pub fn check(csv_data: &str, config: &CleanConfig) -> Result<CheckOutcome, CleanError> {
    let mut table = load_table(csv_data, config)?;
    let before = table.rendered_rows();
    let report = clean(&mut table, config);
    let after = table.rendered_rows();

    let rows_changed = (0..before.len().max(after.len()))
        .filter(|&i| before.get(i) != after.get(i))
        .count();

    Ok(CheckOutcome {
        already_clean: rows_changed == 0,
        rows_changed,
        report,
    })
}

// ---------------------------------------------------------------------------
// Stages 1-3: text normalization
// ---------------------------------------------------------------------------

fn normalize_text(table: &mut Table, config: &CleanConfig) {
    let bindings: Vec<Binding> = table.columns.iter().map(|c| c.binding).collect();

    for row in &mut table.rows {
        for (value, binding) in row.values.iter_mut().zip(&bindings) {
            let Value::Text(raw) = value else {
                continue;
            };
            let Some(mut text) = normalize_missing(raw, &config.null_tokens) else {
                *value = Value::Missing;
                continue;
            };
            if let Binding::Field(field) = binding {
                if field.is_categorical() {
                    // Removing separators can leave a null token ("_nan")
                    match normalize_separators(&lowercase(&text))
                        .and_then(|t| normalize_missing(&t, &config.null_tokens))
                    {
                        Some(t) => text = t,
                        None => {
                            *value = Value::Missing;
                            continue;
                        }
                    }
                }
            }
            *value = Value::Text(text);
        }
    }
}

// ---------------------------------------------------------------------------
// Stages 4-6: numeric and date coercion
// ---------------------------------------------------------------------------

fn coerce_types(table: &mut Table, config: &CleanConfig) -> Coercions {
    let amount_idx = table.index_of(Field::CreditAmount);
    let stratum_idx = table.index_of(Field::Stratum);
    let date_idx = table.index_of(Field::BenefitDate);
    let mut coercions = Coercions::default();

    for row in &mut table.rows {
        if let Value::Text(raw) = &row.values[amount_idx] {
            row.values[amount_idx] = match parse_amount(raw) {
                Some(x) => Value::Decimal(x),
                None => {
                    coercions.amounts += 1;
                    Value::Missing
                }
            };
        }

        if let Value::Text(raw) = &row.values[stratum_idx] {
            row.values[stratum_idx] = match parse_stratum(raw) {
                Some(n) => Value::Integer(n),
                None => {
                    coercions.strata += 1;
                    Value::Missing
                }
            };
        }

        if let Value::Text(raw) = &row.values[date_idx] {
            row.values[date_idx] = match config.dates {
                DatePolicy::Parse => match parse_benefit_date(raw) {
                    Some(d) => Value::Date(d),
                    None => {
                        coercions.dates += 1;
                        Value::Missing
                    }
                },
                DatePolicy::Reformat => Value::Text(reformat_benefit_date(raw)),
            };
        }
    }

    coercions
}

// ---------------------------------------------------------------------------
// Stage 12: ordering
// ---------------------------------------------------------------------------

fn date_sort_key(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) => sortable_date(s),
        _ => None,
    }
}

/// Stable ascending sort; missing or unreadable dates go last.
fn sort_by_benefit_date(table: &mut Table) {
    let idx = table.index_of(Field::BenefitDate);
    table.rows.sort_by_key(|row| {
        let key = date_sort_key(&row.values[idx]);
        (key.is_none(), key)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DedupPolicy;
    use crate::export::to_csv_string;

    const HEADER: &str = "sexo;tipo_de_emprendimiento;idea_negocio;barrio;estrato;comuna_ciudadano;fecha_de_beneficio;monto_del_credito;línea_credito";

    fn csv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        for r in rows {
            out.push_str(r);
            out.push('\n');
        }
        out
    }

    fn rendered(output: &CleanOutput) -> Vec<Vec<String>> {
        output.table.rendered_rows()
    }

    #[test]
    fn reference_row_is_normalized() {
        let data = csv(&["M;Comercio;Venta_de-ropa;El_Poblado;3;10;2023/05/17;$1,200.00;Microcredito"]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        assert_eq!(
            rendered(&out),
            vec![vec![
                "m",
                "comercio",
                "venta de ropa",
                "el poblado",
                "3",
                "10",
                "17/05/2023",
                "1200.0",
                "microcredito"
            ]]
        );
    }

    #[test]
    fn reference_row_under_reformat_policy() {
        let data = csv(&["M;Comercio;Venta_de-ropa;El_Poblado;3;10;2023/05/17;$1,200.00;Microcredito"]);
        let config = CleanConfig {
            dates: DatePolicy::Reformat,
            ..CleanConfig::default()
        };
        let out = run(&data, &config).unwrap();
        assert_eq!(out.table.rows[0].values[6], Value::Text("17/05/2023".into()));
    }

    #[test]
    fn zero_amount_is_dropped() {
        let data = csv(&[
            "M;Comercio;ropa;centro;3;10;17/05/2023;$0;micro",
            "F;Comercio;pan;centro;3;10;17/05/2023;$10;micro",
        ]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.table.rows[0].values[0], Value::Text("f".into()));
    }

    #[test]
    fn out_of_range_stratum_is_dropped() {
        let data = csv(&[
            "M;Comercio;ropa;centro;7;10;17/05/2023;$10;micro",
            "M;Comercio;ropa;centro;0;10;17/05/2023;$10;micro",
            "M;Comercio;ropa;centro;tres;10;17/05/2023;$10;micro",
        ]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        assert!(out.table.is_empty());
        assert_eq!(out.report.coercions.strata, 1);
    }

    #[test]
    fn identical_rows_collapse() {
        let row = "M;Comercio;ropa;centro;3;10;17/05/2023;$10;micro";
        let data = csv(&[row, row]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        assert_eq!(out.table.len(), 1);
    }

    #[test]
    fn rows_equal_after_normalization_collapse() {
        let data = csv(&[
            "M;Comercio;venta_de_ropa;centro;3;10;2023/05/17;$1,000;micro",
            " m ;COMERCIO;Venta-de-ropa;Centro;3.0;10;17/05/2023;1000.00;Micro",
        ]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        assert_eq!(out.table.len(), 1);
        let dup = out
            .report
            .stages
            .iter()
            .find(|s| s.stage == Stage::DropDuplicates)
            .unwrap();
        assert_eq!(dup.dropped(), 1);
    }

    #[test]
    fn missing_critical_fields_are_dropped() {
        let data = csv(&[
            ";Comercio;ropa;centro;3;10;17/05/2023;$10;micro",
            "M;nan;ropa;centro;3;10;17/05/2023;$10;micro",
            "M;Comercio;__;centro;3;10;17/05/2023;$10;micro",
            "M;Comercio;ropa;;3;;;$10;",
        ]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        // Only the row missing non-critical fields survives
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.table.rows[0].values[3], Value::Missing);
    }

    #[test]
    fn entirely_missing_rows_are_dropped_first() {
        let data = csv(&[";;;;;;;;", "NaN;null;None; ; ; ; ; ;"]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        assert!(out.table.is_empty());
        assert_eq!(out.report.stages[0].stage, Stage::DropEmpty);
        assert_eq!(out.report.stages[0].dropped(), 2);
    }

    #[test]
    fn complete_rows_policy_drops_partial_rows() {
        let data = csv(&[
            "M;Comercio;ropa;;3;10;17/05/2023;$10;micro",
            "M;Comercio;pan;centro;3;10;17/05/2023;$10;micro",
        ]);
        let config = CleanConfig {
            require_complete_rows: true,
            ..CleanConfig::default()
        };
        let out = run(&data, &config).unwrap();
        assert_eq!(out.table.len(), 1);
        assert!(out
            .report
            .stages
            .iter()
            .any(|s| s.stage == Stage::DropIncomplete && s.dropped() == 1));
    }

    #[test]
    fn unparseable_dates_become_missing_and_sort_last() {
        let data = csv(&[
            "M;Comercio;a;centro;3;10;ayer;$10;micro",
            "M;Comercio;b;centro;3;10;01/02/2023;$10;micro",
            "M;Comercio;c;centro;3;10;2022/12/31;$10;micro",
        ]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        let ideas: Vec<String> = out.table.rows.iter().map(|r| r.values[2].render()).collect();
        assert_eq!(ideas, vec!["c", "b", "a"]);
        assert_eq!(out.table.rows[2].values[6], Value::Missing);
        assert_eq!(out.report.coercions.dates, 1);
    }

    #[test]
    fn reformat_policy_keeps_unknown_shapes_and_sorts_them_last() {
        let data = csv(&[
            "M;Comercio;a;centro;3;10;ayer;$10;micro",
            "M;Comercio;b;centro;3;10;2023/02/01;$10;micro",
            "M;Comercio;c;centro;3;10;15/01/2023;$10;micro",
        ]);
        let config = CleanConfig {
            dates: DatePolicy::Reformat,
            ..CleanConfig::default()
        };
        let out = run(&data, &config).unwrap();
        let dates: Vec<String> = out.table.rows.iter().map(|r| r.values[6].render()).collect();
        assert_eq!(dates, vec!["15/01/2023", "01/02/2023", "ayer"]);
        assert_eq!(out.report.coercions.dates, 0);
    }

    #[test]
    fn report_counts_every_stage() {
        let data = csv(&[
            "M;Comercio;ropa;centro;3;10;17/05/2023;$10;micro",
            "M;Comercio;ropa;centro;3;10;17/05/2023;$10;micro",
            "M;Comercio;pan;centro;3;10;17/05/2023;abc;micro",
        ]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        let r = &out.report;
        assert_eq!(r.rows_read, 3);
        assert_eq!(r.rows_written, 1);
        assert_eq!(r.dedup, DedupPolicy::KeySubset);
        assert_eq!(r.coercions.amounts, 1);
        let stages: Vec<Stage> = r.stages.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::DropEmpty,
                Stage::DropDuplicates,
                Stage::DropInvalidAmount,
                Stage::DropInvalidStratum,
                Stage::DropMissingCritical,
            ]
        );
    }

    #[test]
    fn cleaning_twice_in_memory_is_a_no_op() {
        let data = csv(&[
            "M;Comercio;Venta_de-ropa;El_Poblado;3;10;2023/05/17;$1,200.00;Microcredito",
            "F;Servicio;Peluqueria;La-Loma;2;4;01/01/2022;$500;Mujer_Emprendedora",
        ]);
        let config = CleanConfig::default();
        let mut out = run(&data, &config).unwrap();
        let first = out.table.clone();
        let report = clean(&mut out.table, &config);
        assert_eq!(out.table, first);
        assert_eq!(report.rows_read, report.rows_written);
    }

    #[test]
    fn check_detects_dirty_and_clean_input() {
        let config = CleanConfig::default();
        let dirty = csv(&["M;Comercio;Venta_de-ropa;El_Poblado;3;10;2023/05/17;$1,200.00;Microcredito"]);
        let outcome = check(&dirty, &config).unwrap();
        assert!(!outcome.already_clean);
        assert_eq!(outcome.rows_changed, 1);

        let cleaned = to_csv_string(&run(&dirty, &config).unwrap().table, &config).unwrap();
        let outcome = check(&cleaned, &config).unwrap();
        assert!(outcome.already_clean, "cleaned output should be stable");
        assert_eq!(outcome.rows_changed, 0);
    }

    #[test]
    fn null_token_behind_separators_is_missing() {
        let data = csv(&[
            "M;Comercio;_nan;Centro;3;10;17/05/2023;$10;Micro",
            "F;Comercio;Pan;null_;3;10;17/05/2023;$20;None-",
        ]);
        let config = CleanConfig::default();
        let out = run(&data, &config).unwrap();
        // The first row loses its business idea and is dropped as incomplete
        assert_eq!(
            rendered(&out),
            vec![vec!["f", "comercio", "pan", "", "3", "10", "17/05/2023", "20.0", ""]]
        );

        let cleaned = to_csv_string(&out.table, &config).unwrap();
        assert!(check(&cleaned, &config).unwrap().already_clean);
    }

    #[test]
    fn separators_removed_from_every_categorical_field() {
        let data = csv(&["M_;Agro_Industria;pan;centro;3;Comuna-10;17/05/2023;$10;micro"]);
        let out = run(&data, &CleanConfig::default()).unwrap();
        assert_eq!(
            rendered(&out),
            vec![vec!["m", "agro industria", "pan", "centro", "3", "comuna 10", "17/05/2023", "10.0", "micro"]]
        );
    }
}
