use crate::config::CleanConfig;
use crate::error::CleanError;
use crate::model::{Binding, Column, Field, Record, Table, Value};
use crate::normalize::fold_header;

/// Load delimited text into a table of raw `Text` values.
///
/// Every field is kept as text; typing happens in the pipeline. Short rows are
/// padded with empty text, extra trailing fields are ignored.
pub fn load_table(csv_data: &str, config: &CleanConfig) -> Result<Table, CleanError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let columns = bind_columns(&headers, config)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values = (0..columns.len())
            .map(|i| Value::Text(record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(Record { values });
    }

    Table::new(columns, rows).map_err(|field| CleanError::MissingColumn {
        column: config.columns.name_for(field).to_string(),
    })
}

/// Bind each header to a field by accent-folded name; unknown headers pass through.
pub fn bind_columns(headers: &[String], config: &CleanConfig) -> Result<Vec<Column>, CleanError> {
    let wanted: Vec<(Field, String)> = Field::ALL
        .iter()
        .map(|f| (*f, fold_header(config.columns.name_for(*f))))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
    for header in headers {
        let folded = fold_header(header);
        let binding = match wanted.iter().find(|(_, name)| *name == folded) {
            Some((field, _)) => {
                if columns.iter().any(|c| c.binding == Binding::Field(*field)) {
                    return Err(CleanError::DuplicateColumn {
                        column: header.clone(),
                    });
                }
                Binding::Field(*field)
            }
            None => Binding::Passthrough,
        };
        columns.push(Column {
            header: header.clone(),
            binding,
        });
    }

    for field in Field::ALL {
        if !columns.iter().any(|c| c.binding == Binding::Field(field)) {
            return Err(CleanError::MissingColumn {
                column: config.columns.name_for(field).to_string(),
            });
        }
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = ";sexo;tipo_de_emprendimiento;idea_negocio;barrio;estrato;comuna_ciudadano;fecha_de_beneficio;monto_del_credito;línea_credito";

    #[test]
    fn load_binds_fields_and_passthrough() {
        let csv = format!("{HEADER}\n0;M;Comercio;Venta_de-ropa;El_Poblado;3;10;2023/05/17;$1,200.00;Microcredito\n");
        let table = load_table(&csv, &CleanConfig::default()).unwrap();

        assert_eq!(table.columns.len(), 10);
        assert_eq!(table.columns[0].binding, Binding::Passthrough);
        assert_eq!(table.columns[0].header, "");
        assert_eq!(table.index_of(Field::CreditLine), 9);
        assert_eq!(table.len(), 1);

        let row = &table.rows[0];
        assert_eq!(table.value(row, Field::Sex), &Value::Text("M".into()));
        assert_eq!(
            table.value(row, Field::CreditAmount),
            &Value::Text("$1,200.00".into())
        );
    }

    #[test]
    fn load_pads_short_rows() {
        let csv = format!("{HEADER}\n1;F;Tienda\n");
        let table = load_table(&csv, &CleanConfig::default()).unwrap();
        let row = &table.rows[0];
        assert_eq!(row.values.len(), 10);
        assert_eq!(table.value(row, Field::CreditLine), &Value::Text(String::new()));
    }

    #[test]
    fn unaccented_header_binds_credit_line() {
        let csv = "sexo;tipo_de_emprendimiento;idea_negocio;barrio;estrato;comuna_ciudadano;fecha_de_beneficio;monto_del_credito;linea_credito\n";
        let table = load_table(csv, &CleanConfig::default()).unwrap();
        assert_eq!(table.columns[8].header, "linea_credito");
        assert_eq!(table.index_of(Field::CreditLine), 8);
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "sexo;tipo_de_emprendimiento;idea_negocio\nm;x;y\n";
        let err = load_table(csv, &CleanConfig::default()).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn { ref column } if column == "barrio"));
    }

    #[test]
    fn duplicate_header_is_fatal() {
        let csv = format!("{HEADER};Sexo\n");
        let err = load_table(&csv, &CleanConfig::default()).unwrap_err();
        assert!(matches!(err, CleanError::DuplicateColumn { .. }));
    }
}
