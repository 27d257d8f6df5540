use std::io::Write;

use crate::config::CleanConfig;
use crate::error::CleanError;
use crate::model::{Table, Value};

/// Write the header and every row with the configured delimiter. No index
/// column; missing values are empty fields.
pub fn write_table<W: Write>(table: &Table, writer: W, config: &CleanConfig) -> Result<(), CleanError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter_byte())
        .from_writer(writer);

    writer.write_record(table.columns.iter().map(|c| c.header.as_str()))?;
    for row in &table.rows {
        writer.write_record(row.values.iter().map(Value::render))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &Table, config: &CleanConfig) -> Result<String, CleanError> {
    let mut buf = Vec::new();
    write_table(table, &mut buf, config)?;
    // Every value originates from a &str
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
