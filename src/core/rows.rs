use crate::domain::model::{Record, Table};
use crate::utils::error::{CaixaError, Result};
use serde_json::Value;
use std::io::Read;

/// Zips every row with the column names. A row with a different arity than
/// the column list is rejected rather than truncated.
pub fn rows_to_json(columns: &[String], rows: Vec<Vec<Value>>) -> Result<Vec<Record>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            if row.len() != columns.len() {
                return Err(CaixaError::ProcessingError {
                    message: format!(
                        "Row {} has {} values but there are {} columns",
                        index + 1,
                        row.len(),
                        columns.len()
                    ),
                });
            }
            let record: Record = columns.iter().cloned().zip(row).collect();
            Ok(record)
        })
        .collect()
}

pub fn table_to_json(table: Table) -> Result<Vec<Record>> {
    rows_to_json(&table.columns, table.rows)
}

/// Reads delimited text whose first line is the header.
pub fn read_csv_table<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(infer_value).collect());
    }

    tracing::debug!("Read {} rows across {} columns", rows.len(), columns.len());
    Ok(Table { columns, rows })
}

/// Empty cells become null; integers, floats and booleans keep their JSON type.
///
/// Digit strings that a number would not reproduce exactly stay strings:
/// leading zeros (CPF, CEP, account numbers) and integers beyond 64 bits.
pub fn infer_value(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if has_leading_zero(cell) {
        return Value::String(cell.to_string());
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(u) = cell.parse::<u64>() {
        return Value::from(u);
    }
    if is_integer_literal(cell) {
        return Value::String(cell.to_string());
    }
    if let Ok(f) = cell.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

fn unsigned(cell: &str) -> &str {
    cell.strip_prefix(['-', '+']).unwrap_or(cell)
}

/// `0`, `0.5` and `-0.25` are numbers; `01234567890` is an identifier.
fn has_leading_zero(cell: &str) -> bool {
    let digits = unsigned(cell);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

fn is_integer_literal(cell: &str) -> bool {
    let digits = unsigned(cell);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
