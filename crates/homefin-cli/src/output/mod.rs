pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split a result object into its scalar fields and its row collections
/// (schedule periods, comparison entries).
///
/// Nested objects are flattened into dotted keys, e.g. `loan_term.years`.
pub(crate) fn split_result(
    result: &Map<String, Value>,
) -> (Vec<(String, Value)>, Vec<(String, Vec<Value>)>) {
    let mut fields = Vec::new();
    let mut collections = Vec::new();
    for (key, val) in result {
        match val {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                collections.push((key.clone(), items.clone()));
            }
            _ => flatten_into(key, val, &mut fields),
        }
    }
    (fields, collections)
}

/// One table row per object; nested objects are flattened and nested
/// collections are left out.
pub(crate) fn flatten_row(item: &Value) -> Vec<(String, Value)> {
    let mut row = Vec::new();
    if let Value::Object(map) = item {
        for (key, val) in map {
            match val {
                Value::Object(inner) => {
                    for (inner_key, inner_val) in inner {
                        let seen = row.iter().any(|(k, _)| k == inner_key);
                        if !seen && !inner_val.is_array() {
                            flatten_into(inner_key, inner_val, &mut row);
                        }
                    }
                }
                Value::Array(_) => {}
                _ => row.push((key.clone(), val.clone())),
            }
        }
    }
    row
}

/// Column headers in order of first appearance; rows of a comparison differ
/// between solved and unsolvable entries.
pub(crate) fn headers(rows: &[Vec<(String, Value)>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for (key, _) in row {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten_into(&format!("{prefix}.{key}"), val, out);
            }
        }
        _ => out.push((prefix.to_string(), value.clone())),
    }
}
