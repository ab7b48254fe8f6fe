//! CSV and JSON rendering of data tables.

use pulseboard_core::error::PulseResult;
use pulseboard_core::types::DataTable;
use serde_json::{Map, Value};

pub fn export_csv(table: &DataTable) -> String {
    let mut csv = table.columns.join(",");
    csv.push('\n');
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|v| match v {
                Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
    csv
}

/// Array of objects keyed by column name.
pub fn export_json(table: &DataTable) -> PulseResult<String> {
    let records: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            for (col, val) in table.columns.iter().zip(row) {
                record.insert(col.clone(), val.clone());
            }
            Value::Object(record)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> DataTable {
        DataTable {
            columns: vec!["channel".into(), "users".into(), "cost".into()],
            rows: vec![
                vec![json!("Organic Search"), json!(900), json!(0.0)],
                vec![json!("Say \"hi\""), json!(10), Value::Null],
            ],
        }
    }

    #[test]
    fn test_csv_export() {
        let csv = export_csv(&table());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert_eq!(lines[0], "channel,users,cost");
        assert_eq!(lines[1], "\"Organic Search\",900,0.0");
        assert_eq!(lines[2], "\"Say \"\"hi\"\"\",10,");
    }

    #[test]
    fn test_json_export() {
        let json = export_json(&table()).unwrap();
        let parsed: Vec<Map<String, Value>> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["users"], json!(900));
        assert!(parsed[1]["cost"].is_null());
    }

    #[test]
    fn test_empty_table() {
        let empty = DataTable {
            columns: vec!["a".into()],
            rows: vec![],
        };
        assert_eq!(export_csv(&empty), "a\n");
        assert_eq!(export_json(&empty).unwrap(), "[]");
    }
}
