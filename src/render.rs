//! Plain-text and CSV views of result tables.

use crate::query::{Table, Value};

/// Format a table as an aligned text grid. Real numbers get two decimals;
/// numeric cells are right-aligned.
pub fn format_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for (row, raw) in cells.iter().zip(&table.rows) {
        let line: Vec<String> = row
            .iter()
            .zip(raw)
            .zip(&widths)
            .map(|((cell, value), &w)| match value {
                Value::Integer(_) | Value::Real(_) => format!("{cell:>w$}"),
                _ => format!("{cell:<w$}"),
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Real(f) => format!("{f:.2}"),
        other => other.to_display_string(),
    }
}

/// Render a table as CSV with a header row. Fields holding a separator,
/// quote or line break are quoted.
pub fn to_csv(table: &Table) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, table.columns.iter().map(String::as_str));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(Value::to_display_string).collect();
        push_csv_row(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn push_csv_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains(&[',', '"', '\n', '\r'][..]) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            columns: vec!["Industry".into(), "Revenue".into()],
            rows: vec![
                vec![Value::from("Retail"), Value::Real(75.0)],
                vec![Value::from("Health, Beauty"), Value::Real(1234.5)],
            ],
        }
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let text = format_table(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Industry        Revenue");
        assert_eq!(lines[1], "--------------  -------");
        assert_eq!(lines[2], "Retail            75.00");
        assert_eq!(lines[3], "Health, Beauty  1234.50");
    }

    #[test]
    fn test_format_empty_table_keeps_header() {
        let text = format_table(&Table::new(vec!["User ID".into()]));
        assert_eq!(text, "User ID\n-------\n");
    }

    #[test]
    fn test_to_csv() {
        let csv = to_csv(&sample());
        assert_eq!(csv, "Industry,Revenue\nRetail,75\n\"Health, Beauty\",1234.5\n");
    }

    #[test]
    fn test_to_csv_quotes_special_fields() {
        let table = Table {
            columns: vec!["Note".into()],
            rows: vec![
                vec![Value::from("say \"hi\"")],
                vec![Value::from("line\r\nbreak")],
                vec![Value::Null],
            ],
        };
        assert_eq!(
            to_csv(&table),
            "Note\n\"say \"\"hi\"\"\"\n\"line\r\nbreak\"\n\n"
        );
    }
}
