use serde_json::Value;
use std::io::{
    self,
    Write,
};

/// Render a JSON value for display in a table cell -- strings come out bare, null comes out
/// empty, anything else is rendered as compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write rows as an aligned plain text table with a header and a dashed separator line. Trailing
/// padding is trimmed so short final cells do not leave whitespace behind.
///
/// # Errors
///
/// Returns an `io::Error` if writing to the output fails.
pub fn write_table(
    out: &mut dyn Write,
    columns: &[&str],
    rows: &[Vec<String>],
) -> io::Result<()> {
    // widths are counted in chars, not bytes -- server supplied values are not always ASCII
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let header: Vec<String> = columns.iter().map(|&c| c.to_owned()).collect();
    write_row(out, &header, &widths)?;

    let separator: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    write_row(out, &separator, &widths)?;

    for row in rows {
        write_row(out, row, &widths)?;
    }

    Ok(())
}

fn write_row(
    out: &mut dyn Write,
    cells: &[String],
    widths: &[usize],
) -> io::Result<()> {
    let mut line = String::new();

    for (cell, width) in cells.iter().zip(widths.iter()) {
        if !line.is_empty() {
            line.push_str("  ");
        }

        line.push_str(cell);

        for _ in cell.chars().count()..*width {
            line.push(' ');
        }
    }

    writeln!(out, "{}", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_render_for_humans() {
        assert_eq!("", render_value(&Value::Null));
        assert_eq!("plain", render_value(&json!("plain")));
        assert_eq!("42", render_value(&json!(42)));
        assert_eq!("[101,104]", render_value(&json!([101, 104])));
    }

    #[test]
    fn table_aligns_columns_and_trims_trailing_padding() {
        let mut out = Vec::new();

        write_table(
            &mut out,
            &["UUID", "Error"],
            &[
                vec![String::from("uuid-long-1"), String::from("boom")],
                vec![String::from("u2"), String::new()],
            ],
        )
        .unwrap();

        let expected = "\
UUID         Error
-----------  -----
uuid-long-1  boom
u2
";

        assert_eq!(expected, String::from_utf8(out).unwrap());
    }

    #[test]
    fn non_ascii_cells_keep_columns_aligned() {
        let mut out = Vec::new();

        write_table(
            &mut out,
            &["UUID", "Error"],
            &[
                vec![String::from("uuid1"), String::from("échec réseau")],
                vec![String::from("uuid2"), String::from("ok")],
            ],
        )
        .unwrap();

        let expected = "\
UUID   Error
-----  ------------
uuid1  échec réseau
uuid2  ok
";

        assert_eq!(expected, String::from_utf8(out).unwrap());
    }

    #[test]
    fn empty_table_still_prints_header() {
        let mut out = Vec::new();

        write_table(&mut out, &["UUID", "Description"], &[]).unwrap();

        let expected = "\
UUID  Description
----  -----------
";

        assert_eq!(expected, String::from_utf8(out).unwrap());
    }
}
