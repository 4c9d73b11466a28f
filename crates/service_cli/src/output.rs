//! Report rendering: pretty JSON or boxed text tables on stdout.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// A titled text table; numeric cells are right-aligned.
#[derive(Debug, Clone, Default)]
pub struct Table {
    title: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
        self
    }

    /// Two-column key/value table.
    pub fn key_values<'a, I>(title: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut table = Table::new(["Field", "Value"]).with_title(title);
        for (key, value) in pairs {
            table.row([key.to_string(), value]);
        }
        table
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rule = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| {
                    if looks_numeric(cell) {
                        format!(" {:>w$} ", cell, w = w)
                    } else {
                        format!(" {:<w$} ", cell, w = w)
                    }
                })
                .collect();
            format!("│{}│", padded.join("│"))
        };

        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push('\n');
        }
        out.push_str(&rule("┌", "┬", "┐"));
        out.push('\n');
        out.push_str(&line(&self.headers));
        out.push('\n');
        out.push_str(&rule("├", "┼", "┤"));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out.push_str(&rule("└", "┴", "┘"));
        out
    }
}

fn looks_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

/// Fixed-point formatting.
pub fn num(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Fixed-point formatting with `-` for a missing value.
pub fn opt_num(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| num(v, decimals))
}

/// Prints `report` as JSON, or the tables built by `tables`.
pub fn emit<T, F>(format: OutputFormat, report: &T, tables: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> Vec<Table>,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            let rendered: Vec<String> = tables(report).iter().map(Table::render).collect();
            println!("{}", rendered.join("\n\n"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_columns() {
        let mut table = Table::new(["Engine", "Price"]);
        table.row(["black-scholes", "10.4506"]);
        table.row(["heston", "9.1"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 6);
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        // numbers right-aligned, text left-aligned
        assert!(lines[4].contains("│ heston        │     9.1 │"));
    }

    #[test]
    fn test_short_rows_padded() {
        let mut table = Table::new(["a", "b", "c"]).with_title("Padded");
        table.row(["1"]);
        let rendered = table.render();
        assert!(rendered.starts_with("Padded\n"));
        assert_eq!(rendered.lines().count(), 6);
    }

    #[test]
    fn test_number_helpers() {
        assert_eq!(num(1.23456, 2), "1.23");
        assert_eq!(opt_num(None, 4), "-");
        assert_eq!(opt_num(Some(-0.5), 1), "-0.5");
    }

    #[test]
    fn test_format_serde_names() {
        assert_eq!(serde_json::to_string(&OutputFormat::Json).unwrap(), "\"json\"");
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
