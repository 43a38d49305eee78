// src/core/tabular.rs
//! Plain tables and their CSV / console renderings

use std::path::Path;

use crate::error::{FortmapError, Result};
use super::call_graph::AdjacencyMatrix;

/// Header plus string rows, the common shape of every artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_record(&mut out, &self.headers);
        for row in &self.rows {
            push_csv_record(&mut out, row);
        }
        out
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_csv())?;
        Ok(())
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_csv(&content)
    }

    pub fn parse_csv(content: &str) -> Result<Self> {
        let mut records = parse_csv_records(content)?.into_iter();
        let headers = records
            .next()
            .ok_or_else(|| FortmapError::MatrixFormat("empty CSV".to_string()))?;

        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }

    /// Aligned console rendering: first column left-justified, the rest right
    pub fn render_text(&self) -> String {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(columns) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let render_line = |cells: &[String]| -> String {
            let mut line = cells
                .iter()
                .enumerate()
                .take(columns)
                .map(|(i, cell)| {
                    if i == 0 {
                        format!("{:<width$}", cell, width = widths[i])
                    } else {
                        format!("{:>width$}", cell, width = widths[i])
                    }
                })
                .collect::<Vec<_>>()
                .join("  ");
            line.truncate(line.trim_end().len());
            line
        };

        let mut out = render_line(&self.headers);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row));
            out.push('\n');
        }
        out
    }
}

/// Matrix as a table: blank corner header, row label first
pub fn matrix_table(matrix: &AdjacencyMatrix) -> Table {
    let mut headers = vec![String::new()];
    headers.extend(matrix.col_labels().iter().cloned());

    let mut table = Table::new(headers);
    for (label, cells) in matrix.row_labels().iter().zip(matrix.rows()) {
        let mut row = vec![label.clone()];
        row.extend(cells.iter().map(u32::to_string));
        table.push_row(row);
    }
    table
}

/// Inverse of [`matrix_table`]: first column = row labels, integer cells
pub fn matrix_from_table(table: &Table) -> Result<AdjacencyMatrix> {
    let col_labels: Vec<String> = table.headers.iter().skip(1).cloned().collect();
    let mut row_labels = Vec::with_capacity(table.rows.len());
    let mut cells = Vec::with_capacity(table.rows.len());

    for (line, row) in table.rows.iter().enumerate() {
        let (label, values) = row
            .split_first()
            .ok_or_else(|| FortmapError::MatrixFormat(format!("row {} is empty", line + 2)))?;

        let parsed = values
            .iter()
            .map(|v| {
                v.trim().parse::<u32>().map_err(|_| {
                    FortmapError::MatrixFormat(format!("row '{}': '{}' is not a count", label, v))
                })
            })
            .collect::<Result<Vec<u32>>>()?;

        row_labels.push(label.clone());
        cells.push(parsed);
    }

    AdjacencyMatrix::from_parts(row_labels, col_labels, cells)
}

fn push_csv_record(out: &mut String, fields: &[String]) {
    let encoded: Vec<String> = fields.iter().map(|f| escape_csv_field(f)).collect();
    out.push_str(&encoded.join(","));
    out.push('\n');
}

fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn parse_csv_records(content: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(FortmapError::MatrixFormat("unterminated quoted field".to_string()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}
