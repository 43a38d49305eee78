// src/core/report.rs
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::call_graph::AdjacencyMatrix;
use super::fortran::{InventoryRecord, RoutineKind, EXTERNAL_MODULE};
use super::tabular::Table;

/// Rendered for routines missing from the inventory
pub const UNKNOWN_KIND: &str = "unknown";

/// One callee row of the annotated matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub routine: String,
    pub module_name: String,
    pub kind: Option<RoutineKind>,
    /// Distinct callers of this routine
    pub total_connectivity: u64,
    pub cells: Vec<u32>,
}

impl ReportRow {
    pub fn kind_label(&self) -> &'static str {
        self.kind.map_or(UNKNOWN_KIND, |k| k.as_str())
    }
}

/// Reordered matrix joined with the routine inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    /// Caller labels in reordered column order
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
    /// Rows with no inventory record
    pub unmatched: Vec<String>,
}

impl ConnectivityReport {
    /// `"",total_connectivity,<callers…>`
    pub fn matrix_table(&self) -> Table {
        let mut headers = vec![String::new(), "total_connectivity".to_string()];
        headers.extend(self.columns.iter().cloned());

        let mut table = Table::new(headers);
        for row in &self.rows {
            let mut cells = vec![row.routine.clone(), row.total_connectivity.to_string()];
            cells.extend(row.cells.iter().map(u32::to_string));
            table.push_row(cells);
        }
        table
    }

    /// `obj_name,module_name,type,total_connectivity,<callers…>`
    pub fn extended_table(&self) -> Table {
        let mut headers = vec![
            "obj_name".to_string(),
            "module_name".to_string(),
            "type".to_string(),
            "total_connectivity".to_string(),
        ];
        headers.extend(self.columns.iter().cloned());

        let mut table = Table::new(headers);
        for row in &self.rows {
            let mut cells = vec![
                row.routine.clone(),
                row.module_name.clone(),
                row.kind_label().to_string(),
                row.total_connectivity.to_string(),
            ];
            cells.extend(row.cells.iter().map(u32::to_string));
            table.push_row(cells);
        }
        table
    }
}

/// Joins a reordered matrix with the inventory by routine name
#[derive(Debug, Default)]
pub struct ReportComposer;

impl ReportComposer {
    pub fn new() -> Self {
        Self
    }

    /// Left join: every matrix row survives; the first inventory record with
    /// a matching name wins; missing records get the external module and an
    /// unknown kind.
    pub fn compose(&self, reordered: &AdjacencyMatrix, inventory: &[InventoryRecord]) -> ConnectivityReport {
        let mut by_name: HashMap<&str, &InventoryRecord> = HashMap::new();
        for record in inventory {
            by_name.entry(record.obj_name.as_str()).or_insert(record);
        }

        let mut unmatched = Vec::new();
        let rows = reordered
            .row_labels()
            .iter()
            .zip(reordered.rows())
            .zip(reordered.row_sums())
            .map(|((routine, cells), total_connectivity)| {
                let record = by_name.get(routine.as_str());
                if record.is_none() {
                    unmatched.push(routine.clone());
                }

                ReportRow {
                    routine: routine.clone(),
                    module_name: record
                        .map_or_else(|| EXTERNAL_MODULE.to_string(), |r| r.module_name.clone()),
                    kind: record.map(|r| r.kind),
                    total_connectivity,
                    cells: cells.clone(),
                }
            })
            .collect();

        if !unmatched.is_empty() {
            debug!("{} routines missing from the inventory: {:?}", unmatched.len(), unmatched);
        }

        ConnectivityReport {
            columns: reordered.col_labels().to_vec(),
            rows,
            unmatched,
        }
    }
}

/// Inventory as `obj_name,module_name,type`
pub fn inventory_table(records: &[InventoryRecord]) -> Table {
    let mut table = Table::new(vec![
        "obj_name".to_string(),
        "module_name".to_string(),
        "type".to_string(),
    ]);
    for record in records {
        table.push_row(vec![
            record.obj_name.clone(),
            record.module_name.clone(),
            record.kind.to_string(),
        ]);
    }
    table
}
