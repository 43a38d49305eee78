// src/core/call_graph/assembler.rs
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::super::fortran::CallMap;
use super::AdjacencyMatrix;

/// Scanner output for one file
#[derive(Debug, Clone)]
pub struct FileScan {
    pub path: PathBuf,
    pub routines: CallMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphStats {
    /// Declared routines (universe size)
    pub total_routines: usize,
    /// Distinct caller → callee pairs inside the universe
    pub total_edges: usize,
    /// Call-like references before filtering, duplicates included
    pub raw_references: usize,
    /// References to names never declared as routines
    pub external_references: usize,
    /// Routines that neither call nor are called by anything known
    pub isolated_routines: usize,
    pub most_called: Option<(String, u64)>,
}

/// Folds per-file scans into one call map and materializes the matrix
#[derive(Debug, Default)]
pub struct CallGraphAssembler;

impl CallGraphAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Union of all per-file maps.
    ///
    /// A routine declared in several files is one node: its call lists are
    /// concatenated in file order and a warning names the files involved.
    pub fn merge(&self, scans: Vec<FileScan>) -> CallMap {
        let mut merged = CallMap::new();
        let mut declared_in: HashMap<String, PathBuf> = HashMap::new();

        for scan in scans {
            for (routine, callees) in scan.routines {
                match declared_in.get(&routine) {
                    Some(first) if *first != scan.path => {
                        warn!(
                            "Routine '{}' declared in both {} and {}; treating as one node",
                            routine,
                            first.display(),
                            scan.path.display()
                        );
                    }
                    Some(_) => {}
                    None => {
                        declared_in.insert(routine.clone(), scan.path.clone());
                    }
                }

                merged.entry(routine).or_default().extend(callees);
            }
        }

        merged
    }

    /// Matrix over the universe (every declared routine), sorted by name.
    ///
    /// Cell (callee, caller) is 1 when the caller's body mentions the callee.
    /// Callees outside the universe are dropped silently.
    pub fn assemble(&self, routines: &CallMap) -> AdjacencyMatrix {
        let universe: Vec<String> = routines.keys().cloned().collect();
        let index: HashMap<&str, usize> = universe
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut matrix = AdjacencyMatrix::square(universe.clone());

        for (caller, callees) in routines {
            let col = index[caller.as_str()];
            for callee in callees {
                if let Some(&row) = index.get(callee.as_str()) {
                    matrix.set_by_index(row, col, 1);
                }
            }
        }

        debug!("Assembled {}x{} call matrix", matrix.len(), matrix.len());
        matrix
    }

    pub fn statistics(&self, routines: &CallMap, matrix: &AdjacencyMatrix) -> CallGraphStats {
        let raw_references = routines.values().map(Vec::len).sum();
        let external_references = routines
            .values()
            .flatten()
            .filter(|callee| !routines.contains_key(callee.as_str()))
            .count();

        let row_sums = matrix.row_sums();
        let col_sums = matrix.col_sums();
        let isolated_routines = row_sums
            .iter()
            .zip(&col_sums)
            .filter(|&(&r, &c)| r == 0 && c == 0)
            .count();

        let most_called = matrix
            .row_labels()
            .iter()
            .zip(&row_sums)
            .filter(|&(_, &sum)| sum > 0)
            .fold(None, |best: Option<(&String, u64)>, (label, &sum)| match best {
                Some((_, top)) if top >= sum => best,
                _ => Some((label, sum)),
            })
            .map(|(label, sum)| (label.clone(), sum));

        CallGraphStats {
            total_routines: matrix.len(),
            total_edges: matrix.edge_count(),
            raw_references,
            external_references,
            isolated_routines,
            most_called,
        }
    }

    /// Names referenced but never declared, with how often they appear
    pub fn external_names(&self, routines: &CallMap) -> BTreeMap<String, usize> {
        let mut external = BTreeMap::new();
        for callee in routines.values().flatten() {
            if !routines.contains_key(callee.as_str()) {
                *external.entry(callee.clone()).or_insert(0) += 1;
            }
        }
        external
    }

    /// Routines that call each other directly, as sorted pairs
    pub fn mutual_pairs(&self, matrix: &AdjacencyMatrix) -> BTreeSet<(String, String)> {
        let mut pairs = BTreeSet::new();
        for a in matrix.row_labels() {
            for b in matrix.col_labels() {
                if a < b && matrix.get(a, b) == Some(1) && matrix.get(b, a) == Some(1) {
                    pairs.insert((a.clone(), b.clone()));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_map(entries: &[(&str, &[&str])]) -> CallMap {
        entries
            .iter()
            .map(|(caller, callees)| {
                (caller.to_string(), callees.iter().map(|c| c.to_string()).collect())
            })
            .collect()
    }

    #[test]
    fn test_alpha_beta_gamma() {
        let assembler = CallGraphAssembler::new();
        let routines = call_map(&[("alpha", &["beta", "gamma"]), ("beta", &[])]);
        let matrix = assembler.assemble(&routines);

        assert_eq!(matrix.row_labels(), ["alpha", "beta"]);
        assert_eq!(matrix.col_labels(), ["alpha", "beta"]);
        assert_eq!(matrix.get("beta", "alpha"), Some(1));
        assert_eq!(matrix.get("alpha", "beta"), Some(0));
        assert_eq!(matrix.get("alpha", "alpha"), Some(0));
        assert_eq!(matrix.get("beta", "beta"), Some(0));
        assert_eq!(matrix.get("gamma", "alpha"), None);

        let stats = assembler.statistics(&routines, &matrix);
        assert_eq!(stats.total_routines, 2);
        assert_eq!(stats.total_edges, 1);
        assert_eq!(stats.external_references, 1);
        assert_eq!(stats.most_called, Some(("beta".to_string(), 1)));
    }

    #[test]
    fn test_multiplicity_collapses() {
        let assembler = CallGraphAssembler::new();
        let routines = call_map(&[("a", &["b", "b", "b"]), ("b", &[])]);
        let matrix = assembler.assemble(&routines);

        assert_eq!(matrix.get("b", "a"), Some(1));
        assert_eq!(matrix.edge_count(), 1);
    }

    #[test]
    fn test_mutual_recursion_sets_both_cells() {
        let assembler = CallGraphAssembler::new();
        let routines = call_map(&[("a", &["b"]), ("b", &["a"])]);
        let matrix = assembler.assemble(&routines);

        assert_eq!(matrix.get("a", "b"), Some(1));
        assert_eq!(matrix.get("b", "a"), Some(1));
        assert_eq!(matrix.get("a", "a"), Some(0));

        let pairs = assembler.mutual_pairs(&matrix);
        assert!(pairs.contains(&("a".to_string(), "b".to_string())));
    }

    #[test]
    fn test_merge_concatenates_duplicates() {
        let assembler = CallGraphAssembler::new();
        let scans = vec![
            FileScan { path: PathBuf::from("one.f90"), routines: call_map(&[("s", &["x"]), ("x", &[])]) },
            FileScan { path: PathBuf::from("two.f90"), routines: call_map(&[("s", &["y"]), ("y", &[])]) },
        ];
        let merged = assembler.merge(scans);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged["s"], vec!["x", "y"]);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let assembler = CallGraphAssembler::new();
        let routines = call_map(&[("zeta", &["alpha"]), ("alpha", &["mid"]), ("mid", &["zeta"])]);

        let first = assembler.assemble(&routines);
        let second = assembler.assemble(&routines.clone());
        assert_eq!(first, second);
        assert_eq!(first.row_labels(), ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_external_names_counted() {
        let assembler = CallGraphAssembler::new();
        let routines = call_map(&[("a", &["sqrt", "b", "sqrt"]), ("b", &["print"])]);
        let external = assembler.external_names(&routines);

        assert_eq!(external.get("sqrt"), Some(&2));
        assert_eq!(external.get("print"), Some(&1));
        assert!(!external.contains_key("b"));
    }

    #[test]
    fn test_empty_universe() {
        let assembler = CallGraphAssembler::new();
        let routines = CallMap::new();
        let matrix = assembler.assemble(&routines);

        assert!(matrix.is_empty());
        assert_eq!(assembler.statistics(&routines, &matrix), CallGraphStats::default());
    }
}
