// src/core/analysis.rs
use std::time::Instant;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use super::call_graph::{reorder_by_sum, AdjacencyMatrix, CallGraphAssembler, CallGraphStats, FileScan};
use super::fortran::{CallMap, FortranLexicon, InventoryExtractor, InventoryRecord, ScopeScanner};
use super::report::{ConnectivityReport, ReportComposer};
use super::sources::SourceSet;

/// Runs scanner → assembler → reorder and inventory → composer over a source set
pub struct CallGraphAnalyzer {
    scanner: ScopeScanner,
    extractor: InventoryExtractor,
    assembler: CallGraphAssembler,
    composer: ReportComposer,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Merged raw callee lists per routine
    pub call_map: CallMap,
    /// Matrix in name order
    pub matrix: AdjacencyMatrix,
    /// Matrix sorted by connectivity
    pub reordered: AdjacencyMatrix,
    /// Declared routines in discovery order
    pub inventory: Vec<InventoryRecord>,
    pub report: ConnectivityReport,
    pub stats: AnalysisStatistics,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStatistics {
    pub graph: CallGraphStats,
    pub inventory_records: usize,
    pub files_analyzed: usize,
    pub files_skipped: usize,
    pub analysis_time_ms: u128,
}

impl CallGraphAnalyzer {
    pub fn new() -> Result<Self> {
        let lexicon = FortranLexicon::new()?;
        Ok(Self {
            scanner: ScopeScanner::new(lexicon.clone()),
            extractor: InventoryExtractor::new(lexicon),
            assembler: CallGraphAssembler::new(),
            composer: ReportComposer::new(),
        })
    }

    pub fn assembler(&self) -> &CallGraphAssembler {
        &self.assembler
    }

    /// Full pipeline
    pub fn analyze(&self, sources: &SourceSet) -> AnalysisResult {
        let start_time = Instant::now();

        let (call_map, matrix) = self.call_matrix(sources);
        let reordered = reorder_by_sum(&matrix);
        let inventory = self.inventory(sources);
        let report = self.composer.compose(&reordered, &inventory);

        let stats = AnalysisStatistics {
            graph: self.assembler.statistics(&call_map, &matrix),
            inventory_records: inventory.len(),
            files_analyzed: sources.files.len(),
            files_skipped: sources.skipped.len(),
            analysis_time_ms: start_time.elapsed().as_millis(),
        };

        info!(
            "Analyzed {} files: {} routines, {} call edges, {} external references dropped",
            stats.files_analyzed,
            stats.graph.total_routines,
            stats.graph.total_edges,
            stats.graph.external_references
        );

        AnalysisResult {
            call_map,
            matrix,
            reordered,
            inventory,
            report,
            stats,
        }
    }

    /// Scan every file independently
    pub fn scan_files(&self, sources: &SourceSet) -> Vec<FileScan> {
        sources
            .files
            .iter()
            .map(|file| {
                let routines = self.scanner.scan(&file.content);
                debug!("{}: {} routines", file.path.display(), routines.len());
                FileScan {
                    path: file.path.clone(),
                    routines,
                }
            })
            .collect()
    }

    /// Merged call map and its matrix in name order
    pub fn call_matrix(&self, sources: &SourceSet) -> (CallMap, AdjacencyMatrix) {
        let call_map = self.assembler.merge(self.scan_files(sources));
        let matrix = self.assembler.assemble(&call_map);
        (call_map, matrix)
    }

    /// Inventory records of all files, file order then line order
    pub fn inventory(&self, sources: &SourceSet) -> Vec<InventoryRecord> {
        sources
            .files
            .iter()
            .flat_map(|file| self.extractor.extract(&file.content))
            .collect()
    }
}
