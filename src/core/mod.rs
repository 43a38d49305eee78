mod engine;
mod sources;
mod analysis;
mod report;
mod tabular;
mod formatter;

pub mod fortran;
pub mod call_graph;

pub use sources::{SkippedFile, SourceFile, SourceLoader, SourceRequest, SourceSet};
pub use analysis::{AnalysisResult, AnalysisStatistics, CallGraphAnalyzer};
pub use report::{inventory_table, ConnectivityReport, ReportComposer, ReportRow, UNKNOWN_KIND};
pub use tabular::{matrix_from_table, matrix_table, Table};
pub use formatter::{backup_path, collect_files, FormatOptions, FormatOutcome, IndentFormatter};

pub use fortran::{
    sort_inventory, CallMap, FortranLexicon, InventoryExtractor, InventoryRecord, RoutineKind,
    ScopeScanner, EXTERNAL_MODULE,
};
pub use call_graph::{
    reorder_by_sum, AdjacencyMatrix, CallGraphAssembler, CallGraphStats, FileScan,
};

// Export the main engine
pub use engine::{AnalysisRun, AnalyzeOptions, Engine, FormatSummary};
