// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use super::{
    inventory_table, matrix_from_table, matrix_table, reorder_by_sum, sort_inventory,
    collect_files, AdjacencyMatrix, AnalysisResult, CallGraphAnalyzer, FormatOptions,
    FormatOutcome, IndentFormatter, InventoryRecord, SourceLoader, SourceRequest, SourceSet, Table,
};

/// Everything `analyze` needs besides the configuration
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub request: SourceRequest,
    pub output_matrix: PathBuf,
    pub output_inventory: PathBuf,
    pub emit_matrix: bool,
    pub emit_inventory: bool,
    pub emit_extended: bool,
    /// Echo the annotated matrix to stdout
    pub print: bool,
}

/// Result of `analyze` plus the artifacts it wrote
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub result: AnalysisResult,
    pub written: Vec<PathBuf>,
    pub missing_root: Option<PathBuf>,
}

/// Tally of a formatting pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSummary {
    pub files: usize,
    pub changed: usize,
    pub failed: usize,
}

/// Main orchestration engine
pub struct Engine {
    config: Config,
    loader: SourceLoader,
    analyzer: CallGraphAnalyzer,
    formatter: IndentFormatter,
}

impl Engine {
    /// Create an engine from a config file (or the default lookup)
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let loader = SourceLoader::new(&config.scan);
        let analyzer = CallGraphAnalyzer::new()
            .map_err(|e| anyhow::anyhow!("Failed to build call graph analyzer: {}", e))?;
        let formatter = IndentFormatter::new()
            .map_err(|e| anyhow::anyhow!("Failed to build formatter: {}", e))?;

        Ok(Self {
            config,
            loader,
            analyzer,
            formatter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory or explicit file list; explicit files win
    pub fn source_request(&self, dir: Option<PathBuf>, files: Vec<PathBuf>) -> SourceRequest {
        if files.is_empty() {
            SourceRequest::Directory(dir.unwrap_or_else(|| PathBuf::from(".")))
        } else {
            SourceRequest::Files(files)
        }
    }

    /// Options seeded from the `[output]` section
    pub fn default_analyze_options(&self, request: SourceRequest) -> AnalyzeOptions {
        let output = &self.config.output;
        AnalyzeOptions {
            request,
            output_matrix: output.matrix_file.clone(),
            output_inventory: output.inventory_file.clone(),
            emit_matrix: output.emit_matrix,
            emit_inventory: output.emit_inventory,
            emit_extended: output.emit_extended,
            print: false,
        }
    }

    async fn load(&self, request: &SourceRequest) -> Result<SourceSet> {
        match request {
            SourceRequest::Directory(dir) => info!("Scanning {}", dir.display()),
            SourceRequest::Files(files) => info!("Scanning {} listed files", files.len()),
        }

        let sources = self.loader.load(request).await
            .map_err(|e| anyhow::anyhow!("Failed to load sources: {}", e))?;
        info!("Found {} source files", sources.files.len());
        Ok(sources)
    }

    /// Full pipeline: matrix, reordering, inventory, annotated report, artifacts
    pub async fn analyze(&self, options: &AnalyzeOptions) -> Result<AnalysisRun> {
        let sources = self.load(&options.request).await?;
        let result = self.analyzer.analyze(&sources);

        if result.matrix.is_empty() {
            info!("No Fortran routines found; writing empty artifacts");
        }
        if let Some((name, callers)) = &result.stats.graph.most_called {
            info!("Most called routine: {} ({} callers)", name, callers);
        }
        let mutual = self.analyzer.assembler().mutual_pairs(&result.matrix);
        if !mutual.is_empty() {
            debug!("Mutually recursive pairs: {:?}", mutual);
        }
        if !result.report.unmatched.is_empty() {
            warn!(
                "{} routines had no inventory record and were marked External",
                result.report.unmatched.len()
            );
        }

        let mut written = Vec::new();

        if options.emit_matrix {
            write_table(&result.report.matrix_table(), &options.output_matrix)?;
            info!("Adjacency matrix saved to {}", options.output_matrix.display());
            written.push(options.output_matrix.clone());
        }

        if options.emit_inventory {
            write_table(&inventory_table(&result.inventory), &options.output_inventory)?;
            info!("Routine inventory saved to {}", options.output_inventory.display());
            written.push(options.output_inventory.clone());
        }

        if options.emit_extended {
            let extended = self.config.output.extended_matrix_path(&options.output_matrix);
            write_table(&result.report.extended_table(), &extended)?;
            info!("Extended adjacency matrix with module info saved to {}", extended.display());
            written.push(extended);
        }

        if options.print {
            println!("{}", result.report.extended_table().render_text());
        }

        Ok(AnalysisRun {
            result,
            written,
            missing_root: sources.missing_root,
        })
    }

    /// Raw matrix in name order, printed and optionally saved
    pub async fn matrix(&self, request: &SourceRequest, csv: Option<&Path>) -> Result<AdjacencyMatrix> {
        let sources = self.load(request).await?;
        let (_, matrix) = self.analyzer.call_matrix(&sources);
        let table = matrix_table(&matrix);

        if let SourceRequest::Directory(dir) = request {
            println!("\nDependency Matrix for: {}", dir.display());
        }
        println!("Note: Columns are 'Callers', Rows are 'Callees'\n");
        println!("{}", table.render_text());

        if let Some(path) = csv {
            write_table(&table, path)?;
            info!("Matrix saved to {}", path.display());
        }

        Ok(matrix)
    }

    /// Inventory sorted by (module_name, obj_name)
    pub async fn inventory(&self, request: &SourceRequest, output: Option<&Path>, json: bool) -> Result<Vec<InventoryRecord>> {
        let sources = self.load(request).await?;
        let mut records = self.analyzer.inventory(&sources);

        if records.is_empty() {
            info!("No Fortran routines found in the specified location");
            return Ok(records);
        }

        sort_inventory(&mut records);
        let table = inventory_table(&records);

        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            println!("\n--- Fortran Routine Inventory ---");
            println!("{}", table.render_text());
        }

        if let Some(path) = output {
            write_table(&table, path)?;
            info!("Found {} routines; inventory saved to {}", records.len(), path.display());
        }

        Ok(records)
    }

    /// Reorder a matrix CSV by connectivity
    pub fn reorder(&self, input: &Path, output: Option<&Path>) -> Result<AdjacencyMatrix> {
        let table = Table::read_csv(input)
            .with_context(|| format!("Failed to read matrix {}", input.display()))?;
        let matrix = matrix_from_table(&table)
            .with_context(|| format!("Failed to parse matrix {}", input.display()))?;
        if !matrix.is_square() {
            debug!("Matrix in {} has differing row and column labels", input.display());
        }

        let reordered = reorder_by_sum(&matrix);
        let table = matrix_table(&reordered);

        println!("\n--- Matrix Reordered by Sum (Highest Connectivity First) ---");
        println!("{}", table.render_text());

        if let Some(path) = output {
            write_table(&table, path)?;
            info!("Saved as {}", path.display());
        }

        Ok(reordered)
    }

    /// Re-indent files; failures are reported per file and counted
    pub fn format(&self, paths: &[PathBuf], options: &FormatOptions, verbose: bool) -> FormatSummary {
        let files = collect_files(paths, &self.config.format.extensions);
        let mut summary = FormatSummary {
            files: files.len(),
            ..FormatSummary::default()
        };

        if files.is_empty() {
            info!("No Fortran files found in the specified paths");
            return summary;
        }

        for file in &files {
            let outcome = self.formatter.format_file(file, options);
            let message = outcome.describe(file);

            if outcome.is_change() {
                summary.changed += 1;
                info!("{}", message);
            } else if let FormatOutcome::Failed(_) = outcome {
                summary.failed += 1;
                warn!("{}", message);
            } else if verbose {
                info!("{}", message);
            }
        }

        if options.dry_run && summary.changed > 0 {
            info!("Run with --inplace to apply these changes");
        }

        summary
    }
}

fn write_table(table: &Table, path: &Path) -> Result<()> {
    table
        .write_csv(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
