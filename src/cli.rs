use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::{bail, Result};
use tracing::info;

use crate::core::{Engine, FormatOptions};

#[derive(Parser)]
#[command(name = "fortmap")]
#[command(about = "Call-graph matrices, routine inventories and indentation cleanup for Fortran")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the connectivity matrix, inventory and annotated matrix
    Analyze {
        /// Directory containing Fortran source files
        dir: Option<PathBuf>,

        /// Analyze these files instead of scanning a directory
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Output CSV file for the adjacency matrix
        #[arg(long)]
        output_matrix: Option<PathBuf>,

        /// Output CSV file for the routine inventory
        #[arg(long)]
        output_inventory: Option<PathBuf>,

        /// Do not write the adjacency matrix
        #[arg(long)]
        no_matrix: bool,

        /// Do not write the routine inventory
        #[arg(long)]
        no_inventory: bool,

        /// Do not write the matrix annotated with module and type
        #[arg(long)]
        no_extended: bool,

        /// Print the annotated matrix
        #[arg(long)]
        print: bool,
    },

    /// Print the raw dependency matrix (columns call rows)
    Matrix {
        /// Directory containing Fortran source files
        dir: Option<PathBuf>,

        /// Analyze these files instead of scanning a directory
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Also save the matrix to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// List declared routines by module
    Inventory {
        /// Directory containing Fortran source files
        dir: Option<PathBuf>,

        /// Analyze these files instead of scanning a directory
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Output CSV file (defaults to the configured inventory file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not save the inventory
        #[arg(long)]
        no_output: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Reorder an existing matrix CSV by connectivity
    Reorder {
        /// Path to the dependency CSV
        file: PathBuf,

        /// Output file name for the reordered matrix
        #[arg(short, long, default_value = "reordered_matrix.csv")]
        output: PathBuf,

        /// Do not save the output to a file
        #[arg(long)]
        no_output: bool,
    },

    /// Fix indentation of free-form source files
    Format {
        /// Files or directories to process
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Number of spaces per indent level
        #[arg(long)]
        indent_size: Option<usize>,

        /// Modify files in place
        #[arg(long)]
        inplace: bool,

        /// Do not keep a backup when writing files
        #[arg(long)]
        no_backup: bool,

        /// Show which files would change without modifying them
        #[arg(long)]
        dry_run: bool,

        /// Fail if any file would change (useful for CI)
        #[arg(long)]
        check: bool,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        let verbose = self.verbose;

        match self.command {
            Commands::Analyze {
                dir,
                files,
                output_matrix,
                output_inventory,
                no_matrix,
                no_inventory,
                no_extended,
                print,
            } => {
                let request = engine.source_request(dir, files);
                let mut options = engine.default_analyze_options(request);
                if let Some(path) = output_matrix {
                    options.output_matrix = path;
                }
                if let Some(path) = output_inventory {
                    options.output_inventory = path;
                }
                options.emit_matrix &= !no_matrix;
                options.emit_inventory &= !no_inventory;
                options.emit_extended &= !no_extended;
                options.print = print;

                engine.analyze(&options).await?;
                Ok(())
            }
            Commands::Matrix { dir, files, csv } => {
                let request = engine.source_request(dir, files);
                engine.matrix(&request, csv.as_deref()).await?;
                Ok(())
            }
            Commands::Inventory { dir, files, output, no_output, json } => {
                let request = engine.source_request(dir, files);
                let output = if no_output {
                    None
                } else {
                    Some(output.unwrap_or_else(|| engine.config().output.inventory_file.clone()))
                };
                engine.inventory(&request, output.as_deref(), json).await?;
                Ok(())
            }
            Commands::Reorder { file, output, no_output } => {
                let output = (!no_output).then_some(output);
                engine.reorder(&file, output.as_deref())?;
                Ok(())
            }
            Commands::Format {
                paths,
                indent_size,
                inplace,
                no_backup,
                dry_run,
                check,
            } => {
                let mut options = FormatOptions::from_config(&engine.config().format);
                if let Some(size) = indent_size {
                    if size == 0 {
                        bail!("--indent-size must be at least 1");
                    }
                    options.indent_size = size;
                }
                options.inplace = inplace;
                options.dry_run = dry_run || check;
                options.backup &= !no_backup;

                let summary = engine.format(&paths, &options, verbose);
                info!(
                    "Formatted {} files: {} changed, {} failed",
                    summary.files, summary.changed, summary.failed
                );

                if check && summary.changed > 0 {
                    bail!("{} file(s) need reformatting", summary.changed);
                }
                Ok(())
            }
        }
    }
}
