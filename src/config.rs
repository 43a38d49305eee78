use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FortmapError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source discovery settings
    pub scan: ScanConfig,

    /// Artifact names and which artifacts to emit
    pub output: OutputConfig,

    /// Indentation reformatter settings
    pub format: FormatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions treated as free-form Fortran (case-sensitive)
    pub extensions: Vec<String>,

    /// Descend into subdirectories of the source root
    pub recursive: bool,

    /// Skip files matched by .gitignore and friends
    pub respect_gitignore: bool,

    /// Maximum file size to scan (in bytes)
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Connectivity matrix CSV
    pub matrix_file: PathBuf,

    /// Routine inventory CSV
    pub inventory_file: PathBuf,

    /// Prefix added to the matrix file name for the annotated matrix
    pub extended_prefix: String,

    pub emit_matrix: bool,
    pub emit_inventory: bool,
    pub emit_extended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Spaces per indentation level
    pub indent_size: usize,

    /// Keep a `.bak` copy when rewriting in place
    pub backup: bool,

    /// Extensions picked up when a directory is given
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["f90".to_string(), "F90".to_string(), "f95".to_string()],
            recursive: false,
            respect_gitignore: true,
            max_file_size: 4 * 1024 * 1024, // 4MB
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            matrix_file: PathBuf::from("fortran_adjacency_matrix.csv"),
            inventory_file: PathBuf::from("fortran_routine_inventory.csv"),
            extended_prefix: "extended_".to_string(),
            emit_matrix: true,
            emit_inventory: true,
            emit_extended: true,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            backup: true,
            extensions: vec!["f90".to_string()],
        }
    }
}

impl OutputConfig {
    /// Path of the annotated matrix: same directory as the matrix, prefixed file name
    pub fn extended_matrix_path(&self, matrix_file: &Path) -> PathBuf {
        let file_name = matrix_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "matrix.csv".to_string());
        matrix_file.with_file_name(format!("{}{}", self.extended_prefix, file_name))
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| FortmapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FortmapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(FortmapError::Config(format!(
                        "config file {} does not exist",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                let candidates = ["Fortmap.toml", "fortmap.toml", ".fortmap.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.format.indent_size == 0 {
            return Err(FortmapError::Config("format.indent_size must be at least 1".to_string()));
        }
        if self.scan.extensions.is_empty() {
            return Err(FortmapError::Config("scan.extensions must not be empty".to_string()));
        }
        Ok(())
    }
}
