// src/core/sources.rs
use std::path::{Path, PathBuf};
use ignore::WalkBuilder;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{FortmapError, Result};

/// Where to look for sources
#[derive(Debug, Clone)]
pub enum SourceRequest {
    /// Scan a directory for files with a configured extension
    Directory(PathBuf),
    /// Use exactly these files
    Files(Vec<PathBuf>),
}

/// A source file read into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// A file that was found but could not be used
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    /// Readable files, sorted by path
    pub files: Vec<SourceFile>,
    pub skipped: Vec<SkippedFile>,
    /// Set when the requested root does not exist
    pub missing_root: Option<PathBuf>,
}

impl SourceSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Finds Fortran sources and reads them concurrently
pub struct SourceLoader {
    config: ScanConfig,
}

impl SourceLoader {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Discover and read sources; problems degrade to skipped files, never errors
    pub async fn load(&self, request: &SourceRequest) -> Result<SourceSet> {
        let mut set = SourceSet::default();

        let candidates = match request {
            SourceRequest::Directory(root) => {
                if !root.exists() {
                    warn!("{}", FortmapError::InputNotFound(root.clone()));
                    set.missing_root = Some(root.clone());
                    return Ok(set);
                }
                self.discover(root, &mut set.skipped)
            }
            SourceRequest::Files(files) => {
                let mut existing = Vec::new();
                for file in files {
                    if file.is_file() {
                        existing.push(file.clone());
                    } else {
                        warn!("{}", FortmapError::InputNotFound(file.clone()));
                        set.skipped.push(SkippedFile {
                            path: file.clone(),
                            reason: "not found".to_string(),
                        });
                    }
                }
                existing
            }
        };

        debug!("Reading {} candidate source files", candidates.len());

        let mut reads = JoinSet::new();
        for path in candidates {
            let max_size = self.config.max_file_size;
            reads.spawn(async move {
                let outcome = read_source(&path, max_size).await;
                (path, outcome)
            });
        }

        while let Some(joined) = reads.join_next().await {
            let (path, outcome) = joined?;
            match outcome {
                Ok(content) => set.files.push(SourceFile { path, content }),
                Err(reason) => {
                    warn!("{}", FortmapError::UnreadableFile { path: path.clone(), reason: reason.clone() });
                    set.skipped.push(SkippedFile { path, reason });
                }
            }
        }

        set.files.sort_by(|a, b| a.path.cmp(&b.path));
        set.skipped.sort_by(|a, b| a.path.cmp(&b.path));

        if !set.skipped.is_empty() {
            let names: Vec<String> = set.skipped.iter().map(|s| s.path.display().to_string()).collect();
            warn!("Skipped {} file(s): {}", names.len(), names.join(", "));
        }

        Ok(set)
    }

    /// Files under `root` whose extension is configured
    fn discover(&self, root: &Path, skipped: &mut Vec<SkippedFile>) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .git_ignore(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .ignore(self.config.respect_gitignore)
            .parents(self.config.respect_gitignore);
        if !self.config.recursive {
            builder.max_depth(Some(1));
        }

        let mut found = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to walk {}: {}", root.display(), e);
                    skipped.push(SkippedFile {
                        path: root.to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().map_or(false, |t| t.is_file()) && self.has_source_extension(path) {
                found.push(path.to_path_buf());
            }
        }

        found
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| self.config.extensions.iter().any(|e| e == ext))
    }
}

async fn read_source(path: &Path, max_size: u64) -> std::result::Result<String, String> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| e.to_string())?;
    if metadata.len() > max_size {
        return Err(format!("exceeds maximum size of {} bytes", max_size));
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|_| "not valid UTF-8".to_string())
}
