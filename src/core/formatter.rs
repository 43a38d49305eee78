// src/core/formatter.rs
use std::path::{Path, PathBuf};
use regex::Regex;
use walkdir::WalkDir;

use crate::config::FormatConfig;
use crate::error::Result;

const LABEL: &str = r"[a-zA-Z0-9_]\w*";

/// How a file should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent_size: usize,
    pub inplace: bool,
    pub dry_run: bool,
    pub backup: bool,
}

impl FormatOptions {
    pub fn from_config(config: &FormatConfig) -> Self {
        Self {
            indent_size: config.indent_size,
            inplace: false,
            dry_run: false,
            backup: config.backup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Unchanged,
    WouldChange,
    Updated { backup: Option<PathBuf> },
    /// Changes computed but neither written nor requested as a dry run
    Prepared,
    Failed(String),
}

impl FormatOutcome {
    pub fn is_change(&self) -> bool {
        matches!(self, Self::WouldChange | Self::Updated { .. } | Self::Prepared)
    }

    pub fn describe(&self, path: &Path) -> String {
        match self {
            Self::Unchanged => format!("No changes for {}", path.display()),
            Self::WouldChange => format!("Would change {}", path.display()),
            Self::Updated { backup: Some(bak) } => format!(
                "Updated {} (backup: {})",
                path.display(),
                bak.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
            ),
            Self::Updated { backup: None } => format!("Updated {} (backup: none)", path.display()),
            Self::Prepared => format!("Changes prepared for {} (not written)", path.display()),
            Self::Failed(reason) => format!("Failed to format {}: {}", path.display(), reason),
        }
    }
}

/// Heuristic block-keyword indenter for free-form Fortran.
///
/// Works line by line with one indentation counter; it does not join
/// continuations or understand statements.
#[derive(Debug, Clone)]
pub struct IndentFormatter {
    opening_regex: Regex,
    block_data_regex: Regex,
    closing_regex: Regex,
    middle_regex: Regex,
    continuation_regex: Regex,
    comment_regex: Regex,
    end_word_regex: Regex,
}

impl IndentFormatter {
    pub fn new() -> Result<Self> {
        let opening = format!(
            r"(?ix)^\s*(?:
                (?:{l}\s*:\s*)?module\b |
                (?:{l}\s*:\s*)?subroutine\b |
                (?:{l}\s*:\s*)?(?:{l}(?:\s*\([^)]*\))?\s+)*function\b |
                (?:{l}\s*:\s*)?program\b |
                (?:{l}\s*:\s*)?block\b |
                (?:{l}\s*:\s*)?do\b |
                if\b[^!]*\bthen\b |
                if\b[^!]*&\s*$ |
                select\s+(?:case|type|rank)\b |
                type\b\s*:: |
                interface\b |
                where\b |
                associate\b |
                enum\b |
                critical\b
            )",
            l = LABEL
        );
        let closing = format!(
            r"(?ix)^\s*(?:
                end\b |
                end\s*do\b(?:\s+{l})? |
                end\s*if\b
            )",
            l = LABEL
        );

        Ok(Self {
            opening_regex: Regex::new(&opening)?,
            block_data_regex: Regex::new(&format!(r"(?i)^\s*(?:{}\s*:\s*)?block\s*data\b", LABEL))?,
            closing_regex: Regex::new(&closing)?,
            middle_regex: Regex::new(r"(?i)^\s*(?:else\b|elseif\b|else\s+if\b|case\b)")?,
            continuation_regex: Regex::new(r"^\s*&")?,
            comment_regex: Regex::new(r"^\s*!")?,
            end_word_regex: Regex::new(r"(?i)\bend\b|\bendif\b")?,
        })
    }

    /// Re-indent `lines`; every returned line ends with `\n`
    pub fn format_lines<S: AsRef<str>>(&self, lines: &[S], indent_size: usize) -> Vec<String> {
        let mut out = Vec::with_capacity(lines.len());
        let mut level: usize = 0;
        let indent = |level: usize, text: &str| format!("{}{}\n", " ".repeat(level * indent_size), text);

        for raw in lines {
            let line = raw.as_ref().trim_end_matches(['\n', '\r']);
            let stripped = line.trim();

            if stripped.is_empty() {
                out.push("\n".to_string());
                continue;
            }

            // Continuations and comments sit at the current level
            if self.continuation_regex.is_match(line) || self.comment_regex.is_match(line) {
                out.push(indent(level, stripped));
                continue;
            }

            let is_middle = self.middle_regex.is_match(line);
            let is_closing = self.closing_regex.is_match(line);

            if is_middle {
                level = level.saturating_sub(1);
            }
            if is_closing {
                level = level.saturating_sub(1);
            }

            out.push(indent(level, stripped));

            if is_middle {
                level += 1;
            }

            let opens = self.opening_regex.is_match(line) && !self.block_data_regex.is_match(line);
            let closes_on_same_line = self.end_word_regex.is_match(line);
            if opens && !is_middle && !closes_on_same_line {
                level += 1;
            }
        }

        out
    }

    /// Re-indent a whole text
    pub fn format_text(&self, text: &str, indent_size: usize) -> String {
        let lines: Vec<&str> = text.lines().collect();
        self.format_lines(&lines, indent_size).concat()
    }

    /// Format one file according to `options`
    pub fn format_file(&self, path: &Path, options: &FormatOptions) -> FormatOutcome {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => return FormatOutcome::Failed(e.to_string()),
        };

        let formatted = self.format_text(&text, options.indent_size);
        if formatted == text {
            return FormatOutcome::Unchanged;
        }

        if options.dry_run {
            return FormatOutcome::WouldChange;
        }
        if !options.inplace {
            return FormatOutcome::Prepared;
        }

        let backup = if options.backup {
            let bak = backup_path(path);
            if let Err(e) = std::fs::write(&bak, &text) {
                return FormatOutcome::Failed(format!("cannot write backup: {}", e));
            }
            Some(bak)
        } else {
            None
        };

        match std::fs::write(path, formatted) {
            Ok(()) => FormatOutcome::Updated { backup },
            Err(e) => FormatOutcome::Failed(e.to_string()),
        }
    }
}

/// `src/a.f90` → `src/a.f90.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Expand directories recursively and keep files with a matching extension.
///
/// Directory entries match `extensions` exactly; explicitly named files match
/// case-insensitively.
pub fn collect_files(paths: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .map_or(false, |e| extensions.iter().any(|x| x == e))
                })
                .collect();
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
            if matches {
                files.push(path.clone());
            }
        }
    }

    files
}
