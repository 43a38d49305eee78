// src/core/fortran/lexicon.rs
use regex::Regex;

use crate::error::Result;
use super::RoutineKind;

/// Line-level recognizers for free-form Fortran.
///
/// Everything here is textual: a line either matches a keyword pattern or it
/// does not. There is no tokenizer and no notion of strings or comments.
#[derive(Debug, Clone)]
pub struct FortranLexicon {
    continuation_regex: Regex,
    routine_start_regex: Regex,
    routine_end_regex: Regex,
    module_start_regex: Regex,
    call_regex: Regex,
}

impl FortranLexicon {
    pub fn new() -> Result<Self> {
        Ok(Self {
            continuation_regex: Regex::new(r"&\s*\n\s*")?,
            routine_start_regex: Regex::new(
                r"(?i)^\s*(?:recursive\s+)?(subroutine|function)\s+(\w+)",
            )?,
            routine_end_regex: Regex::new(r"(?i)^\s*end\s+(?:subroutine|function)")?,
            module_start_regex: Regex::new(r"(?i)^\s*module\s+(\w+)")?,
            call_regex: Regex::new(r"(?i)\bcall\s+(\w+)|\b(\w+)\s*\(")?,
        })
    }

    /// Join continued lines and split into logical lines.
    ///
    /// A trailing `&` swallows the newline and the next line's indentation.
    pub fn logical_lines(&self, content: &str) -> Vec<String> {
        self.continuation_regex
            .replace_all(content, "")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// `subroutine foo` / `recursive function bar` → kind and lowercased name
    pub fn routine_start(&self, line: &str) -> Option<(RoutineKind, String)> {
        let caps = self.routine_start_regex.captures(line)?;
        let kind = RoutineKind::from_keyword(caps.get(1)?.as_str())?;
        let name = caps.get(2)?.as_str().to_lowercase();
        Some((kind, name))
    }

    pub fn is_routine_end(&self, line: &str) -> bool {
        self.routine_end_regex.is_match(line)
    }

    pub fn module_start(&self, line: &str) -> Option<String> {
        self.module_start_regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase())
    }

    /// Every call-like identifier on the line, lowercased, in order of appearance.
    ///
    /// `call foo` counts with or without an argument list; any other
    /// identifier counts only when followed by `(`.
    pub fn call_tokens(&self, line: &str) -> Vec<String> {
        self.call_regex
            .captures_iter(line)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }
}
