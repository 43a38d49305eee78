// src/core/fortran/scanner.rs
use std::collections::BTreeMap;

use super::FortranLexicon;

/// Routine name → raw callee names in textual order (duplicates and
/// unresolved names included).
pub type CallMap = BTreeMap<String, Vec<String>>;

/// Walks logical lines with a single "current routine" cursor.
///
/// Routines are flat: a routine start while another routine is open simply
/// moves the cursor. No scope stack is kept.
#[derive(Debug, Clone)]
pub struct ScopeScanner {
    lexicon: FortranLexicon,
}

impl ScopeScanner {
    pub fn new(lexicon: FortranLexicon) -> Self {
        Self { lexicon }
    }

    /// Collect the raw callee list of every routine declared in `content`
    pub fn scan(&self, content: &str) -> CallMap {
        let mut routines = CallMap::new();
        let mut current: Option<String> = None;

        for line in self.lexicon.logical_lines(content) {
            if let Some((_, name)) = self.lexicon.routine_start(&line) {
                routines.entry(name.clone()).or_default();
                current = Some(name);
            } else if self.lexicon.is_routine_end(&line) {
                current = None;
            }

            // The start line itself is scanned too (e.g. `result(...)` clauses)
            let Some(routine) = current.as_deref() else {
                continue;
            };

            let callees = self
                .lexicon
                .call_tokens(&line)
                .into_iter()
                .filter(|callee| callee != routine);

            routines.entry(routine.to_string()).or_default().extend(callees);
        }

        routines
    }
}
