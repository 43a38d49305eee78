// src/core/fortran/inventory.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use super::FortranLexicon;

/// Module name recorded for routines declared outside any module
pub const EXTERNAL_MODULE: &str = "External";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    Subroutine,
    Function,
}

impl RoutineKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "subroutine" => Some(Self::Subroutine),
            "function" => Some(Self::Function),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subroutine => "subroutine",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared routine and the module it was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub obj_name: String,
    pub module_name: String,
    #[serde(rename = "type")]
    pub kind: RoutineKind,
}

/// Lists declared routines with their owning module.
///
/// The module cursor starts at [`EXTERNAL_MODULE`] for every file and only
/// moves when another `module` line is seen; `end module` is not tracked.
#[derive(Debug, Clone)]
pub struct InventoryExtractor {
    lexicon: FortranLexicon,
}

impl InventoryExtractor {
    pub fn new(lexicon: FortranLexicon) -> Self {
        Self { lexicon }
    }

    pub fn extract(&self, content: &str) -> Vec<InventoryRecord> {
        let mut records = Vec::new();
        let mut current_module = EXTERNAL_MODULE.to_string();

        for line in self.lexicon.logical_lines(content) {
            if let Some(module) = self.lexicon.module_start(&line) {
                current_module = module;
            }

            if let Some((kind, obj_name)) = self.lexicon.routine_start(&line) {
                records.push(InventoryRecord {
                    obj_name,
                    module_name: current_module.clone(),
                    kind,
                });
            }
        }

        records
    }
}

/// Sort records by (module_name, obj_name); stable for duplicates
pub fn sort_inventory(records: &mut [InventoryRecord]) {
    records.sort_by(|a, b| {
        a.module_name
            .cmp(&b.module_name)
            .then_with(|| a.obj_name.cmp(&b.obj_name))
    });
}
