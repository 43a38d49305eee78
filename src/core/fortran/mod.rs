//! Textual recognition of free-form Fortran
//!
//! A shared lexicon of line patterns feeds two independent walkers: the scope
//! scanner (who calls whom) and the inventory extractor (which module owns
//! which routine).

mod lexicon;
mod scanner;
mod inventory;

pub use lexicon::FortranLexicon;
pub use scanner::{CallMap, ScopeScanner};
pub use inventory::{
    sort_inventory, InventoryExtractor, InventoryRecord, RoutineKind, EXTERNAL_MODULE,
};
