//! fortmap: who-calls-whom matrices, routine inventories and an indentation
//! fixer for free-form Fortran codebases.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use error::{FortmapError, Result};
