//! Formula catalog and value transforms.
//!
//! This module provides:
//! - `definition`: Formula definitions with parameter contracts
//! - `registry`: Lookup, search, validation and formula-string parsing
//! - `transform`: Executable value transforms (what the executor applies)
//! - `catalog`: The builtin formula set
//!
//! ## Usage Flow
//!
//! ```text
//! UI picks formula → registry.validate(name, params) → executor applies
//! the matching Transform → sampled Input_Column / Output_Column table
//! ```
//!
//! The registry is an owned value constructed once at startup (no global
//! singleton) and shared by reference with the pipeline.

pub mod catalog;
pub mod definition;
pub mod registry;
pub mod transform;

// Re-exports for convenience
pub use definition::{FormulaDefinition, FormulaParameter, ParameterKind};
pub use registry::{FormulaRegistry, ParsedFormula, ValidationReport};
pub use transform::{transform_registry, Transform};
