//! Structural renaming: case-variant substitution rules and the tree walker
//! that applies them to directory names, file names and file contents.

pub mod case;
mod rename;

pub use case::{variant_pairs, CaseStyle, CaseVariant};
pub use rename::{apply_rule, apply_rules, RenameStats};
