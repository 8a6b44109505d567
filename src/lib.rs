//! Line-oriented source fixer: trailing newlines, SIGNAL/SLOT signature
//! normalization and duplicate `#include` removal over a file tree.
pub mod builders;
pub mod core;
pub mod utils;

#[cfg(test)]
mod tests;
