// This file is the module declaration file for the `core` module.
// It declares the submodules that make up a run, from configuration down to
// the per-file processing and the directory traversal that drives it.

// `config` module:
// Defines the selectable `Action`s, the `ActionSet`, the optional TOML
// configuration file (`FixConfig`) with its `ConfigProvider`, and the
// immutable `TraversalConfig` that is threaded through the whole run.
pub mod config;

// `engine` module:
// The file processor. `FixEngine` reads one file, applies the enabled rules
// in their fixed order and hands the result to a storage provider.
pub mod engine;

// `walker` module:
// Enumerates files from the roots given on the command line, honouring the
// recursive flag and the name filter, and collects a `RunSummary`.
pub mod walker;
