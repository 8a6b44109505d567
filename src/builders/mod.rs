// This file is the module declaration file for the `builders` module.
// It declares and makes public the building blocks the engine and the walker
// are assembled from.

// `filter` module:
// Glob-style file-name filter compiled to anchored regular expressions.
pub mod filter;

// `includes` module:
// The duplicate `#include` removal rule.
pub mod includes;

// `reporter` module:
// Notices, per-file reports, the serializable `RunSummary`, and the
// `StatusReporter` trait with its `ConsoleReporter` implementation that
// writes diagnostics to stderr.
pub mod reporter;

// `rules` module:
// The `Rule` trait, the `LineSequence` type, the trailing-newline rule and
// `build_rules`, which turns an `ActionSet` into the ordered rule list.
pub mod rules;

// `signatures` module:
// The SIGNAL/SLOT signature normalization rule.
pub mod signatures;

// `storage` module:
// Where transformed content goes: `AtomicFileStorage` writes and syncs a
// temporary sibling, then renames it over the original (through symlinks);
// `DryRunStorage` writes nothing.
pub mod storage;

// `validator` module:
// `ConfigValidator` and `StandardValidator`, which reject unusable
// configurations before any file is touched.
pub mod validator;
