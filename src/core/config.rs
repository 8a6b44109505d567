use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::validator::{ConfigValidator, StandardValidator};

/// Macro identifiers recognized by the signature normalization rule when the
/// configuration file does not override them.
pub const DEFAULT_SIGNATURE_MACROS: [&str; 2] = ["SIGNAL", "SLOT"];

/// A transformation that can be selected for a run.
///
/// The declaration order is also the order in which the processor applies the
/// rules, which is why `Ord` is derived and the set of actions is kept in a
/// `BTreeSet`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Add a newline to files that don't end in one.
    #[value(alias = "endswitheol")]
    #[serde(alias = "endswitheol")]
    EnsureTrailingNewline,
    /// Normalize SIGNAL and SLOT signatures.
    #[value(alias = "normalize")]
    #[serde(alias = "normalize")]
    NormalizeSignatures,
    /// Drop repeated `#include` directives naming the same target.
    DedupeIncludes,
    /// All of the above.
    All,
}

impl Action {
    /// Every concrete action, in application order.
    pub const CONCRETE: [Action; 3] = [
        Action::EnsureTrailingNewline,
        Action::NormalizeSignatures,
        Action::DedupeIncludes,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::EnsureTrailingNewline => write!(f, "ensure-trailing-newline"),
            Action::NormalizeSignatures => write!(f, "normalize-signatures"),
            Action::DedupeIncludes => write!(f, "dedupe-includes"),
            Action::All => write!(f, "all"),
        }
    }
}

/// The set of concrete actions enabled for a run. `Action::All` never appears
/// inside: it is expanded when the set is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    pub fn new<I>(actions: I) -> Self
    where
        I: IntoIterator<Item = Action>,
    {
        let mut set = BTreeSet::new();
        for action in actions {
            if action == Action::All {
                set.extend(Action::CONCRETE);
            } else {
                set.insert(action);
            }
        }
        Self(set)
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Enabled actions in application order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }
}

/// Settings for the signature normalization rule.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SignatureSettings {
    pub macros: Vec<String>,
}

impl Default for SignatureSettings {
    fn default() -> Self {
        Self {
            macros: DEFAULT_SIGNATURE_MACROS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// On-disk configuration file. Every key is optional; command-line flags are
/// merged over it by [`TraversalConfig::merge`].
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FixConfig {
    pub actions: Vec<Action>,
    pub patterns: Vec<String>,
    pub recursive: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub signatures: SignatureSettings,
}

/// Options taken from the command line, before they are merged with the
/// configuration file.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub actions: Vec<Action>,
    pub patterns: Vec<String>,
    pub recursive: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub paths: Vec<PathBuf>,
}

/// Immutable configuration for a single run, threaded through the walker and
/// the file processor.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    pub recursive: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub patterns: Vec<String>,
    pub actions: ActionSet,
    pub signature_macros: Vec<String>,
    pub roots: Vec<PathBuf>,
}

impl TraversalConfig {
    /// Merges command-line options over a loaded configuration file. Action
    /// and pattern lists given on the command line replace the file's lists;
    /// boolean flags are enabled if either side enables them.
    pub fn merge(file: FixConfig, cli: CliOptions) -> Self {
        let actions = if cli.actions.is_empty() {
            file.actions
        } else {
            cli.actions
        };
        let patterns = if cli.patterns.is_empty() {
            file.patterns
        } else {
            cli.patterns
        };

        Self {
            recursive: cli.recursive || file.recursive,
            dry_run: cli.dry_run || file.dry_run,
            verbose: cli.verbose || file.verbose,
            patterns,
            actions: ActionSet::new(actions),
            signature_macros: file.signatures.macros,
            roots: cli.paths,
        }
    }

    /// Checks the merged configuration and turns any reported issue into a
    /// fatal error, before any file is touched.
    pub fn validate(&self) -> Result<()> {
        let issues = StandardValidator::new().validate_config(self)?;
        if !issues.is_empty() {
            anyhow::bail!("invalid configuration: {}", issues.join("; "));
        }
        Ok(())
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self::merge(FixConfig::default(), CliOptions::default())
    }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<FixConfig>;
    fn get_config_path(&self) -> Option<&Path>;
}

/// Loads the optional TOML configuration file named with `--config`.
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<FixConfig> {
        let Some(path) = &self.config_path else {
            return Ok(FixConfig::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn get_config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
