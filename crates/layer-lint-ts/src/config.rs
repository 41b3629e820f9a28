//! TOML policy configuration: layer table, allow-list and exclusions.
//!
//! ```toml
//! [analyzer]
//! base_dir = "src"
//! exclude = ["**/*.spec"]
//!
//! [[layers]]
//! name = "domain"
//! patterns = ["domain/**"]
//!
//! [dependencies]
//! domain = []
//! ```

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use layer_lint_core::Severity;

use crate::matcher::{GlobMatcher, PatternMatcher};
use crate::Verbosity;

/// Top-level layer policy.
#[derive(Debug, Clone, Default)]
pub struct ArchConfig {
    /// Project root directory, where file discovery starts.
    pub root: PathBuf,

    /// Base directory package identifiers are relative to. Required.
    pub base_dir: Option<PathBuf>,

    /// Glob patterns matched against package identifiers; matching files are skipped.
    pub exclude: Vec<String>,

    /// Trace verbosity (0 = off, 4+ = node dumps).
    pub debug: u8,

    /// Severity assigned to every violation.
    pub severity: Severity,

    /// Layer definitions, in declaration order. Order decides ties.
    pub layers: Vec<LayerDef>,

    /// Allow-list: layer name -> layers it may import from.
    pub dependencies: HashMap<String, Vec<String>>,
}

/// A named architecture layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerDef {
    /// Layer name (e.g., `"domain"`, `"infra"`).
    pub name: String,
    /// Glob patterns over package identifiers belonging to this layer.
    #[serde(default)]
    pub patterns: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Errors when loading or validating a policy. All of them are fatal for a run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML, or the policy has the wrong shape.
    #[error("invalid config: {message}")]
    Parse {
        /// Parse error detail.
        message: String,
    },
    /// No base directory configured.
    #[error("analyzer.base_dir is not set; package names cannot be computed without it")]
    MissingBaseDir,
    /// The same layer name is declared more than once.
    #[error("duplicate layer name(s): {}", .names.join(", "))]
    DuplicateLayer {
        /// Every duplicated name.
        names: Vec<String>,
    },
    /// The allow-list mentions layers that are not declared.
    #[error("dependencies reference undeclared layer(s): {}", .names.join(", "))]
    UndeclaredLayerReference {
        /// Every offending name, sorted.
        names: Vec<String>,
    },
    /// A layer or exclusion pattern is not a valid glob.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        message: String,
    },
}

impl ArchConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RawConfig {
            #[serde(default)]
            analyzer: AnalyzerSection,
            #[serde(default)]
            layers: Vec<LayerDef>,
            #[serde(default, alias = "rules")]
            dependencies: HashMap<String, Vec<String>>,
        }

        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct AnalyzerSection {
            #[serde(default = "default_root")]
            root: PathBuf,
            #[serde(default)]
            base_dir: Option<PathBuf>,
            #[serde(default)]
            exclude: Vec<String>,
            #[serde(default)]
            debug: u8,
            #[serde(default)]
            severity: Severity,
        }

        impl Default for AnalyzerSection {
            fn default() -> Self {
                Self {
                    root: default_root(),
                    base_dir: None,
                    exclude: Vec::new(),
                    debug: 0,
                    severity: Severity::default(),
                }
            }
        }

        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;

        Ok(Self {
            root: raw.analyzer.root,
            base_dir: raw.analyzer.base_dir,
            exclude: raw.analyzer.exclude,
            debug: raw.analyzer.debug,
            severity: raw.analyzer.severity,
            layers: raw.layers,
            dependencies: raw.dependencies,
        })
    }

    /// Trace verbosity derived from `debug`.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::new(self.debug)
    }

    /// Validate the policy with the default glob matcher.
    ///
    /// # Errors
    ///
    /// See [`ArchConfig::validate_with`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_with(&PatternMatcher::new())
    }

    /// Validate policy consistency before any file is checked.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: missing base directory, duplicate
    /// layer names, allow-list entries naming undeclared layers (all of
    /// them), or a pattern `matcher` rejects.
    pub fn validate_with<M: GlobMatcher + ?Sized>(&self, matcher: &M) -> Result<(), ConfigError> {
        if self.base_dir.as_ref().map_or(true, |d| d.as_os_str().is_empty()) {
            return Err(ConfigError::MissingBaseDir);
        }

        let mut declared: HashSet<&str> = HashSet::new();
        let mut duplicates: BTreeSet<&str> = BTreeSet::new();
        for layer in &self.layers {
            if !declared.insert(layer.name.as_str()) {
                duplicates.insert(layer.name.as_str());
            }
        }
        if !duplicates.is_empty() {
            return Err(ConfigError::DuplicateLayer {
                names: duplicates.into_iter().map(str::to_owned).collect(),
            });
        }

        let undeclared: BTreeSet<&str> = self
            .dependencies
            .iter()
            .flat_map(|(layer, deps)| std::iter::once(layer).chain(deps))
            .map(String::as_str)
            .filter(|name| !declared.contains(name))
            .collect();
        if !undeclared.is_empty() {
            return Err(ConfigError::UndeclaredLayerReference {
                names: undeclared.into_iter().map(str::to_owned).collect(),
            });
        }

        let patterns = self
            .layers
            .iter()
            .flat_map(|l| &l.patterns)
            .chain(&self.exclude);
        for pattern in patterns {
            matcher
                .check_pattern(pattern)
                .map_err(|message| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message,
                })?;
        }

        for layer in self.layers.iter().filter(|l| l.patterns.is_empty()) {
            tracing::warn!(layer = %layer.name, "layer has no patterns and can never match");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[analyzer]
base_dir = "/proj/src"

[[layers]]
name = "domain"
patterns = ["domain/**"]

[dependencies]
domain = []
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        assert_eq!(config.layers.len(), 1);
        assert_eq!(config.layers[0].name, "domain");
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.severity, Severity::Error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_config_keeps_layer_order() {
        let toml = r#"
[analyzer]
root = "./web"
base_dir = "src"
exclude = ["**/*.spec"]
debug = 3
severity = "warning"

[[layers]]
name = "ui"
patterns = ["ui/**"]

[[layers]]
name = "core"
patterns = ["core/**", "shared/*"]

[[layers]]
name = "api"
patterns = ["api/**"]

[dependencies]
ui = ["core"]
core = []
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        let names: Vec<&str> = config.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["ui", "core", "api"]);
        assert_eq!(config.layers[1].patterns, ["core/**", "shared/*"]);
        assert_eq!(config.debug, 3);
        assert_eq!(config.severity, Severity::Warning);
        assert_eq!(config.exclude, ["**/*.spec"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rules_is_an_alias_for_dependencies() {
        let toml = r#"
[analyzer]
base_dir = "src"

[[layers]]
name = "ui"
patterns = ["ui/**"]

[rules]
ui = []
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        assert!(config.dependencies.contains_key("ui"));
    }

    #[test]
    fn malformed_shape_is_parse_error() {
        let toml = r#"
[[layers]]
name = "ui"
patterns = "ui/**"
"#;
        let err = ArchConfig::parse(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = ArchConfig::parse("[analyzer]\nbasedir = \"src\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validate_requires_base_dir() {
        let toml = r#"
[[layers]]
name = "domain"
patterns = ["domain/**"]
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::MissingBaseDir
        ));
    }

    #[test]
    fn validate_names_every_undeclared_layer() {
        let toml = r#"
[analyzer]
base_dir = "src"

[[layers]]
name = "ui"
patterns = ["ui/**"]

[[layers]]
name = "core"
patterns = ["core/**"]

[dependencies]
ui = ["core", "ghost"]
phantom = ["ui"]
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        match config.validate().unwrap_err() {
            ConfigError::UndeclaredLayerReference { names } => {
                assert_eq!(names, ["ghost", "phantom"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_catches_duplicate_layers() {
        let toml = r#"
[analyzer]
base_dir = "src"

[[layers]]
name = "ui"
patterns = ["ui/**"]

[[layers]]
name = "ui"
patterns = ["views/**"]
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ui"));
        assert!(matches!(err, ConfigError::DuplicateLayer { .. }));
    }

    #[test]
    fn validate_catches_invalid_pattern() {
        let toml = r#"
[analyzer]
base_dir = "src"
exclude = ["gen/a**b"]
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        match config.validate().unwrap_err() {
            ConfigError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "gen/a**b"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn layer_without_dependency_entry_is_valid() {
        let toml = r#"
[analyzer]
base_dir = "src"

[[layers]]
name = "domain"
patterns = ["domain/**"]

[[layers]]
name = "unused"
"#;
        let config = ArchConfig::parse(toml).expect("parse failed");
        assert!(config.validate().is_ok());
    }
}
