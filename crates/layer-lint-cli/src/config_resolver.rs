//! Policy file resolution and loading.
//!
//! The policy file is looked up in this order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/layer-lint.toml`, then `{project}/.layer-lint.toml`
//! 3. `$LAYER_LINT_CONFIG_DIR/config.toml`, else `~/.layer-lint/config.toml`
//!
//! Relative `root` and `base_dir` values are anchored at the project
//! directory, never at the process working directory.

use anyhow::{bail, Context, Result};
use layer_lint_ts::ArchConfig;
use std::path::{Path, PathBuf};

/// Where the policy file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Missing,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Missing => None,
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["layer-lint.toml", ".layer-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the policy file for a project.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// `global_dir` is a parameter so tests don't race on the env var.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let project = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file());
    if let Some(candidate) = project {
        tracing::debug!("Found project config: {}", candidate.display());
        return ConfigSource::Project(candidate);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(candidate) if candidate.is_file() => {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        }
        _ => ConfigSource::Missing,
    }
}

/// Global config directory: `$LAYER_LINT_CONFIG_DIR`, else `~/.layer-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LAYER_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".layer-lint"))
}

/// Loads the policy and anchors its relative paths at `project_dir`.
///
/// # Errors
///
/// Fails if no policy file was found, it cannot be parsed, or the
/// project directory does not exist.
pub fn load(source: &ConfigSource, project_dir: &Path) -> Result<ArchConfig> {
    let Some(path) = source.path() else {
        bail!("No layer-lint.toml found. Run `layer-lint init` to create one.");
    };
    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    }

    let mut config =
        ArchConfig::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?;

    let project = project_dir
        .canonicalize()
        .with_context(|| format!("Cannot access {}", project_dir.display()))?;
    config.root = anchor(&project, &config.root);
    config.base_dir = config.base_dir.map(|dir| anchor(&project, &dir));
    Ok(config)
}

/// Joins a relative path onto `project`; absolute paths pass through.
#[must_use]
pub fn anchor(project: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project.join(path)
    }
}
