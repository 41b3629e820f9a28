//! Check command implementation.

use anyhow::{Context, Result};
use layer_lint_core::LintResult;
use layer_lint_ts::{ArchRuleEngine, ParsedSource, SourceLanguage, WalkOutcome};
use std::path::{Path, PathBuf};

use super::output::Sources;
use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Directories never descended into, whatever `.gitignore` says.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Command-line values that take precedence over the policy file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Replaces `analyzer.base_dir`; relative to the working directory.
    pub base_dir: Option<PathBuf>,
    /// Replaces `analyzer.debug`.
    pub debug: Option<u8>,
}

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    overrides: &Overrides,
    source: &ConfigSource,
) -> Result<()> {
    let mut config = config_resolver::load(source, path)?;
    if let Some(dir) = &overrides.base_dir {
        let cwd = std::env::current_dir().context("Cannot read working directory")?;
        config.base_dir = Some(config_resolver::anchor(&cwd, dir));
    }
    if let Some(level) = overrides.debug {
        config.debug = level;
    }

    let root = config.root.clone();
    let engine = ArchRuleEngine::new(config).context("Config validation failed")?;

    let files = discover_files(&root)?;
    tracing::info!("Checking {} files under {}", files.len(), root.display());

    let (result, sources) = check_files(&engine, &root, &files)?;
    super::output::print(&result, format, &sources)?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Parses and checks each file, reporting paths relative to `root`.
///
/// Only the sources of files with violations are kept, for `pretty` output.
pub fn check_files(
    engine: &ArchRuleEngine,
    root: &Path,
    files: &[PathBuf],
) -> Result<(LintResult, Sources)> {
    let mut result = LintResult::new();
    let mut sources = Sources::new();

    for file_path in files {
        let Some(language) = SourceLanguage::from_path(file_path) else {
            continue;
        };

        let text = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        let parsed = ParsedSource::parse(text, language)
            .with_context(|| format!("Failed to parse {}", file_path.display()))?;
        if parsed.has_syntax_errors() {
            tracing::warn!(
                "{} has syntax errors; imports inside them may be missed",
                file_path.display()
            );
        }

        let report = engine.check_file(&file_path.to_string_lossy(), parsed.root());
        result.files_checked += 1;
        if report.outcome == WalkOutcome::Excluded {
            result.files_excluded += 1;
            continue;
        }
        if report.violations.is_empty() {
            continue;
        }

        let rel = file_path.strip_prefix(root).unwrap_or(file_path).to_path_buf();
        result
            .violations
            .extend(report.violations.into_iter().map(|mut v| {
                v.location.file.clone_from(&rel);
                v
            }));
        sources.insert(rel, parsed.source().to_owned());
    }

    result.sort();
    Ok((result, sources))
}

/// Lists supported source files under `root`, honoring `.gitignore`.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !SKIPPED_DIRS.contains(&name))
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && SourceLanguage::from_path(path).is_some() {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const POLICY: &str = r#"
[analyzer]
base_dir = "src"
exclude = ["*.test"]

[[layers]]
name = "ui"
patterns = ["ui/**"]

[[layers]]
name = "core"
patterns = ["core/**"]

[dependencies]
ui = ["core"]
core = []
"#;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "layer-lint.toml", POLICY);
        write(root, "src/ui/button.tsx", "import { theme } from '../core/theme';\n");
        write(root, "src/core/theme.ts", "import { Button } from '../ui/button';\n");
        write(root, "src/core/theme.test.ts", "import { Button } from '../ui/button';\n");
        write(root, "src/tools/gen.js", "import x from './x';\n");
        write(root, "node_modules/dep/index.js", "import y from '../../src/ui/button';\n");
        write(root, "README.md", "# not code\n");
        tmp
    }

    fn run_check(tmp: &TempDir) -> (LintResult, Sources) {
        let source = ConfigSource::Project(tmp.path().join("layer-lint.toml"));
        let config = config_resolver::load(&source, tmp.path()).unwrap();
        let root = config.root.clone();
        let engine = ArchRuleEngine::new(config).unwrap();
        let files = discover_files(&root).unwrap();
        check_files(&engine, &root, &files).unwrap()
    }

    #[test]
    fn discovery_skips_node_modules_and_other_extensions() {
        let tmp = project();
        let root = tmp.path().canonicalize().unwrap();
        let files = discover_files(&root).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|f| f.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            rel,
            [
                "src/core/theme.test.ts",
                "src/core/theme.ts",
                "src/tools/gen.js",
                "src/ui/button.tsx"
            ]
        );
    }

    #[test]
    fn check_reports_relative_paths_in_order() {
        let tmp = project();
        let (result, sources) = run_check(&tmp);

        assert_eq!(result.files_checked, 4);
        assert_eq!(result.files_excluded, 1);

        let found: Vec<(String, String)> = result
            .violations
            .iter()
            .map(|v| {
                (
                    v.location.file.to_string_lossy().replace('\\', "/"),
                    v.message.clone(),
                )
            })
            .collect();
        assert_eq!(
            found,
            [
                (
                    "src/core/theme.ts".to_owned(),
                    "'core' is not allowed to import 'ui' (ui/button)".to_owned()
                ),
                (
                    "src/tools/gen.js".to_owned(),
                    "file not found in layers config and was not excluded".to_owned()
                ),
            ]
        );
        assert!(result.has_errors());
        assert_eq!(sources.len(), 2);
    }
}
