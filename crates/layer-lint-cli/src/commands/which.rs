//! Which command: shows how one file is classified.

use anyhow::{Context, Result};
use layer_lint_ts::{ArchRuleEngine, Classification};
use std::path::Path;

use crate::config_resolver::{self, ConfigSource};

/// Runs the which command.
pub fn run(file: &Path, project: &Path, source: &ConfigSource) -> Result<()> {
    let config = config_resolver::load(source, project)?;
    let engine = ArchRuleEngine::new(config).context("Config validation failed")?;
    tracing::debug!("Package identifiers are relative to {}", engine.base_dir());

    let file = file
        .canonicalize()
        .with_context(|| format!("Cannot access {}", file.display()))?;
    println!("{}", describe(&engine, &file.to_string_lossy()));
    Ok(())
}

/// One-line description of a file's package and layer.
fn describe(engine: &ArchRuleEngine, file_path: &str) -> String {
    let package = engine.package_of(file_path);
    match engine.classify(&package) {
        Classification::Excluded => format!("{package}: excluded"),
        Classification::Unclassified => format!("{package}: not in any layer"),
        Classification::Layer(layer) => {
            let allowed = engine.allowed_imports(layer);
            if allowed.is_empty() {
                format!("{package}: layer '{layer}' (may import: nothing outside itself)")
            } else {
                format!(
                    "{package}: layer '{layer}' (may import: {})",
                    allowed.join(", ")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_lint_ts::ArchConfig;

    fn engine() -> ArchRuleEngine {
        let config = ArchConfig::parse(
            r#"
[analyzer]
base_dir = "/proj/src"
exclude = ["*.spec"]

[[layers]]
name = "domain"
patterns = ["domain/**"]

[[layers]]
name = "app"
patterns = ["app/**"]

[dependencies]
domain = []
app = ["domain"]
"#,
        )
        .unwrap();
        ArchRuleEngine::new(config).unwrap()
    }

    #[test]
    fn describes_each_classification() {
        let engine = engine();
        assert_eq!(
            describe(&engine, "/proj/src/app/service.ts"),
            "app/service: layer 'app' (may import: domain)"
        );
        assert_eq!(
            describe(&engine, "/proj/src/domain/order.ts"),
            "domain/order: layer 'domain' (may import: nothing outside itself)"
        );
        assert_eq!(
            describe(&engine, "/proj/src/domain/order.spec.ts"),
            "domain/order.spec: excluded"
        );
        assert_eq!(
            describe(&engine, "/proj/src/scripts/seed.ts"),
            "scripts/seed: not in any layer"
        );
    }
}
