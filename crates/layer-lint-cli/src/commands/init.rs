//! Init command: writes a starter policy file.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# layer-lint configuration
#
# Every source file gets a package identifier: its path relative to
# base_dir, without extension (src/domain/order.ts -> domain/order).
# Packages are matched against the layer patterns below.

[analyzer]
root = "."
base_dir = "src"
# Packages matching these globs are skipped entirely.
exclude = ["**/*.spec", "**/*.test", "generated/**"]
# Trace verbosity for `layer-lint check -v`: 1 resolution, 2 pattern
# tests, 3 import checks, 4 every syntax node.
debug = 0
# "error" fails the run on any violation, "warning" only reports.
severity = "error"

# Layer definitions.
# Patterns are case-insensitive globs. A pattern without "/" matches the
# last path segment only, so "react" matches the bare `react` import.
#
# ORDER MATTERS: a package belongs to the FIRST layer with a matching
# pattern. Declare the most specific layers first.

[[layers]]
name = "domain"
patterns = ["domain/**"]

[[layers]]
name = "application"
patterns = ["app/**", "usecases/**"]

[[layers]]
name = "infrastructure"
patterns = ["infra/**"]

[[layers]]
name = "presentation"
patterns = ["ui/**", "pages/**"]

[[layers]]
name = "vendor"
patterns = ["react", "react-dom", "@tanstack/*"]

# Which layers each layer may import from.
# Same-layer imports are always allowed. A layer without an entry may
# only import from itself.

[dependencies]
domain = []
application = ["domain"]
infrastructure = ["domain", "application"]
presentation = ["domain", "application", "vendor"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("layer-lint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, CONFIG_TEMPLATE)?;

    println!("Created layer-lint.toml");
    println!();
    println!("Next steps:");
    println!("  1. Edit [[layers]] and [dependencies] for your project");
    println!("  2. Run: layer-lint which src/<some file>  to see how a file is classified");
    println!("  3. Run: layer-lint check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_lint_ts::ArchConfig;

    #[test]
    fn template_is_a_valid_policy() {
        let config = ArchConfig::parse(CONFIG_TEMPLATE).expect("template should parse");
        assert_eq!(config.layers.len(), 5);
        assert!(config.validate().is_ok());
    }
}
