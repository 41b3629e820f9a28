//! layer-lint CLI tool.
//!
//! Usage:
//! ```bash
//! layer-lint check [OPTIONS] [PATH]
//! layer-lint which <FILE>
//! layer-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Layer boundary checker for TypeScript and JavaScript projects
#[derive(Parser)]
#[command(name = "layer-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every source file under a path
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Override `analyzer.base_dir` from the config
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Override `analyzer.debug` (trace verbosity 0-4)
        #[arg(long)]
        debug: Option<u8>,
    },

    /// Show the package identifier and layer of one file
    Which {
        /// File to classify
        file: PathBuf,

        /// Project path the config is resolved from
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Source snippets with highlighted spans.
    Pretty,
}

/// Filter used when `RUST_LOG` is unset.
///
/// The engine crate is always let through at trace level: its output is
/// already gated by the policy's `debug` level.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug,layer_lint_ts=trace"
    } else {
        "info,layer_lint_ts=trace"
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(cli.verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            base_dir,
            debug,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let overrides = commands::check::Overrides { base_dir, debug };
            commands::check::run(&path, format, &overrides, &source)
        }
        Commands::Which { file, project } => {
            let source = config_resolver::resolve(&project, cli.config.as_deref());
            commands::which::run(&file, &project, &source)
        }
        Commands::Init { force } => commands::init::run(force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_lint_ts::{ArchConfig, ArchRuleEngine, ParsedSource, SourceLanguage};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_check(verbose: bool, debug: u8) -> String {
        let config = ArchConfig {
            debug,
            ..ArchConfig::parse(
                r#"
[analyzer]
base_dir = "/proj/src"

[[layers]]
name = "domain"
patterns = ["domain/**"]
"#,
            )
            .unwrap()
        };
        let engine = ArchRuleEngine::new(config).unwrap();
        let parsed =
            ParsedSource::parse("import { a } from './a';\n", SourceLanguage::TypeScript).unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(default_directive(verbose)))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _ = engine.check("/proj/src/domain/order.ts", parsed.root());
        });

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn policy_debug_level_is_visible_without_verbose_flag() {
        let output = logged_check(false, 1);
        assert!(output.contains("resolved file package"), "{output}");
        assert!(output.contains("classified"), "{output}");
    }

    #[test]
    fn debug_level_three_logs_import_checks() {
        let output = logged_check(false, 3);
        assert!(output.contains("checking import"), "{output}");
    }

    #[test]
    fn debug_level_zero_stays_quiet() {
        assert_eq!(logged_check(false, 0), "");
        assert_eq!(logged_check(true, 0), "");
    }
}
