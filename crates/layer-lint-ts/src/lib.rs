//! # layer-lint-ts
//!
//! Tree-sitter based layer boundary checker for TypeScript and JavaScript.
//!
//! Every source file is classified into a named layer by glob patterns
//! over its package identifier, and every import it makes is checked
//! against an allow-list of layer-to-layer dependencies. The crate
//! provides:
//!
//! - [`package::to_package`] and [`resolve::resolve_import`] for mapping
//!   file paths and import specifiers to package identifiers
//! - [`GlobMatcher`] as the pluggable pattern engine
//! - [`LayerResolver`] for ordered package-to-layer mapping
//! - [`ArchConfig`] for the TOML policy and its validation
//! - [`ArchRuleEngine`] for the per-file boundary walk
//! - [`SyntaxNode`] with a Tree-sitter implementation in [`typescript`]
//!
//! ## Example
//!
//! ```
//! use layer_lint_ts::{ArchConfig, ArchRuleEngine, ParsedSource, SourceLanguage};
//!
//! let config = ArchConfig::parse(r#"
//! [analyzer]
//! base_dir = "/proj/src"
//!
//! [[layers]]
//! name = "domain"
//! patterns = ["domain/**"]
//!
//! [[layers]]
//! name = "infra"
//! patterns = ["infra/**"]
//!
//! [dependencies]
//! domain = []
//! "#)?;
//! let engine = ArchRuleEngine::new(config)?;
//!
//! let parsed = ParsedSource::parse("import { Db } from '../infra/db';", SourceLanguage::TypeScript)?;
//! let violations = engine.check("/proj/src/domain/order.ts", parsed.root());
//! assert_eq!(violations[0].message, "'domain' is not allowed to import 'infra' (infra/db)");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod layer;
pub mod matcher;
pub mod package;
pub mod resolve;
pub mod syntax;
pub mod typescript;

pub use config::{ArchConfig, ConfigError, LayerDef};
pub use engine::{ArchRuleEngine, Classification, FileReport, ImportEdge, WalkOutcome};
pub use layer::{match_layer, LayerResolver};
pub use matcher::{GlobMatcher, PatternMatcher};
pub use syntax::SyntaxNode;
pub use typescript::{ParseError, ParsedSource, SourceLanguage, TsNode};

/// Trace verbosity from the policy's `debug` level.
///
/// 1 logs package and layer resolution, 2 every pattern test, 3 every
/// import check, 4 every visited node. Output goes through `tracing` and
/// never changes results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(u8);

impl Verbosity {
    /// Wraps a raw `debug` level.
    #[must_use]
    pub fn new(level: u8) -> Self {
        Self(level)
    }

    /// Returns true if tracing at `level` is enabled.
    #[must_use]
    pub fn at(self, level: u8) -> bool {
        self.0 >= level
    }
}
