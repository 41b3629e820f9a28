//! Boundary rule engine.
//!
//! Walks one file's syntax tree, classifies the file into a layer and
//! checks every import specifier against the allow-list, producing
//! [`Violation`]s from layer-lint-core.

use std::collections::HashMap;
use std::ops::ControlFlow;

use layer_lint_core::{Location, Severity, Span, Violation};

use crate::config::{ArchConfig, ConfigError};
use crate::matcher::{GlobMatcher, PatternMatcher};
use crate::layer::LayerResolver;
use crate::package::{normalize_path, to_package};
use crate::resolve::{resolve_import, unquote};
use crate::syntax::SyntaxNode;
use crate::Verbosity;

/// Message of the single violation reported for a file with no layer.
pub const UNCLASSIFIED_MESSAGE: &str = "file not found in layers config and was not excluded";

/// How a file's check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The file matched an exclusion pattern; nothing was checked.
    Excluded,
    /// The file matched no layer; traversal stopped at the root.
    Aborted,
    /// Every node was visited.
    Done,
}

/// Per-file traversal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState<'a> {
    Unclassified,
    Classified(&'a str),
    Aborted,
    Done(&'a str),
}

/// How a file is classified before any import is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Matched an exclusion pattern.
    Excluded,
    /// Belongs to this layer.
    Layer(&'a str),
    /// Matched neither an exclusion nor a layer.
    Unclassified,
}

/// An import found during traversal, after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge<'a> {
    /// Importing file.
    pub file: &'a str,
    /// Span of the specifier node.
    pub span: Span,
    /// Specifier as written, quotes removed.
    pub specifier: &'a str,
    /// Package the specifier resolves to.
    pub target: String,
    /// Layer of `target`, if any.
    pub target_layer: Option<&'a str>,
}

/// Everything known about one file after checking it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Package identifier of the file.
    pub package: String,
    /// Layer of the file, when it was classified.
    pub layer: Option<String>,
    /// How the walk ended.
    pub outcome: WalkOutcome,
    /// Violations in traversal order.
    pub violations: Vec<Violation>,
}

/// Evaluates layer boundary rules against syntax trees.
///
/// The engine is immutable after construction and holds no per-file
/// state, so one instance can be shared between threads checking
/// different files.
pub struct ArchRuleEngine<M = PatternMatcher> {
    resolver: LayerResolver<M>,
    dependencies: HashMap<String, Vec<String>>,
    exclude: Vec<String>,
    base_dir: String,
    severity: Severity,
    verbosity: Verbosity,
}

impl ArchRuleEngine<PatternMatcher> {
    /// Validate `config` and build an engine with the default glob matcher.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] found by [`ArchConfig::validate`].
    pub fn new(config: ArchConfig) -> Result<Self, ConfigError> {
        Self::with_matcher(config, PatternMatcher::new())
    }
}

impl<M: GlobMatcher> ArchRuleEngine<M> {
    /// Validate `config` and build an engine with a custom glob matcher.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] found by [`ArchConfig::validate_with`].
    pub fn with_matcher(config: ArchConfig, matcher: M) -> Result<Self, ConfigError> {
        config.validate_with(&matcher)?;

        let base_dir = config
            .base_dir
            .as_deref()
            .map(|dir| normalize_path(&dir.to_string_lossy()))
            .ok_or(ConfigError::MissingBaseDir)?;
        let verbosity = config.verbosity();

        Ok(Self {
            resolver: LayerResolver::with_matcher(config.layers, matcher).verbosity(verbosity),
            dependencies: config.dependencies,
            exclude: config.exclude,
            base_dir,
            severity: config.severity,
            verbosity,
        })
    }

    /// Normalized base directory package identifiers are relative to.
    #[must_use]
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    /// Package identifier of a file.
    #[must_use]
    pub fn package_of(&self, file_path: &str) -> String {
        to_package(file_path, &self.base_dir)
    }

    /// Classifies a file without looking at its contents.
    #[must_use]
    pub fn classify(&self, package: &str) -> Classification<'_> {
        if self.resolver.matches_any(package, &self.exclude) {
            return Classification::Excluded;
        }
        self.resolver
            .resolve(package)
            .map_or(Classification::Unclassified, Classification::Layer)
    }

    /// Check one file, returning its violations in traversal order.
    #[must_use]
    pub fn check<N: SyntaxNode>(&self, file_path: &str, root: N) -> Vec<Violation> {
        self.check_file(file_path, root).violations
    }

    /// Check one file, returning the full [`FileReport`].
    #[must_use]
    pub fn check_file<N: SyntaxNode>(&self, file_path: &str, root: N) -> FileReport {
        let package = self.package_of(file_path);
        if self.verbosity.at(1) {
            tracing::debug!(file = file_path, package = %package, "resolved file package");
        }

        if self.resolver.matches_any(&package, &self.exclude) {
            if self.verbosity.at(1) {
                tracing::debug!(file = file_path, "excluded");
            }
            return FileReport {
                package,
                layer: None,
                outcome: WalkOutcome::Excluded,
                violations: Vec::new(),
            };
        }

        let mut walk = Walk {
            engine: self,
            file_path,
            package: &package,
            state: WalkState::Unclassified,
            violations: Vec::new(),
        };
        walk.run(root);

        let (layer, outcome) = match walk.state {
            WalkState::Classified(layer) | WalkState::Done(layer) => {
                (Some(layer.to_owned()), WalkOutcome::Done)
            }
            WalkState::Unclassified | WalkState::Aborted => (None, WalkOutcome::Aborted),
        };
        let violations = walk.violations;

        FileReport {
            package,
            layer,
            outcome,
            violations,
        }
    }

    /// Layers `layer` may import from, besides itself.
    #[must_use]
    pub fn allowed_imports(&self, layer: &str) -> &[String] {
        self.dependencies.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    fn is_allowed(&self, from: &str, to: &str) -> bool {
        self.dependencies
            .get(from)
            .is_some_and(|allowed| allowed.iter().any(|a| a == to))
    }

    fn violation(
        &self,
        file_path: &str,
        span: Span,
        code: &str,
        rule: &str,
        message: String,
    ) -> Violation {
        Violation::new(
            code,
            rule,
            self.severity,
            Location::new(file_path, span),
            message,
        )
    }
}

struct Walk<'a, M> {
    engine: &'a ArchRuleEngine<M>,
    file_path: &'a str,
    package: &'a str,
    state: WalkState<'a>,
    violations: Vec<Violation>,
}

impl<'a, M: GlobMatcher> Walk<'a, M> {
    /// Pre-order traversal with an explicit stack; stops on the first `Break`.
    fn run<N: SyntaxNode>(&mut self, root: N) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if self.visit(&node).is_break() {
                return;
            }
            stack.extend(node.children().into_iter().rev());
        }
        if let WalkState::Classified(layer) = self.state {
            if self.engine.verbosity.at(1) {
                tracing::debug!(file = self.file_path, layer, "walk complete");
            }
            self.state = WalkState::Done(layer);
        }
    }

    fn visit<N: SyntaxNode>(&mut self, node: &N) -> ControlFlow<()> {
        let engine = self.engine;
        if engine.verbosity.at(4) {
            let span = node.span();
            tracing::trace!(kind = node.kind(), start = span.start, end = span.end, "visit");
        }

        match self.state {
            WalkState::Unclassified => match engine.resolver.resolve(self.package) {
                Some(layer) => {
                    if engine.verbosity.at(1) {
                        tracing::debug!(file = self.file_path, layer, "classified");
                    }
                    self.state = WalkState::Classified(layer);
                    self.visit(node)
                }
                None => {
                    self.violations.push(engine.violation(
                        self.file_path,
                        node.span(),
                        "LAYER003",
                        "unclassified-file",
                        UNCLASSIFIED_MESSAGE.to_owned(),
                    ));
                    self.state = WalkState::Aborted;
                    ControlFlow::Break(())
                }
            },
            WalkState::Classified(layer) => {
                if node.is_import_specifier() {
                    self.check_import(layer, node);
                }
                ControlFlow::Continue(())
            }
            WalkState::Aborted | WalkState::Done(_) => ControlFlow::Break(()),
        }
    }

    fn check_import<N: SyntaxNode>(&mut self, own_layer: &'a str, node: &N) {
        let engine = self.engine;
        let raw = node.text();
        let target = resolve_import(raw, self.file_path, &engine.base_dir);
        let edge = ImportEdge {
            file: self.file_path,
            span: node.span(),
            specifier: unquote(raw),
            target_layer: engine.resolver.resolve(&target),
            target,
        };
        if engine.verbosity.at(3) {
            tracing::debug!(?edge, own_layer, "checking import");
        }

        let Some(target_layer) = edge.target_layer else {
            self.violations.push(engine.violation(
                self.file_path,
                edge.span,
                "LAYER002",
                "unmatched-import",
                format!("{} not matched to any layer", edge.target),
            ));
            return;
        };

        if target_layer == own_layer || engine.is_allowed(own_layer, target_layer) {
            return;
        }

        self.violations.push(engine.violation(
            self.file_path,
            edge.span,
            "LAYER001",
            "layer-dependency",
            format!(
                "'{own_layer}' is not allowed to import '{target_layer}' ({})",
                edge.target
            ),
        ));
    }
}
