//! Layer resolution: maps package identifiers to architecture layers.

use crate::config::LayerDef;
use crate::matcher::{GlobMatcher, PatternMatcher};
use crate::Verbosity;

/// Returns the first layer, in declaration order, with a pattern matching `package`.
///
/// Declaration order is the tie-break: when a package satisfies patterns
/// of several layers, the earliest declared layer wins regardless of how
/// specific the patterns are. Declare layers from most specific to least.
#[must_use]
pub fn match_layer<'a, M: GlobMatcher + ?Sized>(
    layers: &'a [LayerDef],
    package: &str,
    matcher: &M,
) -> Option<&'a str> {
    layers
        .iter()
        .find(|layer| {
            layer
                .patterns
                .iter()
                .any(|pattern| matcher.matches(package, pattern))
        })
        .map(|layer| layer.name.as_str())
}

/// Resolves package identifiers to layer names using an ordered layer table.
pub struct LayerResolver<M = PatternMatcher> {
    layers: Vec<LayerDef>,
    matcher: M,
    verbosity: Verbosity,
}

impl LayerResolver<PatternMatcher> {
    /// Build a resolver with the default glob matcher.
    #[must_use]
    pub fn new(layers: Vec<LayerDef>) -> Self {
        Self::with_matcher(layers, PatternMatcher::new())
    }
}

impl<M: GlobMatcher> LayerResolver<M> {
    /// Build a resolver with a custom matcher.
    #[must_use]
    pub fn with_matcher(layers: Vec<LayerDef>, matcher: M) -> Self {
        Self {
            layers,
            matcher,
            verbosity: Verbosity::default(),
        }
    }

    /// Sets the trace verbosity.
    #[must_use]
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The matcher patterns are tested with.
    #[must_use]
    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Which layer does this package belong to?
    #[must_use]
    pub fn resolve(&self, package: &str) -> Option<&str> {
        if !self.verbosity.at(2) {
            return match_layer(&self.layers, package, &self.matcher);
        }

        for layer in &self.layers {
            for pattern in &layer.patterns {
                let hit = self.matcher.matches(package, pattern);
                tracing::trace!(package, layer = %layer.name, pattern = %pattern, hit, "pattern test");
                if hit {
                    return Some(&layer.name);
                }
            }
        }
        None
    }

    /// Returns true if `package` matches any of `patterns`.
    #[must_use]
    pub fn matches_any(&self, package: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            let hit = self.matcher.matches(package, pattern);
            if self.verbosity.at(2) {
                tracing::trace!(package, pattern = %pattern, hit, "exclusion test");
            }
            hit
        })
    }
}
