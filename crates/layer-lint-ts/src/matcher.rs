//! Glob matching of package identifiers against layer and exclusion patterns.

use glob::{MatchOptions, Pattern};

/// Pattern-matching capability used by the layer matcher.
///
/// The engine only asks "does this candidate match this pattern"; any glob
/// dialect can be plugged in behind it.
pub trait GlobMatcher: Send + Sync {
    /// Returns true if `candidate` matches `pattern`.
    fn matches(&self, candidate: &str, pattern: &str) -> bool;

    /// Checks that `pattern` is well-formed.
    ///
    /// # Errors
    ///
    /// Returns a message describing why the pattern cannot be used.
    fn check_pattern(&self, pattern: &str) -> Result<(), String> {
        let _ = pattern;
        Ok(())
    }
}

/// Case-insensitive, base-name-aware matcher backed by the `glob` crate.
///
/// `*` and `?` do not cross `/`; `**` spans any number of segments. A
/// pattern without `/` is tested against the last segment of the
/// candidate, so `*.spec` matches `domain/order.spec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    /// Creates a new matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GlobMatcher for PatternMatcher {
    fn matches(&self, candidate: &str, pattern: &str) -> bool {
        let Ok(compiled) = Pattern::new(pattern) else {
            return false;
        };

        let subject = if pattern.contains('/') {
            candidate
        } else {
            candidate.rsplit('/').next().unwrap_or(candidate)
        };

        compiled.matches_with(subject, Self::OPTIONS)
    }

    fn check_pattern(&self, pattern: &str) -> Result<(), String> {
        Pattern::new(pattern).map(|_| ()).map_err(|e| e.to_string())
    }
}
