//! Language-agnostic view of a parsed syntax tree.
//!
//! `SyntaxNode` is the extension point for plugging in other parsers.
//! The boundary walker only needs node kinds, text, spans, child
//! enumeration and one predicate: "is this an import specifier".

use layer_lint_core::Span;

/// A node of a parsed syntax tree.
pub trait SyntaxNode: Sized {
    /// Grammar-specific node kind (e.g., `"import_statement"`).
    fn kind(&self) -> &str;

    /// Source text covered by this node.
    fn text(&self) -> &str;

    /// Location of this node in the source.
    fn span(&self) -> Span;

    /// Returns true if this node is the module specifier of an import-like
    /// construct. Its [`text`](SyntaxNode::text) may include the quotes.
    fn is_import_specifier(&self) -> bool;

    /// Child nodes, in source order.
    fn children(&self) -> Vec<Self>;
}
