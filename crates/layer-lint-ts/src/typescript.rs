//! TypeScript / JavaScript syntax trees via Tree-sitter.

use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

use layer_lint_core::Span;

use crate::syntax::SyntaxNode;

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    /// `.ts`, `.mts`, `.cts`
    TypeScript,
    /// `.tsx` and the JavaScript family, which TSX parses as a superset.
    Tsx,
}

impl SourceLanguage {
    /// Every file extension with a grammar, without the dot.
    pub const EXTENSIONS: &'static [&'static str] =
        &["ts", "mts", "cts", "tsx", "js", "jsx", "mjs", "cjs"];

    /// Picks the grammar for a file from its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::Tsx),
            _ => None,
        }
    }

    fn grammar(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Errors while parsing a source file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {language:?} grammar: {message}")]
    Language {
        /// Grammar that failed.
        language: SourceLanguage,
        /// Loader error detail.
        message: String,
    },
    /// Tree-sitter returned no tree.
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// A parsed source file that owns both its text and its tree.
pub struct ParsedSource {
    source: String,
    tree: Tree,
}

impl ParsedSource {
    /// Parses `source` with the given grammar.
    ///
    /// Syntax errors do not fail the parse; Tree-sitter recovers and the
    /// resulting tree still contains every well-formed import.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the grammar cannot be loaded or no tree is produced.
    pub fn parse(source: impl Into<String>, language: SourceLanguage) -> Result<Self, ParseError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| ParseError::Language {
                language,
                message: e.to_string(),
            })?;

        let tree = parser.parse(&source, None).ok_or(ParseError::NoTree)?;
        Ok(Self { source, tree })
    }

    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> TsNode<'_> {
        TsNode {
            node: self.tree.root_node(),
            source: &self.source,
        }
    }

    /// Source text the tree was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns true if Tree-sitter had to recover from syntax errors.
    #[must_use]
    pub fn has_syntax_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// A Tree-sitter node paired with the source it was parsed from.
#[derive(Clone, Copy)]
pub struct TsNode<'a> {
    node: Node<'a>,
    source: &'a str,
}

impl<'a> TsNode<'a> {
    fn is_source_of(&self, parent: &Node<'a>) -> bool {
        parent
            .child_by_field_name("source")
            .is_some_and(|source| source.id() == self.node.id())
    }
}

impl std::fmt::Debug for TsNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}..{}]", self.node.kind(), self.node.start_byte(), self.node.end_byte())
    }
}

impl SyntaxNode for TsNode<'_> {
    fn kind(&self) -> &str {
        self.node.kind()
    }

    fn text(&self) -> &str {
        self.source
            .get(self.node.start_byte()..self.node.end_byte())
            .unwrap_or("")
    }

    fn span(&self) -> Span {
        let start = self.node.start_position();
        Span::new(
            self.node.start_byte(),
            self.node.end_byte(),
            start.row + 1,
            start.column + 1,
        )
    }

    /// `import … from "x"`, `import "x"`, `export … from "x"` (including
    /// `export * as ns from "x"`), and `import x = require("x")`.
    fn is_import_specifier(&self) -> bool {
        if self.node.kind() != "string" {
            return false;
        }
        let Some(parent) = self.node.parent() else {
            return false;
        };
        match parent.kind() {
            "import_statement" | "export_statement" => self.is_source_of(&parent),
            "import_require_clause" => true,
            _ => false,
        }
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|node| TsNode {
                node,
                source: self.source,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specifiers(src: &str, language: SourceLanguage) -> Vec<String> {
        fn collect(node: &TsNode<'_>, out: &mut Vec<String>) {
            if node.is_import_specifier() {
                out.push(node.text().to_owned());
            }
            for child in node.children() {
                collect(&child, out);
            }
        }

        let parsed = ParsedSource::parse(src, language).expect("parse failed");
        let mut out = Vec::new();
        collect(&parsed.root(), &mut out);
        out
    }

    #[test]
    fn picks_grammar_from_extension() {
        assert_eq!(
            SourceLanguage::from_path(Path::new("a/b.ts")),
            Some(SourceLanguage::TypeScript)
        );
        assert_eq!(
            SourceLanguage::from_path(Path::new("a/b.JSX")),
            Some(SourceLanguage::Tsx)
        );
        assert_eq!(SourceLanguage::from_path(Path::new("a/b.rs")), None);
        assert_eq!(SourceLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn finds_import_declarations() {
        let found = specifiers(
            "import { a } from './a';\nimport b from \"../b\";\nimport './side-effect';\n",
            SourceLanguage::TypeScript,
        );
        assert_eq!(found, ["'./a'", "\"../b\"", "'./side-effect'"]);
    }

    #[test]
    fn finds_re_exports() {
        let found = specifiers(
            "export * from './all';\nexport * as ns from './ns';\nexport { x } from './x';\n",
            SourceLanguage::TypeScript,
        );
        assert_eq!(found, ["'./all'", "'./ns'", "'./x'"]);
    }

    #[test]
    fn finds_import_require() {
        let found = specifiers("import fs = require('fs');\n", SourceLanguage::TypeScript);
        assert_eq!(found, ["'fs'"]);
    }

    #[test]
    fn ignores_plain_strings() {
        let found = specifiers(
            "const s = './not-an-import';\nexport const t = \"../nope\";\nconsole.log('x');\n",
            SourceLanguage::TypeScript,
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn tsx_grammar_handles_jsx() {
        let found = specifiers(
            "import View from './view';\nexport const App = () => <View title=\"x\" />;\n",
            SourceLanguage::Tsx,
        );
        assert_eq!(found, ["'./view'"]);
    }

    #[test]
    fn spans_are_one_indexed() {
        let parsed =
            ParsedSource::parse("\nimport a from './a';\n", SourceLanguage::TypeScript).unwrap();
        let stmt = parsed
            .root()
            .children()
            .into_iter()
            .find(|n| n.kind() == "import_statement")
            .unwrap();
        let span = stmt.span();
        assert_eq!((span.line, span.column, span.start), (2, 1, 1));
        assert_eq!(stmt.text(), "import a from './a';");
    }

    #[test]
    fn recovers_from_syntax_errors() {
        let parsed =
            ParsedSource::parse("import a from './a';\nconst = ;\n", SourceLanguage::TypeScript)
                .unwrap();
        assert!(parsed.has_syntax_errors());
    }
}
