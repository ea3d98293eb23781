//! Grammar backends and the strict-first, loose-fallback parse strategy.
//!
//! The strict backend uses the type-aware TypeScript grammar, which rejects
//! inline markup. The loose backend uses a JSX-tolerant grammar and is only
//! consulted when the strict pass leaves error nodes behind.

use tree_sitter::{Language, Parser};

use super::SyntaxTree;
use crate::dialect::{ScriptFlavor, SourceUnit};
use crate::error::ParseError;

/// Tree-sitter grammars available to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    TypeScript,
    Tsx,
    JavaScript,
}

impl Grammar {
    pub fn name(&self) -> &'static str {
        match self {
            Grammar::TypeScript => "typescript",
            Grammar::Tsx => "tsx",
            Grammar::JavaScript => "javascript",
        }
    }

    pub(crate) fn language(&self) -> Language {
        match self {
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Grammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    fn parse_raw(&self, source: &str) -> Result<tree_sitter::Tree, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language())
            .map_err(|e| ParseError::Grammar(format!("{}: {}", self.name(), e)))?;
        parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Grammar(format!("{}: parser returned no tree", self.name())))
    }
}

/// A parsing backend producing the uniform tree.
pub trait ScriptParser {
    /// Grammar used by this backend.
    fn grammar(&self) -> Grammar;

    /// Parse the unit. The returned tree may still contain error nodes;
    /// deciding whether that is acceptable is up to the caller.
    fn parse(&self, unit: &SourceUnit, document: &str) -> Result<SyntaxTree, ParseError> {
        let grammar = self.grammar();
        let tree = grammar.parse_raw(&unit.text)?;
        Ok(SyntaxTree::from_tree_sitter(&tree, unit, document, grammar.name()))
    }
}

/// Type-aware backend without markup support.
#[derive(Debug, Default)]
pub struct StrictParser;

impl ScriptParser for StrictParser {
    fn grammar(&self) -> Grammar {
        Grammar::TypeScript
    }
}

/// Markup-tolerant backend.
#[derive(Debug)]
pub struct LooseParser {
    grammar: Grammar,
}

impl LooseParser {
    /// Loose backend for a script flavour: TSX for TypeScript code,
    /// the JavaScript grammar otherwise.
    pub fn for_flavor(flavor: ScriptFlavor) -> Self {
        let grammar = match flavor {
            ScriptFlavor::TypeScript | ScriptFlavor::Tsx => Grammar::Tsx,
            ScriptFlavor::JavaScript | ScriptFlavor::Jsx => Grammar::JavaScript,
        };
        Self { grammar }
    }
}

impl ScriptParser for LooseParser {
    fn grammar(&self) -> Grammar {
        self.grammar
    }
}

/// Backends to try for a flavour, in order.
///
/// Flavours that are known to hold markup skip the strict pass entirely.
pub fn strategy(flavor: ScriptFlavor) -> Vec<Box<dyn ScriptParser>> {
    match flavor {
        ScriptFlavor::JavaScript | ScriptFlavor::TypeScript => vec![
            Box::new(StrictParser),
            Box::new(LooseParser::for_flavor(flavor)),
        ],
        ScriptFlavor::Jsx | ScriptFlavor::Tsx => vec![Box::new(LooseParser::for_flavor(flavor))],
    }
}

/// Parse a unit with its flavour's strategy.
///
/// Returns the first error-free tree. When every backend leaves errors,
/// fails with [`ParseError::Syntax`] pointing at the last attempt's first
/// error.
pub fn parse_unit(unit: &SourceUnit, document: &str) -> Result<SyntaxTree, ParseError> {
    let mut tried = Vec::new();
    let mut error_line = unit.line_offset;

    for backend in strategy(unit.flavor) {
        let grammar = backend.grammar();
        let tree = backend.parse(unit, document)?;
        tried.push(grammar.name());

        match tree.first_error_line() {
            None => {
                if tried.len() > 1 {
                    tracing::debug!(grammar = grammar.name(), "parsed with fallback grammar");
                }
                return Ok(tree);
            }
            Some(line) => {
                tracing::debug!(grammar = grammar.name(), line, "grammar left syntax errors");
                error_line = line;
            }
        }
    }

    Err(ParseError::Syntax {
        line: error_line,
        grammars: tried,
        selection_line: None,
    })
}

/// Like [`parse_unit`] but returns the raw tree, accepting the last attempt
/// even when it still has error nodes. Scanners that only look for a few
/// well-formed statements use this so one broken line does not hide a file.
pub fn parse_raw_lenient(unit: &SourceUnit) -> Result<(tree_sitter::Tree, Grammar), ParseError> {
    let mut last = None;
    for backend in strategy(unit.flavor) {
        let grammar = backend.grammar();
        let tree = grammar.parse_raw(&unit.text)?;
        if !tree.root_node().has_error() {
            return Ok((tree, grammar));
        }
        last = Some((tree, grammar));
    }
    last.ok_or_else(|| ParseError::Grammar("no grammar for script flavour".to_string()))
}
