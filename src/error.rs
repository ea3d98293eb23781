//! Error types for the insertion pipeline.
//!
//! Only parsing is fatal. Matchers and the line resolver degrade to the
//! fallback behaviour instead of returning errors.

use thiserror::Error;

/// Errors raised while turning document text into a syntax tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported file extension: {0:?}")]
    UnsupportedDialect(String),
    #[error("no embeddable script block found in {dialect} document")]
    NoScriptBlock { dialect: String },
    #[error("failed to load grammar: {0}")]
    Grammar(String),
    #[error("{}", syntax_message(*line, grammars, *selection_line))]
    Syntax {
        /// First line (0-indexed, document coordinates) holding a syntax error.
        line: usize,
        /// Grammars that were tried, in order.
        grammars: Vec<&'static str>,
        /// The line the user was looking at, when known.
        selection_line: Option<usize>,
    },
}

fn syntax_message(line: usize, grammars: &[&'static str], selection_line: Option<usize>) -> String {
    let mut msg = format!(
        "syntax error at line {} (tried {})",
        line + 1,
        grammars.join(", ")
    );
    if let Some(sel) = selection_line {
        msg.push_str(&format!(" while resolving line {}", sel + 1));
    }
    msg
}

impl ParseError {
    /// Attach the selection line to a syntax error.
    pub fn at_selection(self, selection: usize) -> Self {
        match self {
            ParseError::Syntax { line, grammars, .. } => ParseError::Syntax {
                line,
                grammars,
                selection_line: Some(selection),
            },
            other => other,
        }
    }
}

/// Top-level error for engine entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("selection line {line} is outside the document ({line_count} lines)")]
    SelectionOutOfRange { line: usize, line_count: usize },
    #[error("selection text is empty")]
    EmptySelection,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_message_mentions_selection() {
        let err = ParseError::Syntax {
            line: 4,
            grammars: vec!["typescript", "tsx"],
            selection_line: None,
        }
        .at_selection(9);
        let msg = err.to_string();
        assert!(msg.contains("line 5"), "got {msg}");
        assert!(msg.contains("typescript, tsx"), "got {msg}");
        assert!(msg.contains("resolving line 10"), "got {msg}");
    }

    #[test]
    fn test_parse_error_converts() {
        let err: Error = ParseError::UnsupportedDialect("py".to_string()).into();
        assert!(matches!(err, Error::Parse(ParseError::UnsupportedDialect(_))));
    }
}
