//! Read-only view over a document's text with a line index.

/// A position inside a document (0-indexed line and byte column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Document text plus the byte offset at which every line starts.
///
/// Lines are split on `\n`; a trailing newline produces a final empty
/// line, the way editors count them.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the first character of `line`.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// Byte offset just past the last character of `line`, excluding the
    /// line terminator.
    pub fn line_end(&self, line: usize) -> usize {
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        if end > 0 && self.text.as_bytes().get(end - 1) == Some(&b'\r') {
            end - 1
        } else {
            end
        }
    }

    /// Text of `line` without its terminator. Out-of-range lines are empty.
    pub fn line_text(&self, line: usize) -> &str {
        if line >= self.line_count() {
            return "";
        }
        &self.text[self.line_start(line)..self.line_end(line)]
    }

    /// Column of the first non-whitespace character of `line`, or the line
    /// length when the line is blank.
    pub fn first_non_whitespace(&self, line: usize) -> usize {
        let text = self.line_text(line);
        text.len() - text.trim_start().len()
    }

    /// Leading whitespace of `line`.
    pub fn indentation(&self, line: usize) -> &str {
        let text = self.line_text(line);
        &text[..self.first_non_whitespace(line)]
    }

    /// Convert a byte offset into a position. Offsets past the end clamp to
    /// the end of the document.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position {
            line,
            column: offset - self.line_starts[line],
        }
    }

    /// Convert a position into a byte offset, clamping the column to the line.
    pub fn offset_at(&self, position: Position) -> usize {
        if position.line >= self.line_count() {
            return self.text.len();
        }
        let start = self.line_start(position.line);
        let end = self.line_end(position.line);
        (start + position.column).min(end)
    }

    /// Guess the indentation unit used by the document: a tab when any line
    /// is tab-indented, otherwise the smallest non-zero run of leading spaces
    /// (two when nothing is indented).
    pub fn indent_unit(&self) -> String {
        let mut smallest: Option<usize> = None;
        for line in 0..self.line_count() {
            let indent = self.indentation(line);
            if indent.is_empty() || self.line_text(line).trim().is_empty() {
                continue;
            }
            if indent.starts_with('\t') {
                return "\t".to_string();
            }
            let spaces = indent.chars().take_while(|c| *c == ' ').count();
            if spaces > 0 {
                smallest = Some(smallest.map_or(spaces, |s: usize| s.min(spaces)));
            }
        }
        " ".repeat(smallest.unwrap_or(2).clamp(1, 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let doc = Document::new("a\n  bb\r\n\nccc");
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line_text(0), "a");
        assert_eq!(doc.line_text(1), "  bb");
        assert_eq!(doc.line_text(2), "");
        assert_eq!(doc.line_text(3), "ccc");
        assert_eq!(doc.line_text(9), "");
        assert_eq!(doc.first_non_whitespace(1), 2);
    }

    #[test]
    fn test_trailing_newline_counts_as_line() {
        let doc = Document::new("x\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(1), "");
    }

    #[test]
    fn test_offset_position_conversion() {
        let doc = Document::new("ab\ncde\nf");
        let pos = doc.position_at(4);
        assert_eq!(pos, Position { line: 1, column: 1 });
        assert_eq!(doc.offset_at(pos), 4);
        assert_eq!(doc.position_at(3), Position { line: 1, column: 0 });
        assert_eq!(doc.offset_at(Position { line: 0, column: 99 }), 2);
    }

    #[test]
    fn test_indent_unit() {
        assert_eq!(Document::new("a\n    b\n  c").indent_unit(), "  ");
        assert_eq!(Document::new("a\n\tb").indent_unit(), "\t");
        assert_eq!(Document::new("flat").indent_unit(), "  ");
    }
}
