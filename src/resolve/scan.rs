//! Text-level statement end scanner.
//!
//! Walks forward from a statement start keeping an explicit stack of
//! expected closers. Strings, template literals, comments and regex literals
//! are skipped so their brackets do not count. A statement ends at a `;` or a
//! line break at depth zero, unless the line break is followed or preceded
//! by something that continues the expression.

use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Paren,
    Bracket,
    Brace,
    /// Inside template literal text.
    Template,
    /// Inside `${ ... }` of a template literal.
    Substitution,
}

/// Last line of the statement starting at byte `start`.
pub fn statement_end_line(doc: &Document, start: usize) -> usize {
    let bytes = doc.text().as_bytes();
    let mut stack: Vec<Frame> = Vec::new();
    let mut i = start.min(bytes.len());
    // Last two significant code bytes, most recent last.
    let mut tail: [Option<u8>; 2] = [None, None];

    while i < bytes.len() {
        let b = bytes[i];

        if stack.last() == Some(&Frame::Template) {
            match b {
                b'\\' => i += 2,
                b'`' => {
                    stack.pop();
                    push_sig(&mut tail, b'`');
                    i += 1;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    stack.push(Frame::Substitution);
                    i += 2;
                }
                _ => i += 1,
            }
            continue;
        }

        match b {
            b'\n' => {
                if stack.is_empty() && tail[1].is_some() && !continues(bytes, i, &tail) {
                    return doc.position_at(i).line;
                }
                i += 1;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            b'\'' | b'"' => {
                i = skip_string(bytes, i);
                push_sig(&mut tail, b);
                continue;
            }
            b'`' => {
                stack.push(Frame::Template);
                i += 1;
                continue;
            }
            b'/' if regex_allowed(tail[1]) => {
                i = skip_regex(bytes, i);
                // Regex end never continues a line.
                push_sig(&mut tail, b'r');
                continue;
            }
            b'(' => stack.push(Frame::Paren),
            b'[' => stack.push(Frame::Bracket),
            b'{' => stack.push(Frame::Brace),
            b')' => pop_if(&mut stack, Frame::Paren),
            b']' => pop_if(&mut stack, Frame::Bracket),
            b'}' => {
                if !pop_if_matched(&mut stack, Frame::Substitution) {
                    pop_if(&mut stack, Frame::Brace);
                }
            }
            b';' if stack.is_empty() => return doc.position_at(i).line,
            _ => {}
        }

        if !b.is_ascii_whitespace() {
            push_sig(&mut tail, b);
        }
        i += 1;
    }

    doc.position_at(bytes.len()).line
}

fn push_sig(tail: &mut [Option<u8>; 2], b: u8) {
    tail[0] = tail[1];
    tail[1] = Some(b);
}

fn pop_if(stack: &mut Vec<Frame>, frame: Frame) {
    pop_if_matched(stack, frame);
}

fn pop_if_matched(stack: &mut Vec<Frame>, frame: Frame) -> bool {
    if stack.last() == Some(&frame) {
        stack.pop();
        true
    } else {
        false
    }
}

/// A `/` starts a regex literal when it cannot be a division.
fn regex_allowed(prev: Option<u8>) -> bool {
    match prev {
        None => true,
        Some(p) => b"(,=:[!&|?{};+-*%<>~^".contains(&p),
    }
}

fn skip_line_comment(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    i += 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip a quoted string. Unterminated strings stop at the line break.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_regex(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return i;
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Whether the statement carries on past the line break at `newline`.
fn continues(bytes: &[u8], newline: usize, tail: &[Option<u8>; 2]) -> bool {
    ends_with_continuation(tail) || next_line_continues(bytes, newline + 1)
}

fn ends_with_continuation(tail: &[Option<u8>; 2]) -> bool {
    let [before, Some(last)] = *tail else {
        return false;
    };
    match last {
        b'>' => before == Some(b'='),
        b'+' | b'-' => before != Some(last),
        b'.' | b',' | b'=' | b'&' | b'|' | b'?' | b':' | b'*' | b'%' | b'^' | b'~' | b'<' => true,
        _ => false,
    }
}

fn next_line_continues(bytes: &[u8], mut i: usize) -> bool {
    // Skip blank and comment-only lines.
    loop {
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\r') {
            i += 1;
        }
        if i >= bytes.len() {
            return false;
        }
        if bytes[i] == b'\n' {
            i += 1;
            continue;
        }
        if bytes[i..].starts_with(b"//") {
            i = skip_line_comment(bytes, i);
            continue;
        }
        break;
    }

    let rest = &bytes[i..];
    for keyword in [&b"else"[..], b"catch", b"finally"] {
        if rest.starts_with(keyword)
            && rest
                .get(keyword.len())
                .map(|c| !(c.is_ascii_alphanumeric() || *c == b'_' || *c == b'$'))
                .unwrap_or(true)
        {
            return true;
        }
    }

    match rest[0] {
        b'.' | b'?' | b':' | b';' | b',' | b'=' | b'|' | b'&' => true,
        b'+' | b'-' => rest.get(1) != Some(&rest[0]),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(text: &str) -> usize {
        statement_end_line(&Document::new(text), 0)
    }

    #[test]
    fn test_semicolon_ends_statement() {
        assert_eq!(end("const a = 1;\nconst b = 2;\n"), 0);
    }

    #[test]
    fn test_multiline_brackets() {
        let text = "const list = [\n  1,\n  2,\n];\nnext();\n";
        assert_eq!(end(text), 3);
    }

    #[test]
    fn test_asi_line_break() {
        assert_eq!(end("const a = 1\nconst b = 2\n"), 0);
    }

    #[test]
    fn test_method_chain_continues() {
        let text = "fetch(url)\n  .then((r) => r.json())\n  // note\n  .catch(log)\nnext()\n";
        assert_eq!(end(text), 3);
    }

    #[test]
    fn test_trailing_operator_continues() {
        assert_eq!(end("const t = a +\n  b\nc\n"), 1);
        assert_eq!(end("const f = (x) =>\n  x * 2\n"), 1);
        assert_eq!(end("let i = j++\nk\n"), 0);
    }

    #[test]
    fn test_lone_terminator_joins_statement() {
        assert_eq!(end("const a = {\n  b: 1\n}\n;\nnext\n"), 3);
    }

    #[test]
    fn test_strings_templates_and_comments_are_opaque() {
        let text = "const s = \"{[(\" + `${a.map((x) => `}${x}`)}` /* ) */\nnext\n";
        assert_eq!(end(text), 0);
    }

    #[test]
    fn test_regex_literal() {
        assert_eq!(end("const re = /[)(]+/g\nnext\n"), 0);
    }

    #[test]
    fn test_try_catch_chain() {
        let text = "try {\n  a()\n}\ncatch (e) {\n  b()\n}\nfinally {\n}\nnext\n";
        assert_eq!(end(text), 7);
    }
}
