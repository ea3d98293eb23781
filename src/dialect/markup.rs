//! Locating script regions inside markup-first documents.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_OPEN: Regex = Regex::new(r"(?i)<script\b([^>]*)>").unwrap();
    static ref SCRIPT_CLOSE: Regex = Regex::new(r"(?i)</script\s*>").unwrap();
    static ref LANG_ATTR: Regex = Regex::new(r#"(?i)\blang\s*=\s*["']?([\w-]+)"#).unwrap();
    static ref TYPE_ATTR: Regex = Regex::new(r#"(?i)\btype\s*=\s*["']?([\w/+.-]+)"#).unwrap();
}

/// `type` attribute values that still denote executable script.
const SCRIPT_TYPES: &[&str] = &[
    "module",
    "text/javascript",
    "application/javascript",
    "text/typescript",
    "application/typescript",
    "text/babel",
    "text/jsx",
];

/// A script region inside a host document, as byte offsets of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    pub start: usize,
    pub end: usize,
    /// Value of the `lang` attribute, lowercased.
    pub lang: Option<String>,
}

/// Every `<script>` element holding executable script, in document order.
pub fn script_blocks(text: &str) -> Vec<ScriptBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(open) = SCRIPT_OPEN.captures_at(text, cursor) {
        let Some(whole) = open.get(0) else { break };
        let attrs = open.get(1).map(|m| m.as_str()).unwrap_or("");
        let start = whole.end();
        let end = match SCRIPT_CLOSE.find_at(text, start) {
            Some(close) => close.start(),
            None => break,
        };
        cursor = end;

        if let Some(ty) = TYPE_ATTR.captures(attrs).and_then(|c| c.get(1)) {
            let ty = ty.as_str().to_lowercase();
            if !SCRIPT_TYPES.contains(&ty.as_str()) {
                continue;
            }
        }

        let lang = LANG_ATTR
            .captures(attrs)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase());

        blocks.push(ScriptBlock { start, end, lang });
    }

    blocks
}

/// The `---` delimited frontmatter at the top of the document, if any.
///
/// Only blank lines may precede the opening delimiter.
pub fn frontmatter(text: &str) -> Option<ScriptBlock> {
    let mut offset = 0;
    let mut opened: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        match opened {
            None if trimmed.is_empty() => {}
            None if trimmed == "---" => opened = Some(offset + line.len()),
            None => return None,
            Some(start) if trimmed == "---" => {
                return Some(ScriptBlock {
                    start,
                    end: offset,
                    lang: Some("ts".to_string()),
                });
            }
            Some(_) => {}
        }
        offset += line.len();
    }

    None
}
