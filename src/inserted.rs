//! Previously inserted log statements.
//!
//! Finds statements that look like ones the engine generates (configured
//! call name, message starting with the configured prefix) so they can be
//! listed, removed, or have their `file:`/`line:` claims corrected after the
//! code around them moved.
//!
//! All edits for one file are computed against the same text and applied in
//! one pass, last offset first, so earlier edits never shift later ones.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor};
use walkdir::WalkDir;

use crate::config::Config;
use crate::dialect::{self, Dialect};
use crate::document::Document;
use crate::error::ParseError;
use crate::syntax::parser::parse_raw_lenient;

/// Calls whose first argument is a string or template literal.
const CALL_QUERY: &str = r#"
(call_expression
  function: (_) @callee
  arguments: (arguments . [(string) (template_string)] @message)) @call
"#;

static FILE_CLAIM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"file: ([^\s:~`'\x22]+)(?::(\d+))?").unwrap());
static LINE_CLAIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"line: (\d+)").unwrap());

/// One previously inserted statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertedLog {
    /// 0-indexed line the statement starts on.
    pub line: usize,
    pub end_line: usize,
    /// Byte range of the whole statement including its terminator.
    pub statement_range: (usize, usize),
    /// Bytes to delete when removing the statement: whole lines when the
    /// statement is alone on them.
    pub removal_range: (usize, usize),
    /// Byte range of the message literal, quotes included.
    pub message_range: (usize, usize),
    pub message: String,
    pub claimed_file: Option<String>,
    /// 1-based line written in the message.
    pub claimed_line: Option<usize>,
}

impl InsertedLog {
    /// Whether the message's line claim disagrees with where it sits.
    pub fn is_stale(&self) -> bool {
        self.claimed_line
            .map(|claimed| claimed != self.line + 1)
            .unwrap_or(false)
    }
}

/// A replacement of `start..end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

/// Apply non-overlapping edits computed against the same text.
///
/// Edits overlapping an already applied one are dropped.
pub fn apply_edits(text: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));
    let mut out = text.to_string();
    let mut floor = usize::MAX;
    for edit in edits {
        if edit.end > floor || edit.start > edit.end || edit.end > text.len() {
            continue;
        }
        out.replace_range(edit.start..edit.end, &edit.replacement);
        floor = edit.start;
    }
    out
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whether a message literal carries the generated-message signature.
fn has_signature(literal: &str, config: &Config) -> bool {
    let content = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or("");
    if !config.message_prefix.is_empty() {
        return content.starts_with(&config.message_prefix);
    }
    if !config.delimiter.is_empty() {
        return content.contains(&format!(" {} ", config.delimiter));
    }
    true
}

/// Lines containing something that looks like a call to the logger.
fn candidate_lines(doc: &Document, call_name: &str) -> Vec<usize> {
    let pattern = format!(r"{}\s*\(", regex::escape(call_name));
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };
    let mut lines: Vec<usize> = re
        .find_iter(doc.text())
        .map(|m| doc.position_at(m.start()).line)
        .collect();
    lines.dedup();
    lines
}

/// Find previously inserted statements in `text`.
pub fn find_inserted(text: &str, ext: &str, config: &Config) -> Result<Vec<InsertedLog>, ParseError> {
    let doc = Document::new(text);
    let candidates = candidate_lines(&doc, &config.call_name);
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let units = match dialect::load_all(text, ext) {
        Ok(units) => units,
        Err(ParseError::NoScriptBlock { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let call_name = squash(&config.call_name);
    let mut found = Vec::new();

    for unit in &units {
        let (tree, grammar) = parse_raw_lenient(unit)?;
        let query = Query::new(&grammar.language(), CALL_QUERY)
            .map_err(|e| ParseError::Grammar(format!("{}: {}", grammar.name(), e)))?;
        let source = unit.text.as_bytes();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source);

        while let Some(m) = matches.next() {
            let mut call = None;
            let mut callee = None;
            let mut message = None;
            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "call" => call = Some(capture.node),
                    "callee" => callee = Some(capture.node),
                    "message" => message = Some(capture.node),
                    _ => {}
                }
            }
            let (Some(call), Some(callee), Some(message)) = (call, callee, message) else {
                continue;
            };

            if squash(callee.utf8_text(source).unwrap_or("")) != call_name {
                continue;
            }
            let literal = message.utf8_text(source).unwrap_or("");
            if !has_signature(literal, config) {
                continue;
            }
            // Statement-level calls only.
            let Some(statement) = call.parent().filter(|p| p.kind() == "expression_statement")
            else {
                continue;
            };

            let start = statement.start_byte() + unit.byte_offset;
            let end = statement.end_byte() + unit.byte_offset;
            let line = doc.position_at(start).line;
            if candidates.binary_search(&line).is_err() {
                continue;
            }
            let end_line = doc.position_at(end).line;

            let (claimed_file, claimed_line) = parse_claims(literal);
            found.push(InsertedLog {
                line,
                end_line,
                statement_range: (start, end),
                removal_range: removal_range(&doc, start, end, line, end_line),
                message_range: (
                    message.start_byte() + unit.byte_offset,
                    message.end_byte() + unit.byte_offset,
                ),
                message: literal.to_string(),
                claimed_file,
                claimed_line,
            });
        }
    }

    found.sort_by_key(|log| log.statement_range.0);
    found.dedup_by_key(|log| log.statement_range);
    tracing::debug!(count = found.len(), "found inserted statements");
    Ok(found)
}

fn parse_claims(message: &str) -> (Option<String>, Option<usize>) {
    if let Some(caps) = FILE_CLAIM.captures(message) {
        let file = caps.get(1).map(|m| m.as_str().to_string());
        let line = caps.get(2).and_then(|m| m.as_str().parse().ok());
        return (file, line);
    }
    let line = LINE_CLAIM
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());
    (None, line)
}

fn removal_range(doc: &Document, start: usize, end: usize, line: usize, end_line: usize) -> (usize, usize) {
    let text = doc.text();
    let before = &text[doc.line_start(line)..start];
    let after = &text[end..doc.line_end(end_line)];
    if before.trim().is_empty() && after.trim().is_empty() {
        (doc.line_start(line), doc.line_start(end_line + 1))
    } else {
        (start, end)
    }
}

/// Delete every inserted statement. Returns the new text and the count.
pub fn remove_all(text: &str, logs: &[InsertedLog]) -> (String, usize) {
    let edits: Vec<TextEdit> = logs
        .iter()
        .map(|log| TextEdit {
            start: log.removal_range.0,
            end: log.removal_range.1,
            replacement: String::new(),
        })
        .collect();
    let count = edits.len();
    (apply_edits(text, edits), count)
}

/// Rewrite stale `file:`/`line:` claims. Returns the new text and the
/// number of statements changed.
pub fn correct_all(text: &str, logs: &[InsertedLog], file_name: Option<&str>) -> (String, usize) {
    let edits: Vec<TextEdit> = logs
        .iter()
        .filter_map(|log| {
            let corrected = corrected_message(&log.message, log.line + 1, file_name);
            (corrected != log.message).then(|| TextEdit {
                start: log.message_range.0,
                end: log.message_range.1,
                replacement: corrected,
            })
        })
        .collect();
    let count = edits.len();
    (apply_edits(text, edits), count)
}

fn corrected_message(message: &str, actual_line: usize, file_name: Option<&str>) -> String {
    if FILE_CLAIM.is_match(message) {
        return FILE_CLAIM
            .replace(message, |caps: &regex::Captures| {
                let file = match file_name {
                    Some(name) => name,
                    None => &caps[1],
                };
                match caps.get(2) {
                    Some(_) => format!("file: {}:{}", file, actual_line),
                    None => format!("file: {}", file),
                }
            })
            .into_owned();
    }
    LINE_CLAIM
        .replace(message, format!("line: {}", actual_line).as_str())
        .into_owned()
}

/// Inserted statements found in one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileScan {
    pub path: PathBuf,
    pub logs: Vec<InsertedLog>,
}

/// Files under `root` in a supported dialect, skipping excluded paths,
/// hidden directories and `node_modules`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            if e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.') {
                return false;
            }
            !(e.file_type().is_dir() && name == "node_modules")
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if Dialect::from_extension(ext).is_none() {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// Scan files in parallel. Unreadable or unparseable files are skipped with
/// a warning. Results are sorted by path.
pub fn scan_files(files: &[PathBuf], config: &Config) -> Vec<FileScan> {
    let scanned = AtomicUsize::new(0);

    let mut results: Vec<FileScan> = files
        .par_iter()
        .filter_map(|path| {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    return None;
                }
            };
            scanned.fetch_add(1, Ordering::Relaxed);
            match find_inserted(&text, ext, config) {
                Ok(logs) if !logs.is_empty() => Some(FileScan {
                    path: path.clone(),
                    logs,
                }),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping file");
                    None
                }
            }
        })
        .collect();

    results.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(
        scanned = scanned.load(Ordering::Relaxed),
        with_logs = results.len(),
        "scan finished"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"function f(a) {
  console.log("🚀 ~ f ~ file: app.js:2 ~ a:", a);
  const b = a + 1;
  console.log("🚀 ~ f ~ file: app.js:9 ~ b:", b);
  console.log("unrelated", b);
  return b;
}
"#;

    #[test]
    fn test_find_inserted_with_claims() {
        let logs = find_inserted(SAMPLE, "js", &Config::default()).unwrap();
        assert_eq!(logs.len(), 2, "unrelated call must be ignored");
        assert_eq!(logs[0].line, 1);
        assert_eq!(logs[0].claimed_file.as_deref(), Some("app.js"));
        assert_eq!(logs[0].claimed_line, Some(2));
        assert!(!logs[0].is_stale());
        assert!(logs[1].is_stale());
    }

    #[test]
    fn test_remove_all_deletes_whole_lines() {
        let logs = find_inserted(SAMPLE, "js", &Config::default()).unwrap();
        let (text, count) = remove_all(SAMPLE, &logs);
        assert_eq!(count, 2);
        assert!(!text.contains("🚀"));
        assert!(text.contains("console.log(\"unrelated\", b);"));
        assert_eq!(text.lines().count(), SAMPLE.lines().count() - 2);
    }

    #[test]
    fn test_correct_all_fixes_stale_lines() {
        let logs = find_inserted(SAMPLE, "js", &Config::default()).unwrap();
        let (text, count) = correct_all(SAMPLE, &logs, None);
        assert_eq!(count, 1);
        assert!(text.contains("file: app.js:4 ~ b:"), "{text}");
        assert!(text.contains("file: app.js:2 ~ a:"));
    }

    #[test]
    fn test_correct_all_renames_file() {
        let logs = find_inserted(SAMPLE, "js", &Config::default()).unwrap();
        let (text, count) = correct_all(SAMPLE, &logs, Some("main.js"));
        assert_eq!(count, 2);
        assert!(!text.contains("app.js"));
    }

    #[test]
    fn test_line_only_claims() {
        assert_eq!(parse_claims("\"🚀 ~ line: 12 ~ x:\""), (None, Some(12)));
        assert_eq!(
            corrected_message("\"🚀 ~ line: 12 ~ x:\"", 3, Some("ignored.js")),
            "\"🚀 ~ line: 3 ~ x:\""
        );
    }

    #[test]
    fn test_no_candidates_skips_parse() {
        let logs = find_inserted("const = = ;", "js", &Config::default()).unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn test_apply_edits_descending() {
        let edits = vec![
            TextEdit {
                start: 0,
                end: 1,
                replacement: "A".to_string(),
            },
            TextEdit {
                start: 2,
                end: 3,
                replacement: "CC".to_string(),
            },
        ];
        assert_eq!(apply_edits("abc", edits), "AbCC");
    }
}
