//! Dialect detection and extraction of the analyzable script region.
//!
//! Plain script files are analyzed whole. Markup-first hosts (Vue, Svelte,
//! HTML, Astro) embed script in a `<script>` element or a `---` frontmatter
//! block; the loader cuts that region out and remembers where it sits so
//! node positions can be reported in full-document coordinates.

pub mod markup;

use std::fmt;

use phf::phf_map;

use crate::error::ParseError;

/// Host document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    Vue,
    Svelte,
    Html,
    Astro,
}

/// Grammar family of the analyzable script itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptFlavor {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

static EXTENSIONS: phf::Map<&'static str, Dialect> = phf_map! {
    "js" => Dialect::JavaScript,
    "mjs" => Dialect::JavaScript,
    "cjs" => Dialect::JavaScript,
    "jsx" => Dialect::Jsx,
    "ts" => Dialect::TypeScript,
    "mts" => Dialect::TypeScript,
    "cts" => Dialect::TypeScript,
    "tsx" => Dialect::Tsx,
    "vue" => Dialect::Vue,
    "svelte" => Dialect::Svelte,
    "html" => Dialect::Html,
    "htm" => Dialect::Html,
    "astro" => Dialect::Astro,
};

impl Dialect {
    /// Look up a dialect by file extension (with or without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        EXTENSIONS.get(ext.as_str()).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::JavaScript => "javascript",
            Dialect::Jsx => "jsx",
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
            Dialect::Vue => "vue",
            Dialect::Svelte => "svelte",
            Dialect::Html => "html",
            Dialect::Astro => "astro",
        }
    }

    /// Whether script lives inside a markup host rather than being the
    /// whole file.
    pub fn is_markup(&self) -> bool {
        matches!(
            self,
            Dialect::Vue | Dialect::Svelte | Dialect::Html | Dialect::Astro
        )
    }

    /// All extensions the loader understands.
    pub fn extensions() -> impl Iterator<Item = &'static str> {
        EXTENSIONS.keys().copied()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ScriptFlavor {
    fn from_lang(lang: Option<&str>) -> Self {
        match lang {
            Some("ts") | Some("typescript") => ScriptFlavor::TypeScript,
            Some("tsx") => ScriptFlavor::Tsx,
            Some("jsx") => ScriptFlavor::Jsx,
            _ => ScriptFlavor::JavaScript,
        }
    }
}

/// The analyzable script region of a document.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Script text handed to the parser.
    pub text: String,
    pub dialect: Dialect,
    pub flavor: ScriptFlavor,
    /// Document line on which the script region starts.
    pub line_offset: usize,
    /// Column at which the script region starts on its first line.
    pub column_offset: usize,
    /// Document byte offset of the script region.
    pub byte_offset: usize,
}

impl SourceUnit {
    fn whole(text: &str, dialect: Dialect, flavor: ScriptFlavor) -> Self {
        Self {
            text: text.to_string(),
            dialect,
            flavor,
            line_offset: 0,
            column_offset: 0,
            byte_offset: 0,
        }
    }

    fn region(text: &str, dialect: Dialect, block: &markup::ScriptBlock) -> Self {
        let before = &text[..block.start];
        let line_offset = before.matches('\n').count();
        let column_offset = before.len() - before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            text: text[block.start..block.end].to_string(),
            dialect,
            flavor: ScriptFlavor::from_lang(block.lang.as_deref()),
            line_offset,
            column_offset,
            byte_offset: block.start,
        }
    }

    /// Map a (line, column) pair of the script region to document coordinates.
    pub fn to_document(&self, line: usize, column: usize) -> (usize, usize) {
        if line == 0 {
            (self.line_offset, column + self.column_offset)
        } else {
            (line + self.line_offset, column)
        }
    }

    /// Number of document lines covered by the region.
    pub fn line_span(&self) -> usize {
        self.text.matches('\n').count() + 1
    }

    /// Whether a document line falls inside the script region.
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.line_offset && line < self.line_offset + self.line_span()
    }
}

/// Extract the first analyzable region of `text` for the given extension.
pub fn load(text: &str, ext: &str) -> Result<SourceUnit, ParseError> {
    load_at(text, ext, None)
}

/// Like [`load`], but for markup hosts pick the block containing `line`.
///
/// A markup line outside every block (template or style markup) fails with
/// [`ParseError::NoScriptBlock`].
pub fn load_at(text: &str, ext: &str, line: Option<usize>) -> Result<SourceUnit, ParseError> {
    let units = load_all(text, ext)?;
    let chosen = match line {
        None => 0,
        Some(l) => match units.iter().position(|u| u.contains_line(l)) {
            Some(index) => index,
            None => match units.first() {
                Some(unit) if unit.dialect.is_markup() => {
                    return Err(ParseError::NoScriptBlock {
                        dialect: unit.dialect.to_string(),
                    })
                }
                _ => 0,
            },
        },
    };
    let unit = units
        .into_iter()
        .nth(chosen)
        .ok_or_else(|| ParseError::UnsupportedDialect(ext.to_string()))?;

    tracing::debug!(
        dialect = %unit.dialect,
        line_offset = unit.line_offset,
        "loaded script region"
    );
    Ok(unit)
}

/// Every analyzable region of `text`, in document order.
///
/// Plain scripts yield exactly one unit; markup hosts yield one per block
/// and fail when they have none.
pub fn load_all(text: &str, ext: &str) -> Result<Vec<SourceUnit>, ParseError> {
    let dialect = Dialect::from_extension(ext)
        .ok_or_else(|| ParseError::UnsupportedDialect(ext.to_string()))?;

    let flavor = match dialect {
        Dialect::JavaScript => ScriptFlavor::JavaScript,
        Dialect::Jsx => ScriptFlavor::Jsx,
        Dialect::TypeScript => ScriptFlavor::TypeScript,
        Dialect::Tsx => ScriptFlavor::Tsx,
        Dialect::Vue | Dialect::Svelte | Dialect::Html | Dialect::Astro => {
            let mut blocks = Vec::new();
            if dialect == Dialect::Astro {
                blocks.extend(markup::frontmatter(text));
            }
            blocks.extend(markup::script_blocks(text));
            if blocks.is_empty() {
                return Err(ParseError::NoScriptBlock {
                    dialect: dialect.to_string(),
                });
            }
            return Ok(blocks
                .iter()
                .map(|b| SourceUnit::region(text, dialect, b))
                .collect());
        }
    };
    Ok(vec![SourceUnit::whole(text, dialect, flavor)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_script_is_whole_text() {
        let unit = load("const a = 1;\n", "ts").expect("should load");
        assert_eq!(unit.dialect, Dialect::TypeScript);
        assert_eq!(unit.flavor, ScriptFlavor::TypeScript);
        assert_eq!(unit.line_offset, 0);
        assert_eq!(unit.text, "const a = 1;\n");
    }

    #[test]
    fn test_extension_lookup_accepts_dot() {
        assert_eq!(Dialect::from_extension(".MJS"), Some(Dialect::JavaScript));
        assert_eq!(Dialect::from_extension("py"), None);
    }

    #[test]
    fn test_vue_block_offset() {
        let text = "<template>\n  <div/>\n</template>\n<script lang=\"ts\">\nconst a = 1;\n</script>\n";
        let unit = load(text, "vue").expect("should load");
        assert_eq!(unit.flavor, ScriptFlavor::TypeScript);
        assert_eq!(unit.line_offset, 3);
        assert_eq!(unit.to_document(1, 0), (4, 0));
        assert_eq!(unit.to_document(0, 0), (3, 18));
    }

    #[test]
    fn test_missing_block_is_an_error() {
        let err = load("<div>nothing</div>", "svelte").unwrap_err();
        assert_eq!(
            err,
            ParseError::NoScriptBlock {
                dialect: "svelte".to_string()
            }
        );
    }

    #[test]
    fn test_picks_block_containing_line() {
        let text = "<script>\nlet a;\n</script>\n<p/>\n<script setup>\nlet b;\n</script>\n";
        let unit = load_at(text, "vue", Some(5)).expect("should load");
        assert_eq!(unit.line_offset, 4);
        assert!(unit.text.contains("let b;"));
        let first = load(text, "vue").expect("should load");
        assert!(first.text.contains("let a;"));
    }

    #[test]
    fn test_line_outside_blocks_is_an_error() {
        let text = "<template>\n  <div/>\n</template>\n<script>\nlet a;\n</script>\n";
        assert_eq!(
            load_at(text, "vue", Some(1)).unwrap_err(),
            ParseError::NoScriptBlock {
                dialect: "vue".to_string()
            }
        );
        assert!(load_at(text, "vue", Some(4)).is_ok());
        assert!(load_at(text, "vue", None).is_ok());
        // Plain scripts have one region covering every line.
        assert!(load_at("a;\nb;\n", "js", Some(1)).is_ok());
    }

    #[test]
    fn test_load_all_returns_every_block() {
        let text = "---\nconst a = 1;\n---\n<script>\nlet b;\n</script>\n";
        let units = load_all(text, "astro").expect("should load");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].flavor, ScriptFlavor::TypeScript);
        assert_eq!(units[1].line_offset, 3);
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            load("x", "rb"),
            Err(ParseError::UnsupportedDialect(_))
        ));
    }
}
