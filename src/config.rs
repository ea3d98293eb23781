//! Configuration for logweave.
//!
//! Settings are read from YAML. Every field has a default, so an empty file
//! (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names looked up in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["logweave.yaml", ".logweave.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Logging call to emit, e.g. `console.log` or `logger.debug`.
    pub call_name: String,
    /// Preferred quote character for the message string.
    pub quote: char,
    /// Separator between message parts.
    pub delimiter: String,
    pub message_prefix: String,
    /// Appended to the logged expression in the label.
    pub message_suffix: String,
    pub include_file_name: bool,
    pub include_line_number: bool,
    pub include_enclosing_class: bool,
    pub include_enclosing_function: bool,
    pub add_semicolon: bool,
    pub insert_empty_line_before: bool,
    pub insert_empty_line_after: bool,
    /// Glob patterns for paths to skip in directory scans (e.g. "**/node_modules/**")
    pub excluded_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            call_name: "console.log".to_string(),
            quote: '"',
            delimiter: "~".to_string(),
            message_prefix: "🚀".to_string(),
            message_suffix: ":".to_string(),
            include_file_name: true,
            include_line_number: true,
            include_enclosing_class: true,
            include_enclosing_function: true,
            add_semicolon: true,
            insert_empty_line_before: false,
            insert_empty_line_after: false,
            excluded_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load the configuration to use.
    ///
    /// An explicit path wins; otherwise the working directory and then the
    /// user configuration directory are searched. Returns the path that was
    /// read, if any.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let config = Self::parse_file(path)
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?;
            validate(&config)?;
            return Ok((config, Some(path.to_path_buf())));
        }

        let mut candidates: Vec<PathBuf> = CONFIG_FILE_NAMES.iter().map(|n| cwd.join(n)).collect();
        if let Some(dirs) = directories::ProjectDirs::from("", "", "logweave") {
            candidates.push(dirs.config_dir().join("config.yaml"));
        }

        for path in candidates {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using config file");
                let config = Self::parse_file(&path)
                    .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?;
                validate(&config)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();
        self.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }

    /// Statement terminator appended after the call.
    pub fn terminator(&self) -> &'static str {
        if self.add_semicolon {
            ";"
        } else {
            ""
        }
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.call_name.trim().is_empty() {
        anyhow::bail!("call_name must not be empty");
    }
    if !matches!(config.quote, '"' | '\'' | '`') {
        anyhow::bail!("invalid quote {:?}, must be one of \", ' or `", config.quote);
    }
    if config.delimiter.contains('\n') {
        anyhow::bail!("delimiter must not contain a newline");
    }
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }
    Ok(())
}
