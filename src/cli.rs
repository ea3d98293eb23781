//! Command-line interface for logweave.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::classify::Selection;
use crate::config::Config;
use crate::engine::{self, Request};
use crate::inserted::{self, FileScan};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Structural debug-log insertion for JavaScript and TypeScript.
///
/// Logweave finds the line where a log statement for a selected value can be
/// inserted without breaking the surrounding code, rewriting arrow functions
/// and one-line bodies when no such line exists. It can also list, remove or
/// correct the statements it inserted earlier.
#[derive(Parser)]
#[command(name = "logweave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert a log statement for a selected value
    Insert(InsertArgs),
    /// Show the category and insertion line without editing
    Resolve(SelectionArgs),
    /// List previously inserted log statements
    List(ScanArgs),
    /// Remove previously inserted log statements
    Clean(ScanArgs),
    /// Fix stale file/line information in inserted log statements
    Correct(ScanArgs),
}

/// The file and selection to work on.
#[derive(Args)]
pub struct SelectionArgs {
    /// Source file
    pub file: PathBuf,

    /// Selection line (0-based)
    #[arg(short, long)]
    pub line: usize,

    /// Selected value or expression text
    #[arg(long)]
    pub value: String,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the insert command.
#[derive(Args)]
pub struct InsertArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Write the edited file back to disk
    #[arg(short, long)]
    pub write: bool,
}

/// Arguments for directory-scanning commands.
#[derive(Args)]
pub struct ScanArgs {
    /// File or directory to scan
    pub path: PathBuf,

    /// Write edited files back to disk
    #[arg(short, long)]
    pub write: bool,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

fn check_format(format: &str) -> bool {
    if format != "pretty" && format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", format);
        return false;
    }
    true
}

/// Load configuration from `--config` or by discovery.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir()?;
    let (config, path) = Config::discover(explicit, &cwd)?;
    if let Some(path) = path {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    Ok(config)
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Run the insert command.
pub fn run_insert(args: &InsertArgs, config: &Config) -> anyhow::Result<i32> {
    let sel = &args.selection;
    if !check_format(&sel.format) {
        return Ok(EXIT_ERROR);
    }

    let text = match std::fs::read_to_string(&sel.file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", sel.file.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    let file_name = file_name_of(&sel.file);
    let request = Request::new(&text, extension_of(&sel.file), Selection::new(sel.line, &sel.value))
        .with_file_name(&file_name);
    let resolution = engine::insert_log(&request, config)?;

    if args.write {
        std::fs::write(&sel.file, resolution.apply(&text))?;
    }

    let display = sel.file.to_string_lossy();
    match sel.format.as_str() {
        "json" => report::write_insert_json(&display, &resolution)?,
        _ => report::write_insert_pretty(&display, &resolution, args.write),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the resolve command.
pub fn run_resolve(args: &SelectionArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", args.file.display(), e))?;
    let located = engine::classify_only(
        &text,
        extension_of(&args.file),
        &Selection::new(args.line, &args.value),
    )?;

    let display = args.file.to_string_lossy();
    match args.format.as_str() {
        "json" => report::write_resolve_json(&display, &located)?,
        _ => report::write_resolve_pretty(&display, &located),
    }

    if located.category.is_some() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    List,
    Clean,
    Correct,
}

impl ScanAction {
    fn past_tense(&self) -> &'static str {
        match self {
            ScanAction::List => "found",
            ScanAction::Clean => "removed",
            ScanAction::Correct => "corrected",
        }
    }
}

/// Run list, clean or correct over a file or directory.
pub fn run_scan(args: &ScanArgs, config: &Config, action: ScanAction) -> anyhow::Result<i32> {
    if !check_format(&args.format) {
        return Ok(EXIT_ERROR);
    }
    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let files = inserted::collect_files(&args.path, config)?;
    let scans = inserted::scan_files(&files, config);

    let count = match action {
        ScanAction::List => scans.iter().map(|s| s.logs.len()).sum(),
        ScanAction::Clean | ScanAction::Correct => apply_scan_edits(&scans, action, args.write)?,
    };

    let display = args.path.to_string_lossy();
    match args.format.as_str() {
        "json" => report::write_scan_json(&display, &scans)?,
        _ => report::write_scan_pretty(&display, &scans, action.past_tense(), count),
    }

    if count == 0 {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Remove or correct statements file by file. Returns the number of
/// statements changed.
fn apply_scan_edits(scans: &[FileScan], action: ScanAction, write: bool) -> anyhow::Result<usize> {
    let mut total = 0;
    for scan in scans {
        let text = std::fs::read_to_string(&scan.path)?;
        let (edited, count) = match action {
            ScanAction::Clean => inserted::remove_all(&text, &scan.logs),
            _ => {
                let name = file_name_of(&scan.path);
                inserted::correct_all(&text, &scan.logs, Some(&name))
            }
        };
        total += count;
        if write && count > 0 {
            std::fs::write(&scan.path, edited)?;
            tracing::debug!(path = %scan.path.display(), count, "rewrote file");
        }
    }
    Ok(total)
}
