//! Logweave - structural debug-log insertion.
//!
//! Given source text, the line a user is looking at and the value they
//! selected, logweave works out which construct holds the value and the
//! line where a log statement can be inserted without breaking the code.
//! When no such line exists (an arrow function with an expression body, a
//! brace-less loop body, an empty or one-line block), the body is rewritten and the change
//! is reported as a minimal edit region.
//!
//! # Architecture
//!
//! The pipeline runs leaves first and rebuilds everything on every call:
//!
//! - `dialect`: extracts the script region from `.js`/`.ts`/`.vue`/`.svelte`/... files
//! - `syntax`: tree-sitter parsing (strict grammar first, loose fallback) into a uniform arena tree
//! - `classify`: ordered checkers mapping a selection to a construct category
//! - `resolve`: per-category insertion line rules and the statement-end scanner
//! - `transform`: function and loop body rewrites and the minimal edit diff
//! - `message`: log statement text
//! - `engine`: the entry points tying the above together
//! - `inserted`: finds, removes and corrects previously inserted statements
//! - `config`: YAML configuration
//! - `report`: Output formatting (pretty, JSON)

pub mod classify;
pub mod cli;
pub mod config;
pub mod dialect;
pub mod document;
pub mod engine;
pub mod error;
pub mod inserted;
pub mod message;
pub mod report;
pub mod resolve;
pub mod syntax;
pub mod transform;

pub use classify::{Category, CheckResult, Selection};
pub use config::Config;
pub use dialect::{Dialect, SourceUnit};
pub use document::Document;
pub use engine::{classify_only, insert_log, Edit, Located, Request, Resolution};
pub use error::{Error, ParseError, Result};
pub use inserted::{find_inserted, InsertedLog};
pub use resolve::Placement;
pub use transform::{EditRegion, TransformResult};
