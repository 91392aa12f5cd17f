use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::analyzer::graph::DependencyGraph;
use crate::progress::ProgressCallback;

/// Directory names that are never descended into unless overridden.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".git",
    "coverage",
    ".next",
    ".nuxt",
];

/// Extensions admitted by default, in probe order.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

pub const DEFAULT_CONCURRENCY: usize = 50;

/// How many entries the top-dependency/top-dependent summaries carry.
pub const SUMMARY_LIMIT: usize = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputMode {
    Text,
    Json,
}

/// One outbound module reference extracted from a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRecord {
    /// The module specifier exactly as written, unquoted.
    pub source: String,
    pub kind: ImportKind,
    /// Locally introduced binding names (`default`, `foo`, `* as utils`, `*`).
    pub specifiers: Vec<String>,
    /// 1-indexed line of the containing statement.
    pub line: usize,
}

impl ImportRecord {
    pub fn new(source: String, kind: ImportKind, line: usize) -> Self {
        Self {
            source,
            kind,
            specifiers: Vec::new(),
            line,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    StaticEsm,
    DynamicEsm,
    CommonJsRequire,
    Reexport,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::StaticEsm => "static-esm",
            ImportKind::DynamicEsm => "dynamic-esm",
            ImportKind::CommonJsRequire => "commonjs-require",
            ImportKind::Reexport => "reexport",
        }
    }
}

/// A representative closed walk through one strongly connected component,
/// or a self-loop. `chain` is closed: first element equals last.
#[derive(Clone, Debug)]
pub struct Cycle {
    pub chain: Vec<String>,
    /// Number of distinct files in the cycle (`chain.len() - 1`, or 1 for a
    /// self-loop).
    pub length: usize,
    pub suggestions: Vec<Suggestion>,
}

impl Cycle {
    pub fn new(chain: Vec<String>) -> Self {
        let length = chain.len().saturating_sub(1).max(1);
        Self {
            chain,
            length,
            suggestions: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionKind {
    ExtractInterface,
    DependencyInjection,
    LazyImport,
    MergeFiles,
    ReorderImports,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::ExtractInterface => "extract-interface",
            SuggestionKind::DependencyInjection => "dependency-injection",
            SuggestionKind::LazyImport => "lazy-import",
            SuggestionKind::MergeFiles => "merge-files",
            SuggestionKind::ReorderImports => "reorder-imports",
        }
    }
}

/// Actionable guidance for breaking one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub description: String,
    /// The `(from, to)` edge the suggestion proposes to alter, if any.
    pub target_edge: Option<(String, String)>,
}

/// A per-file failure captured during extraction. Never fatal.
#[derive(Clone, Debug)]
pub struct ParseFailure {
    pub file: PathBuf,
    pub error: String,
}

#[derive(Clone, Debug, Default)]
pub struct AnalysisStats {
    pub total_files: usize,
    pub total_edges: usize,
    pub cycle_count: usize,
    /// Files with the most outgoing edges, `(path, count)` descending.
    pub top_dependencies: Vec<(String, usize)>,
    /// Files with the most incoming edges, `(path, count)` descending.
    pub top_dependents: Vec<(String, usize)>,
    pub duration: Duration,
}

/// Everything `analyze_directory` hands back to the caller.
#[derive(Debug)]
pub struct AnalysisResult {
    pub root: PathBuf,
    pub graph: DependencyGraph,
    pub cycles: Vec<Cycle>,
    pub errors: Vec<ParseFailure>,
    pub stats: AnalysisStats,
}

/// Configuration for one analysis run.
pub struct AnalyzeOptions {
    /// Allowed extensions, lowercased, in probe order.
    pub extensions: Vec<String>,
    /// Directory names skipped without descending.
    pub ignored_dirs: HashSet<String>,
    /// Minimal-glob ignore patterns (`*`, `?`, substring fallback).
    pub ignore_patterns: Vec<String>,
    pub follow_symlinks: bool,
    /// Path alias table, pattern -> replacement templates. When `None` the
    /// nearest tsconfig.json supplies aliases and base URL.
    pub aliases: Option<HashMap<String, Vec<String>>>,
    /// Base directory for non-relative resolution. Relative values are
    /// joined onto the analyzed root.
    pub base_url: Option<PathBuf>,
    /// Upper bound on files processed in parallel per batch.
    pub concurrency: usize,
    /// Reuse extraction results for files whose content hash is unchanged.
    pub enable_cache: bool,
    /// When set, switches the cycle engine to bounded elementary-cycle
    /// enumeration capped at this many cycles.
    pub max_cycles: Option<usize>,
    pub progress: Option<ProgressCallback>,
    /// Cooperative cancellation: checked between batches.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
            aliases: None,
            base_url: None,
            concurrency: DEFAULT_CONCURRENCY,
            enable_cache: true,
            max_cycles: None,
            progress: None,
            cancel: None,
        }
    }
}
