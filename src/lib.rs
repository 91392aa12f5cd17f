//! # cyclops
//!
//! Circular dependency analyzer for JavaScript and TypeScript source trees.
//!
//! Given a root directory, cyclops discovers source files, extracts each
//! file's outbound module references from its syntax tree, resolves the
//! specifiers against the same tree (relative paths, tsconfig-style
//! aliases, base URLs, index files, the `.js -> .ts` authoring convention),
//! assembles a file-level dependency graph, reports every strongly
//! connected component as a concrete cyclic path, and attaches refactoring
//! suggestions for breaking each cycle.
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use cyclops::{AnalyzeOptions, analyze_directory};
//! use std::path::Path;
//!
//! let result = analyze_directory(Path::new("."), &AnalyzeOptions::default())?;
//! for cycle in &result.cycles {
//!     println!("{}", cycle.chain.join(" -> "));
//! }
//! # Ok::<(), cyclops::AnalyzeError>(())
//! ```
//!
//! ## CLI usage
//!
//! ```bash
//! cyclops analyze ./src                 # human-readable report
//! cyclops analyze . --output json      # machine-readable report
//! cyclops . --ignore '*.spec.ts'       # skip test files
//! ```

/// The pipeline: extraction, resolution, graph, cycles, suggestions, cache,
/// and report emission.
pub mod analyzer;

/// Command-line argument parsing.
pub mod args;

/// File discovery with ignore rules.
pub mod fs_utils;

/// Progress events and terminal rendering helpers.
pub mod progress;

/// Shared data model.
pub mod types;

pub use analyzer::{AnalyzeError, analyze_directory};

pub use analyzer::cache::{CacheStats, ParseCache};

pub use analyzer::extractor::{SourceDialect, extract_from_source, extract_imports};

pub use analyzer::graph::DependencyGraph;

pub use analyzer::output::{build_report, render_text, to_json};

pub use analyzer::resolver::SpecifierResolver;

pub use progress::ProgressEvent;

pub use types::{
    AnalysisResult, AnalysisStats, AnalyzeOptions, Cycle, ImportKind, ImportRecord, OutputMode,
    ParseFailure, Suggestion, SuggestionKind,
};
