//! The analysis pipeline: discovery, batched extraction, resolution, graph
//! assembly, and cycle reporting.

pub mod cache;
pub mod cycles;
pub mod extractor;
pub mod graph;
pub mod output;
pub mod resolver;
pub mod suggestions;
pub mod tsconfig;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;

use crate::fs_utils::{IgnoreMatcher, gather_source_files};
use crate::progress::ProgressEvent;
use crate::types::{
    AnalysisResult, AnalysisStats, AnalyzeOptions, ImportRecord, ParseFailure, SUMMARY_LIMIT,
};

use cache::ParseCache;
use graph::DependencyGraph;
use resolver::SpecifierResolver;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("root path does not exist: {}", .0.display())]
    MissingRoot(PathBuf),
    #[error("root path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("analysis cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Run the full pipeline on `root`. Per-file parse failures land in the
/// result's `errors`; only an invalid root or cancellation is fatal.
pub fn analyze_directory(
    root: &Path,
    options: &AnalyzeOptions,
) -> Result<AnalysisResult, AnalyzeError> {
    let started = Instant::now();

    if !root.exists() {
        return Err(AnalyzeError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(AnalyzeError::NotADirectory(root.to_path_buf()));
    }
    let root_canon = root.canonicalize()?;

    emit(options, ProgressEvent::Discovering);
    let allowed: HashSet<String> = options.extensions.iter().map(|e| e.to_lowercase()).collect();
    let matcher = IgnoreMatcher::new(&options.ignore_patterns);
    let mut discovered = Vec::new();
    gather_source_files(
        &root_canon,
        &allowed,
        &options.ignored_dirs,
        &matcher,
        options.follow_symlinks,
        &mut discovered,
    );
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let files: Vec<PathBuf> = discovered
        .into_iter()
        .map(|p| p.canonicalize().unwrap_or(p))
        .filter(|p| seen.insert(p.clone()))
        .collect();

    let (aliases, base_dir) = resolver_config(&root_canon, options);
    let resolver = SpecifierResolver::new(
        root_canon.clone(),
        &aliases,
        base_dir.as_deref(),
        options.extensions.iter().map(|e| e.to_lowercase()).collect(),
    );

    let total = files.len();
    let concurrency = options.concurrency.max(1);
    let parse_cache = options.enable_cache.then(cache::shared);
    let mut extracted: Vec<(PathBuf, Vec<ImportRecord>)> = Vec::with_capacity(total);
    let mut errors: Vec<ParseFailure> = Vec::new();
    let mut done = 0usize;

    for batch in files.chunks(concurrency) {
        if cancelled(options) {
            return Err(AnalyzeError::Cancelled);
        }
        let results: Vec<(PathBuf, Result<Vec<ImportRecord>, String>)> = batch
            .par_iter()
            .map(|path| (path.clone(), process_file(path, parse_cache)))
            .collect();
        for (path, outcome) in results {
            match outcome {
                Ok(records) => extracted.push((path, records)),
                Err(message) => {
                    if verbose() {
                        eprintln!("[cyclops][warn] {}: {}", path.display(), message);
                    }
                    errors.push(ParseFailure {
                        file: path,
                        error: message,
                    });
                }
            }
        }
        done += batch.len();
        emit(options, ProgressEvent::Parsing { current: done, total });
    }

    emit(options, ProgressEvent::Analyzing);

    // Two passes: nodes in discovery order first, so edge targets always
    // land on already-known nodes regardless of walk order.
    let mut graph = DependencyGraph::new();
    for file in &files {
        graph.add_node(&file.to_string_lossy());
    }
    let node_set: HashSet<&Path> = files.iter().map(|p| p.as_path()).collect();
    for (file, records) in &extracted {
        let from = file.to_string_lossy();
        for record in records {
            let Some(target) = resolver.resolve(file, &record.source) else {
                continue;
            };
            // A probe can hit a real file the walk never admitted (ignored
            // directory, filtered extension); those stay out of the graph.
            if node_set.contains(target.as_path()) {
                graph.add_edge(&from, &target.to_string_lossy());
            }
        }
    }

    let mut found_cycles = match options.max_cycles {
        Some(cap) => cycles::elementary_cycles(&graph, cap),
        None => cycles::find_cycles(&graph),
    };
    for cycle in &mut found_cycles {
        cycle.suggestions = suggestions::suggest_for_cycle(&graph, cycle);
    }

    let stats = AnalysisStats {
        total_files: files.len(),
        total_edges: graph.edge_count(),
        cycle_count: found_cycles.len(),
        top_dependencies: graph.top_k_by_outgoing(SUMMARY_LIMIT),
        top_dependents: graph.top_k_by_incoming(SUMMARY_LIMIT),
        duration: started.elapsed(),
    };

    Ok(AnalysisResult {
        root: root_canon,
        graph,
        cycles: found_cycles,
        errors,
        stats,
    })
}

/// Explicit options win; otherwise the nearest tsconfig.json supplies the
/// alias table and base directory.
fn resolver_config(
    root: &Path,
    options: &AnalyzeOptions,
) -> (HashMap<String, Vec<String>>, Option<PathBuf>) {
    if let Some(aliases) = &options.aliases {
        return (aliases.clone(), options.base_url.clone());
    }
    match tsconfig::discover(root) {
        Some(config) => (
            config.paths,
            options.base_url.clone().or(Some(config.base_dir)),
        ),
        None => (HashMap::new(), options.base_url.clone()),
    }
}

/// Read, hash, check the cache, and extract one file's imports.
fn process_file(path: &Path, cache: Option<&ParseCache>) -> Result<Vec<ImportRecord>, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("read failed: {}", e))?;
    let hash = cache::content_hash(&content);
    if let Some(cache) = cache
        && let Some(records) = cache.get(path, &hash)
    {
        return Ok(records);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let records = extractor::extract_from_source(&content, &ext).map_err(|e| e.to_string())?;
    if let Some(cache) = cache {
        cache.put(path, hash, records.clone());
    }
    Ok(records)
}

fn emit(options: &AnalyzeOptions, event: ProgressEvent) {
    if let Some(callback) = &options.progress {
        callback(&event);
    }
}

fn cancelled(options: &AnalyzeOptions) -> bool {
    options
        .cancel
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

fn verbose() -> bool {
    std::env::var("CYCLOPS_VERBOSE").is_ok()
}
