//! Refactoring suggestions for breaking a cycle.
//!
//! The heuristics here are deliberately coarse: they point at a plausible
//! first edge to attack, they do not promise an optimal one.

use std::path::Path;

use crate::types::{Cycle, Suggestion, SuggestionKind};

use super::graph::DependencyGraph;

/// Map a cycle's shape onto the suggestion catalog.
pub fn suggest_for_cycle(graph: &DependencyGraph, cycle: &Cycle) -> Vec<Suggestion> {
    if cycle.length == 1 {
        let file = cycle.chain[0].clone();
        return vec![Suggestion {
            kind: SuggestionKind::ReorderImports,
            description: "file imports itself".to_string(),
            target_edge: Some((file.clone(), file)),
        }];
    }

    let (weak_from, weak_to) = weakest_edge(graph, &cycle.chain);
    let mut out = Vec::new();

    if cycle.length == 2 {
        let a = basename(&cycle.chain[0]);
        let b = basename(&cycle.chain[1]);
        out.push(Suggestion {
            kind: SuggestionKind::ExtractInterface,
            description: format!(
                "Extract the declarations '{}' and '{}' share into a separate interface module both can import",
                a, b
            ),
            target_edge: Some((weak_from.clone(), weak_to.clone())),
        });
        out.push(Suggestion {
            kind: SuggestionKind::MergeFiles,
            description: format!(
                "'{}' and '{}' depend on each other; consider merging them into a single module",
                a, b
            ),
            target_edge: None,
        });
    } else {
        out.push(Suggestion {
            kind: SuggestionKind::ExtractInterface,
            description: format!(
                "Extract the declarations '{}' needs from '{}' into a separate interface module to break this edge",
                basename(&weak_from),
                basename(&weak_to)
            ),
            target_edge: Some((weak_from.clone(), weak_to.clone())),
        });
        out.push(Suggestion {
            kind: SuggestionKind::DependencyInjection,
            description:
                "Pass one of the cyclic dependencies in at call time instead of importing it at module scope"
                    .to_string(),
            target_edge: None,
        });
    }

    out.push(Suggestion {
        kind: SuggestionKind::LazyImport,
        description:
            "Convert one import in the cycle to a dynamic import at the point of use to defer module evaluation"
                .to_string(),
        target_edge: None,
    });

    if cycle.length >= 4 {
        out.push(Suggestion {
            kind: SuggestionKind::ReorderImports,
            description: format!(
                "Cycle spans {} files; review the module boundaries and layering in this area",
                cycle.length
            ),
            target_edge: None,
        });
    }

    out
}

/// Pick the most breakable edge of a closed chain. Edges into files that
/// look like pure type/model modules sort first; among those, edges whose
/// source depends on little else sort earlier. Ties keep cycle order.
fn weakest_edge(graph: &DependencyGraph, chain: &[String]) -> (String, String) {
    let mut best: Option<(bool, usize, usize)> = None;
    for (idx, pair) in chain.windows(2).enumerate() {
        let strength = if graph.outgoing(&pair[0]).is_empty() { 0 } else { 1 };
        let type_like = likely_type_import(&pair[1]);
        let key = (!type_like, strength, idx);
        let better = match best {
            None => true,
            Some((b_not_type, b_strength, _)) => (key.0, key.1) < (b_not_type, b_strength),
        };
        if better {
            best = Some(key);
        }
    }
    let idx = best.map(|(_, _, i)| i).unwrap_or(0);
    (chain[idx].clone(), chain[idx + 1].clone())
}

fn likely_type_import(path: &str) -> bool {
    ["types", ".d.ts", "interfaces", "models"]
        .iter()
        .any(|marker| path.contains(marker))
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}
