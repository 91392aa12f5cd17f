//! Report emission: the JSON document consumed by downstream tools and the
//! human-readable text rendering. All paths are relativized to the analyzed
//! root.

use std::path::Path;

use serde::Serialize;

use crate::progress::human_duration;
use crate::types::AnalysisResult;

#[derive(Serialize)]
pub struct AnalysisReport {
    pub stats: ReportStats,
    pub cycles: Vec<ReportCycle>,
    pub graph: ReportGraph,
    pub errors: Vec<ReportError>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_files: usize,
    pub total_dependencies: usize,
    pub circular_dependencies: usize,
    pub top_dependencies: Vec<FileCount>,
    pub top_dependents: Vec<FileCount>,
    /// Milliseconds of wall clock.
    pub duration: u128,
}

#[derive(Serialize)]
pub struct FileCount {
    pub file: String,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ReportCycle {
    pub chain: Vec<String>,
    pub length: usize,
    pub suggestions: Vec<ReportSuggestion>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSuggestion {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_edge: Option<ReportEdge>,
}

#[derive(Serialize)]
pub struct ReportEdge {
    pub from: String,
    pub to: String,
}

#[derive(Serialize)]
pub struct ReportGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<ReportEdge>,
}

#[derive(Serialize)]
pub struct ReportError {
    pub file: String,
    pub error: String,
}

fn relativize(path: &str, root: &Path) -> String {
    Path::new(path)
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string())
}

/// Assemble the serializable report from a finished analysis.
pub fn build_report(result: &AnalysisResult) -> AnalysisReport {
    let root = result.root.as_path();
    let rel = |p: &str| relativize(p, root);

    let stats = ReportStats {
        total_files: result.stats.total_files,
        total_dependencies: result.stats.total_edges,
        circular_dependencies: result.stats.cycle_count,
        top_dependencies: result
            .stats
            .top_dependencies
            .iter()
            .map(|(file, count)| FileCount {
                file: rel(file),
                count: *count,
            })
            .collect(),
        top_dependents: result
            .stats
            .top_dependents
            .iter()
            .map(|(file, count)| FileCount {
                file: rel(file),
                count: *count,
            })
            .collect(),
        duration: result.stats.duration.as_millis(),
    };

    let cycles = result
        .cycles
        .iter()
        .map(|cycle| ReportCycle {
            chain: cycle.chain.iter().map(|p| rel(p)).collect(),
            length: cycle.length,
            suggestions: cycle
                .suggestions
                .iter()
                .map(|s| ReportSuggestion {
                    kind: s.kind.as_str(),
                    description: s.description.clone(),
                    target_edge: s.target_edge.as_ref().map(|(from, to)| ReportEdge {
                        from: rel(from),
                        to: rel(to),
                    }),
                })
                .collect(),
        })
        .collect();

    let graph = ReportGraph {
        nodes: result.graph.nodes().iter().map(|p| rel(p)).collect(),
        edges: result
            .graph
            .edges()
            .iter()
            .map(|(from, to)| ReportEdge {
                from: rel(from),
                to: rel(to),
            })
            .collect(),
    };

    let errors = result
        .errors
        .iter()
        .map(|failure| ReportError {
            file: relativize(&failure.file.to_string_lossy(), root),
            error: failure.error.clone(),
        })
        .collect();

    AnalysisReport {
        stats,
        cycles,
        graph,
        errors,
    }
}

pub fn to_json(result: &AnalysisResult) -> String {
    serde_json::to_string_pretty(&build_report(result)).unwrap_or_default()
}

/// Plain-text rendering for terminal output.
pub fn render_text(result: &AnalysisResult) -> String {
    let root = result.root.as_path();
    let rel = |p: &str| relativize(p, root);
    let mut out = String::new();

    if result.cycles.is_empty() {
        out.push_str("No circular imports detected.\n");
    } else {
        out.push_str(&format!(
            "Circular imports detected ({} cycles):\n",
            result.cycles.len()
        ));
        for (i, cycle) in result.cycles.iter().enumerate() {
            let chain: Vec<String> = cycle.chain.iter().map(|p| rel(p)).collect();
            out.push_str(&format!("  Cycle {}: {}\n", i + 1, chain.join(" -> ")));
            for suggestion in &cycle.suggestions {
                out.push_str(&format!(
                    "    - [{}] {}\n",
                    suggestion.kind.as_str(),
                    suggestion.description
                ));
            }
        }
    }

    out.push_str(&format!(
        "\nAnalyzed {} files, {} dependencies in {}.\n",
        result.stats.total_files,
        result.stats.total_edges,
        human_duration(result.stats.duration)
    ));

    if !result.stats.top_dependencies.is_empty() {
        out.push_str("Top dependencies:\n");
        for (file, count) in &result.stats.top_dependencies {
            out.push_str(&format!("  {} ({})\n", rel(file), count));
        }
    }
    if !result.stats.top_dependents.is_empty() {
        out.push_str("Top dependents:\n");
        for (file, count) in &result.stats.top_dependents {
            out.push_str(&format!("  {} ({})\n", rel(file), count));
        }
    }

    if !result.errors.is_empty() {
        out.push_str(&format!("\nErrors ({}):\n", result.errors.len()));
        for failure in &result.errors {
            out.push_str(&format!(
                "  {}: {}\n",
                relativize(&failure.file.to_string_lossy(), root),
                failure.error
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::graph::DependencyGraph;
    use crate::types::{AnalysisStats, Cycle, Suggestion, SuggestionKind};
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample_result() -> AnalysisResult {
        let mut graph = DependencyGraph::new();
        graph.add_edge("/repo/src/a.ts", "/repo/src/b.ts");
        graph.add_edge("/repo/src/b.ts", "/repo/src/a.ts");

        let mut cycle = Cycle::new(vec![
            "/repo/src/a.ts".to_string(),
            "/repo/src/b.ts".to_string(),
            "/repo/src/a.ts".to_string(),
        ]);
        cycle.suggestions = vec![Suggestion {
            kind: SuggestionKind::ExtractInterface,
            description: "extract the shared bits".to_string(),
            target_edge: Some(("/repo/src/a.ts".to_string(), "/repo/src/b.ts".to_string())),
        }];

        AnalysisResult {
            root: PathBuf::from("/repo"),
            graph,
            cycles: vec![cycle],
            errors: Vec::new(),
            stats: AnalysisStats {
                total_files: 2,
                total_edges: 2,
                cycle_count: 1,
                top_dependencies: vec![("/repo/src/a.ts".to_string(), 1)],
                top_dependents: vec![("/repo/src/b.ts".to_string(), 1)],
                duration: Duration::from_millis(12),
            },
        }
    }

    #[test]
    fn json_report_uses_relative_paths_and_camel_case() {
        let json = to_json(&sample_result());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stats"]["totalFiles"], 2);
        assert_eq!(value["stats"]["totalDependencies"], 2);
        assert_eq!(value["stats"]["circularDependencies"], 1);
        assert_eq!(value["cycles"][0]["chain"][0], "src/a.ts");
        assert_eq!(
            value["cycles"][0]["suggestions"][0]["type"],
            "extract-interface"
        );
        assert_eq!(
            value["cycles"][0]["suggestions"][0]["targetEdge"]["to"],
            "src/b.ts"
        );
        assert_eq!(value["graph"]["nodes"][0], "src/a.ts");
        assert_eq!(value["graph"]["edges"][0]["from"], "src/a.ts");
        assert!(value["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn json_chain_is_closed() {
        let json = to_json(&sample_result());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let chain = value["cycles"][0]["chain"].as_array().unwrap();
        assert_eq!(chain.first(), chain.last());
    }

    #[test]
    fn suggestion_without_target_edge_omits_the_key() {
        let mut result = sample_result();
        result.cycles[0].suggestions = vec![Suggestion {
            kind: SuggestionKind::LazyImport,
            description: "defer it".to_string(),
            target_edge: None,
        }];
        let json = to_json(&result);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(
            value["cycles"][0]["suggestions"][0]
                .get("targetEdge")
                .is_none()
        );
    }

    #[test]
    fn text_rendering_joins_chains_with_arrows() {
        let text = render_text(&sample_result());
        assert!(text.contains("Circular imports detected (1 cycles):"));
        assert!(text.contains("src/a.ts -> src/b.ts -> src/a.ts"));
        assert!(text.contains("[extract-interface]"));
    }

    #[test]
    fn text_rendering_for_clean_tree() {
        let mut result = sample_result();
        result.cycles.clear();
        let text = render_text(&result);
        assert!(text.starts_with("No circular imports detected."));
    }
}
