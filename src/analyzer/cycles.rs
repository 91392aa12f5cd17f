//! Cycle discovery over the dependency graph.
//!
//! Tarjan's strongly-connected-components algorithm finds every SCC in one
//! DFS pass; each SCC of two or more files becomes one reported cycle with
//! a concrete closed path through it. Self-loops are not surfaced by Tarjan
//! as multi-node components, so they are scanned for separately. A bounded
//! Johnson enumeration of simple elementary cycles is available for callers
//! that want more than one representative per component.

use std::cmp::min;
use std::collections::HashSet;

use crate::types::Cycle;

use super::graph::DependencyGraph;

struct TarjanData {
    index: usize,
    indices: Vec<Option<usize>>,
    lowlinks: Vec<usize>,
    stack: Vec<usize>,
    on_stack: Vec<bool>,
    sccs: Vec<Vec<usize>>,
}

/// One cycle per SCC of size ≥ 2, then one per self-looping file.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let n = graph.id_count();
    let mut data = TarjanData {
        index: 0,
        indices: vec![None; n],
        lowlinks: vec![0; n],
        stack: Vec::new(),
        on_stack: vec![false; n],
        sccs: Vec::new(),
    };

    for id in graph.live_ids() {
        if data.indices[id].is_none() {
            strongconnect(id, graph, &mut data);
        }
    }

    let mut cycles = Vec::new();
    for scc in &data.sccs {
        if scc.len() > 1 {
            let chain = reconstruct_chain(graph, scc);
            cycles.push(Cycle::new(
                chain.iter().map(|&id| graph.path_of(id).to_string()).collect(),
            ));
        }
    }

    for id in graph.live_ids() {
        if graph.out_ids(id).contains(&id) {
            let path = graph.path_of(id).to_string();
            cycles.push(Cycle::new(vec![path.clone(), path]));
        }
    }

    cycles
}

fn strongconnect(node: usize, graph: &DependencyGraph, data: &mut TarjanData) {
    data.indices[node] = Some(data.index);
    data.lowlinks[node] = data.index;
    data.index += 1;
    data.stack.push(node);
    data.on_stack[node] = true;

    for &next in graph.out_ids(node) {
        if data.indices[next].is_none() {
            strongconnect(next, graph, data);
            data.lowlinks[node] = min(data.lowlinks[node], data.lowlinks[next]);
        } else if data.on_stack[next] {
            let next_index = data.indices[next].unwrap_or(data.lowlinks[next]);
            data.lowlinks[node] = min(data.lowlinks[node], next_index);
        }
    }

    if Some(data.lowlinks[node]) == data.indices[node] {
        let mut scc = Vec::new();
        while let Some(member) = data.stack.pop() {
            data.on_stack[member] = false;
            scc.push(member);
            if member == node {
                break;
            }
        }
        data.sccs.push(scc);
    }
}

/// Build a real closed path through one SCC: DFS from its smallest id,
/// following only in-component edges, until the start is reached again.
/// The synthesized member list is a fallback for robustness only.
fn reconstruct_chain(graph: &DependencyGraph, scc: &[usize]) -> Vec<usize> {
    let members: HashSet<usize> = scc.iter().copied().collect();
    let start = scc.iter().copied().min().unwrap_or(scc[0]);

    let mut path = vec![start];
    let mut visited: HashSet<usize> = HashSet::from([start]);
    if close_path(graph, &members, start, start, &mut path, &mut visited) {
        path.push(start);
        return path;
    }

    let mut chain = scc.to_vec();
    chain.push(scc[0]);
    chain
}

fn close_path(
    graph: &DependencyGraph,
    members: &HashSet<usize>,
    current: usize,
    start: usize,
    path: &mut Vec<usize>,
    visited: &mut HashSet<usize>,
) -> bool {
    for &next in graph.out_ids(current) {
        if !members.contains(&next) {
            continue;
        }
        if next == start && path.len() >= 2 {
            return true;
        }
        if next != start && visited.insert(next) {
            path.push(next);
            if close_path(graph, members, next, start, path, visited) {
                return true;
            }
            path.pop();
        }
    }
    false
}

/// Enumerate up to `max_cycles` simple elementary cycles (Johnson's
/// algorithm), each normalized to its minimum-rotation form with duplicates
/// dropped.
pub fn elementary_cycles(graph: &DependencyGraph, max_cycles: usize) -> Vec<Cycle> {
    let n = graph.id_count();
    let mut found: Vec<Vec<usize>> = Vec::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();

    for start in graph.live_ids() {
        if found.len() >= max_cycles {
            break;
        }
        let mut blocked = vec![false; n];
        let mut block_map: Vec<HashSet<usize>> = vec![HashSet::new(); n];
        let mut path = Vec::new();
        circuit(
            graph,
            start,
            start,
            &mut blocked,
            &mut block_map,
            &mut path,
            &mut found,
            &mut seen,
            max_cycles,
        );
    }

    found
        .into_iter()
        .map(|ids| {
            let mut chain: Vec<String> =
                ids.iter().map(|&id| graph.path_of(id).to_string()).collect();
            chain.push(chain[0].clone());
            Cycle::new(chain)
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn circuit(
    graph: &DependencyGraph,
    node: usize,
    start: usize,
    blocked: &mut Vec<bool>,
    block_map: &mut Vec<HashSet<usize>>,
    path: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
    seen: &mut HashSet<Vec<usize>>,
    cap: usize,
) -> bool {
    let mut closed = false;
    path.push(node);
    blocked[node] = true;

    for &next in graph.out_ids(node) {
        // Each cycle is discovered from its smallest member only.
        if next < start || found.len() >= cap {
            continue;
        }
        if next == start {
            let canonical = canonicalize(path.clone());
            if seen.insert(canonical.clone()) {
                found.push(canonical);
            }
            closed = true;
        } else if !blocked[next]
            && circuit(
                graph, next, start, blocked, block_map, path, found, seen, cap,
            )
        {
            closed = true;
        }
    }

    if closed {
        unblock(node, blocked, block_map);
    } else {
        for &next in graph.out_ids(node) {
            if next >= start {
                block_map[next].insert(node);
            }
        }
    }

    path.pop();
    closed
}

fn unblock(node: usize, blocked: &mut Vec<bool>, block_map: &mut Vec<HashSet<usize>>) {
    blocked[node] = false;
    let waiting: Vec<usize> = block_map[node].drain().collect();
    for w in waiting {
        if blocked[w] {
            unblock(w, blocked, block_map);
        }
    }
}

fn canonicalize(mut cycle: Vec<usize>) -> Vec<usize> {
    if cycle.is_empty() {
        return cycle;
    }
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, &id)| id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(min_pos);
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (from, to) in edges {
            g.add_edge(from, to);
        }
        g
    }

    fn assert_valid_chain(graph: &DependencyGraph, cycle: &Cycle) {
        assert!(cycle.chain.len() >= 2);
        assert_eq!(cycle.chain.first(), cycle.chain.last());
        for pair in cycle.chain.windows(2) {
            assert!(
                graph.has_edge(&pair[0], &pair[1]),
                "{} -> {} is not an edge",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn detects_two_file_cycle() {
        let g = graph_of(&[("a", "b"), ("b", "a")]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, 2);
        assert_valid_chain(&g, &cycles[0]);
        assert!(cycles[0].chain.contains(&"a".to_string()));
        assert!(cycles[0].chain.contains(&"b".to_string()));
    }

    #[test]
    fn detects_self_loop() {
        let g = graph_of(&[("a", "a")]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, 1);
        assert_eq!(cycles[0].chain, vec!["a", "a"]);
    }

    #[test]
    fn no_cycle_in_acyclic_graph() {
        let g = graph_of(&[("a", "b"), ("b", "c")]);
        assert!(find_cycles(&g).is_empty());
    }

    #[test]
    fn three_node_cycle_with_detached_edge() {
        let g = graph_of(&[("a", "b"), ("b", "c"), ("c", "a"), ("d", "e")]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, 3);
        assert_valid_chain(&g, &cycles[0]);
    }

    #[test]
    fn diamond_has_no_cycle() {
        let g = graph_of(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert!(find_cycles(&g).is_empty());
    }

    #[test]
    fn multi_node_cycle_and_self_loop_are_separate_entries() {
        let g = graph_of(&[("u", "v"), ("v", "u"), ("u", "u")]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().any(|c| c.length == 2));
        assert!(
            cycles
                .iter()
                .any(|c| c.length == 1 && c.chain == vec!["u", "u"])
        );
    }

    #[test]
    fn two_disjoint_cycles_both_reported() {
        let g = graph_of(&[("a", "b"), ("b", "a"), ("x", "y"), ("y", "x")]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 2);
        for cycle in &cycles {
            assert_valid_chain(&g, cycle);
        }
    }

    #[test]
    fn chain_is_a_real_path_through_larger_component() {
        // One SCC of four nodes with a chord.
        let g = graph_of(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a"), ("b", "a")]);
        let cycles = find_cycles(&g);

        assert_eq!(cycles.len(), 1);
        assert_valid_chain(&g, &cycles[0]);
    }

    #[test]
    fn find_cycles_is_deterministic() {
        let edges = [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "c")];
        let first: Vec<Vec<String>> = find_cycles(&graph_of(&edges))
            .into_iter()
            .map(|c| c.chain)
            .collect();
        let second: Vec<Vec<String>> = find_cycles(&graph_of(&edges))
            .into_iter()
            .map(|c| c.chain)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn elementary_cycles_enumerates_all_simple_cycles() {
        // Two elementary cycles sharing node b: a->b->a and b->c->b.
        let g = graph_of(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")]);
        let cycles = elementary_cycles(&g, 10);

        assert_eq!(cycles.len(), 2);
        for cycle in &cycles {
            assert_valid_chain(&g, cycle);
        }
    }

    #[test]
    fn elementary_cycles_respects_cap() {
        let g = graph_of(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "b"), ("c", "a")]);
        let cycles = elementary_cycles(&g, 1);
        assert_eq!(cycles.len(), 1);
    }

    #[test]
    fn elementary_cycles_deduplicates_rotations() {
        let g = graph_of(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let cycles = elementary_cycles(&g, 10);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, 3);
    }

    #[test]
    fn elementary_cycles_includes_self_loops() {
        let g = graph_of(&[("a", "a"), ("a", "b"), ("b", "a")]);
        let cycles = elementary_cycles(&g, 10);

        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().any(|c| c.length == 1));
        assert!(cycles.iter().any(|c| c.length == 2));
    }
}
