//! Best-first maze search over the interconnect graph.
//!
//! Expands the frontier node with the lowest cost, where cost is the
//! Manhattan distance to the target plus a penalty per hop already taken.
//! Route-thru nodes are never entered.

use crate::data::RouteEdge;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use weft_fabric::{Fabric, NodeId};

/// What one search did, kept for reporting and reproducibility checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes popped and expanded.
    pub visited: usize,
    /// The cost of every node on the found path, source first.
    pub cost_trace: Vec<f64>,
}

/// A node reached by the search, linked back to the node it came from.
#[derive(Debug, Clone)]
struct SearchNode {
    node: NodeId,
    parent: Option<usize>,
    level: u32,
    cost: f64,
}

/// A frontier entry pointing into the search arena.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    seq: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap pops the maximum.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Searches for a path from `source` to `target`.
///
/// Returns the path as PIP edges in source-to-target order, or `None` if the
/// frontier ran dry. A search from a node to itself yields an empty path.
pub fn maze_search(
    fabric: &dyn Fabric,
    source: NodeId,
    target: NodeId,
    hop_penalty: f64,
) -> (Option<Vec<RouteEdge>>, SearchStats) {
    let mut stats = SearchStats::default();
    let mut arena = vec![SearchNode {
        node: source,
        parent: None,
        level: 0,
        cost: f64::from(fabric.node_distance(source, target)),
    }];
    let mut frontier = BinaryHeap::new();
    frontier.push(Frontier {
        cost: arena[0].cost,
        seq: 0,
    });
    let mut visited = HashSet::new();

    while let Some(entry) = frontier.pop() {
        let current = arena[entry.seq].clone();
        if !visited.insert(current.node) {
            continue;
        }
        stats.visited += 1;
        if current.node == target {
            let (edges, costs) = trace_back(&arena, entry.seq);
            stats.cost_trace = costs;
            return (Some(edges), stats);
        }
        for &child in fabric.node_fanout(current.node) {
            if visited.contains(&child) {
                continue;
            }
            if fabric.node(child).is_some_and(|n| n.route_thru) {
                continue;
            }
            let level = current.level + 1;
            let cost = f64::from(fabric.node_distance(child, target)) + hop_penalty * f64::from(level);
            let seq = arena.len();
            arena.push(SearchNode {
                node: child,
                parent: Some(entry.seq),
                level,
                cost,
            });
            frontier.push(Frontier { cost, seq });
        }
    }
    (None, stats)
}

fn trace_back(arena: &[SearchNode], end: usize) -> (Vec<RouteEdge>, Vec<f64>) {
    let mut edges = Vec::new();
    let mut costs = vec![arena[end].cost];
    let mut at = end;
    while let Some(parent) = arena[at].parent {
        edges.push(RouteEdge {
            from: arena[parent].node,
            to: arena[at].node,
        });
        costs.push(arena[parent].cost);
        at = parent;
    }
    edges.reverse();
    costs.reverse();
    (edges, costs)
}
