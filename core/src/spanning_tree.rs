use std::borrow::Borrow;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt::Display;
use std::hash::Hash;

use serde::Serialize;

use crate::config::{EngineConfig, Selection};
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, NodeIx, NodeKey};
use crate::union_find::UnionFind;

/// Selected edges in selection order, plus their summed weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanningTree<N> {
    pub edges: Vec<Edge<N>>,
    pub total_weight: f64,
    /// Trees in the result: connected components for Kruskal (isolated nodes
    /// count), always 1 for Prim.
    pub component_count: usize,
}

impl<N> SpanningTree<N> {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn require_undirected<N: NodeKey>(graph: &Graph<N>, algorithm: &'static str) -> Result<()> {
    if graph.is_directed() {
        tracing::debug!(algorithm, "spanning tree requested on a directed graph");
        return Err(GraphError::DirectedGraphUnsupported { algorithm });
    }
    Ok(())
}

fn to_edge<N: NodeKey>(graph: &Graph<N>, from: NodeIx, to: NodeIx, weight: f64) -> Edge<N> {
    Edge {
        from: graph.node_at(from).clone(),
        to: graph.node_at(to).clone(),
        weight,
    }
}

/// Minimum spanning forest by Kruskal's algorithm.
///
/// Edges are taken in ascending weight order; the sort is stable, so equal
/// weights keep insertion order and repeated runs select the same edges.
/// A disconnected graph yields one tree per component rather than an error.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn kruskal<N: NodeKey>(graph: &Graph<N>) -> Result<SpanningTree<N>> {
    require_undirected(graph, "kruskal")?;

    let mut order: Vec<_> = graph.edge_records().iter().collect();
    order.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut sets = UnionFind::new(graph.node_count());
    let mut edges = Vec::with_capacity(graph.node_count().saturating_sub(1));
    let mut total_weight = 0.0;

    for record in order {
        if sets.union(record.from, record.to) {
            edges.push(to_edge(graph, record.from, record.to, record.weight));
            total_weight += record.weight;
        }
    }

    tracing::debug!(
        selected = edges.len(),
        components = sets.components(),
        total_weight,
        "kruskal complete"
    );
    Ok(SpanningTree {
        edges,
        total_weight,
        component_count: sets.components(),
    })
}

/// Minimum spanning tree of `start`'s component by Prim's algorithm.
pub fn prim<N, Q>(graph: &Graph<N>, start: &Q) -> Result<SpanningTree<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    prim_with(graph, start, &EngineConfig::default())
}

/// A crossing edge waiting in the frontier. `seq` is push order.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    weight: f64,
    seq: usize,
    from: NodeIx,
    to: NodeIx,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Frontier of crossing edges. Both variants pop the minimum weight, earliest
/// pushed first on ties, so they select identical trees.
enum Frontier {
    Scan(Vec<Candidate>),
    Heap(BinaryHeap<Reverse<Candidate>>),
}

impl Frontier {
    fn new(selection: Selection) -> Self {
        match selection {
            Selection::LinearScan => Frontier::Scan(Vec::new()),
            Selection::BinaryHeap => Frontier::Heap(BinaryHeap::new()),
        }
    }

    fn push(&mut self, candidate: Candidate) {
        match self {
            Frontier::Scan(list) => list.push(candidate),
            Frontier::Heap(heap) => heap.push(Reverse(candidate)),
        }
    }

    fn pop_min(&mut self) -> Option<Candidate> {
        match self {
            Frontier::Scan(list) => {
                let mut best = 0;
                for (i, c) in list.iter().enumerate().skip(1) {
                    if c.weight < list[best].weight {
                        best = i;
                    }
                }
                // `remove` keeps push order for the remaining entries.
                (!list.is_empty()).then(|| list.remove(best))
            }
            Frontier::Heap(heap) => heap.pop().map(|Reverse(c)| c),
        }
    }
}

/// Prim with explicit configuration.
///
/// Grows a single tree from `start`: the visited set is seeded with `start`,
/// each round takes the lightest crossing edge, discards it if its target is
/// already in the tree, and otherwise adds the target and its crossing edges.
/// Nodes outside `start`'s component never appear, unlike [`kruskal`].
#[tracing::instrument(level = "debug", skip_all, fields(start = %start, nodes = graph.node_count(), selection = ?config.selection))]
pub fn prim_with<N, Q>(graph: &Graph<N>, start: &Q, config: &EngineConfig) -> Result<SpanningTree<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    require_undirected(graph, "prim")?;
    let start = graph.require(start)?;

    let mut in_tree = vec![false; graph.node_count()];
    let mut frontier = Frontier::new(config.selection);
    let mut seq = 0usize;
    let mut edges = Vec::new();
    let mut total_weight = 0.0;

    let mut expand = |node: NodeIx, in_tree: &[bool], frontier: &mut Frontier| {
        for link in graph.out_links(node) {
            if !in_tree[link.target] {
                frontier.push(Candidate {
                    weight: link.weight,
                    seq,
                    from: node,
                    to: link.target,
                });
                seq += 1;
            }
        }
    };

    in_tree[start] = true;
    expand(start, &in_tree, &mut frontier);

    while let Some(candidate) = frontier.pop_min() {
        if in_tree[candidate.to] {
            continue;
        }
        in_tree[candidate.to] = true;
        edges.push(to_edge(graph, candidate.from, candidate.to, candidate.weight));
        total_weight += candidate.weight;
        expand(candidate.to, &in_tree, &mut frontier);
    }

    tracing::debug!(selected = edges.len(), total_weight, "prim complete");
    Ok(SpanningTree {
        edges,
        total_weight,
        component_count: 1,
    })
}
