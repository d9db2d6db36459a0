use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::error::{GraphError, Result};

/// Anything usable as a node identifier: strings, integers, small newtypes.
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> NodeKey for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

/// Dense node position (insertion order). Never exposed to callers.
pub(crate) type NodeIx = usize;

/// One entry in an adjacency list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Link {
    pub target: NodeIx,
    pub weight: f64,
}

/// A logical edge in the stored orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeRecord {
    pub from: NodeIx,
    pub to: NodeIx,
    pub weight: f64,
}

/// A weighted edge between two caller-visible nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge<N> {
    pub from: N,
    pub to: N,
    pub weight: f64,
}

/// In-memory weighted graph: node interning + adjacency lists + logical edge list.
///
/// Nodes are interned to dense positions in insertion order, so every
/// per-node table in the algorithms is a plain `Vec`. Arcs are stored in both
/// `outgoing[u]` and `incoming[v]`; for undirected graphs each edge is stored
/// as two arcs, one per orientation, kept in sync on overwrite.
///
/// `edges` holds one record per logical edge (one per unordered pair when
/// undirected) in order of first insertion, which is what weight sums and
/// Kruskal iterate over.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    directed: bool,
    nodes: Vec<N>,
    index: HashMap<N, NodeIx>,
    outgoing: Vec<Vec<Link>>,
    incoming: Vec<Vec<Link>>,
    edges: Vec<EdgeRecord>,
    edge_slots: HashMap<(NodeIx, NodeIx), usize>,
}

impl<N: NodeKey> Graph<N> {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            nodes: Vec::new(),
            index: HashMap::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            edges: Vec::new(),
            edge_slots: HashMap::new(),
        }
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(directed: bool, node_count: usize, edge_count: usize) -> Self {
        Self {
            directed,
            nodes: Vec::with_capacity(node_count),
            index: HashMap::with_capacity(node_count),
            outgoing: Vec::with_capacity(node_count),
            incoming: Vec::with_capacity(node_count),
            edges: Vec::with_capacity(edge_count),
            edge_slots: HashMap::with_capacity(edge_count),
        }
    }

    /// Bulk load from `(from, to, weight)` triples.
    ///
    /// Stops at the first non-finite weight; nothing is returned in that case.
    pub fn from_edges<I, A, B>(directed: bool, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B, f64)>,
        A: Into<N>,
        B: Into<N>,
    {
        let mut graph = Self::new(directed);
        for (from, to, weight) in edges {
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Register a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: impl Into<N>) {
        self.intern(node.into());
    }

    /// Add an edge, or overwrite the weight of an existing one.
    ///
    /// Both endpoints are added if missing. Undirected graphs get the mirrored
    /// arc automatically; re-adding `(v, u)` overwrites `(u, v)` and keeps the
    /// first-inserted orientation in [`edges`](Self::edges).
    ///
    /// Weights must be finite. Path sums that exceed `f64::MAX` saturate
    /// rather than become infinite; see [`Distance::plus`](crate::Distance::plus).
    pub fn add_edge(&mut self, from: impl Into<N>, to: impl Into<N>, weight: f64) -> Result<()> {
        let from = from.into();
        let to = to.into();
        if !weight.is_finite() {
            return Err(GraphError::InvalidWeight {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            });
        }

        let u = self.intern(from);
        let v = self.intern(to);

        let key = self.slot_key(u, v);
        match self.edge_slots.get(&key) {
            Some(&slot) => {
                self.edges[slot].weight = weight;
                self.update_link(u, v, weight);
                if !self.directed && u != v {
                    self.update_link(v, u, weight);
                }
            }
            None => {
                self.edge_slots.insert(key, self.edges.len());
                self.edges.push(EdgeRecord { from: u, to: v, weight });
                self.push_link(u, v, weight);
                if !self.directed && u != v {
                    self.push_link(v, u, weight);
                }
            }
        }
        Ok(())
    }

    /// Outgoing `(neighbor, weight)` pairs in insertion order.
    /// Unknown nodes have no neighbors.
    pub fn neighbors<Q>(&self, node: &Q) -> Vec<(&N, f64)>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index_of(node) {
            Some(ix) => self.outgoing[ix]
                .iter()
                .map(|a| (&self.nodes[a.target], a.weight))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Weight of the arc `from -> to`, if present.
    pub fn weight<Q>(&self, from: &Q, to: &Q) -> Option<f64>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let u = self.index_of(from)?;
        let v = self.index_of(to)?;
        self.outgoing[u]
            .iter()
            .find(|l| l.target == v)
            .map(|a| a.weight)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Logical edges in order of first insertion, one per unordered pair when undirected.
    pub fn edges(&self) -> Vec<Edge<N>> {
        self.edges
            .iter()
            .map(|e| Edge {
                from: self.nodes[e.from].clone(),
                to: self.nodes[e.to].clone(),
                weight: e.weight,
            })
            .collect()
    }

    pub fn contains<Q>(&self, node: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of logical edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// First logical edge with a negative weight, if any.
    pub fn first_negative_edge(&self) -> Option<Edge<N>> {
        self.edges.iter().find(|e| e.weight < 0.0).map(|e| Edge {
            from: self.nodes[e.from].clone(),
            to: self.nodes[e.to].clone(),
            weight: e.weight,
        })
    }

    pub fn has_negative_weight(&self) -> bool {
        self.edges.iter().any(|e| e.weight < 0.0)
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let nodes_mem = self.nodes.len() * (2 * size_of::<N>() + size_of::<NodeIx>() + 16);
        let out_links: usize = self.outgoing.iter().map(|v| v.len() * size_of::<Link>()).sum();
        let in_links: usize = self.incoming.iter().map(|v| v.len() * size_of::<Link>()).sum();
        let edge_mem = self.edges.len() * (size_of::<EdgeRecord>() + 32);

        nodes_mem + out_links + in_links + edge_mem
    }

    // --- crate-internal access used by the algorithms ---

    pub(crate) fn index_of<Q>(&self, node: &Q) -> Option<NodeIx>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(node).copied()
    }

    /// Resolve a caller-supplied node or fail with `NodeNotFound`.
    pub(crate) fn require<Q>(&self, node: &Q) -> Result<NodeIx>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        self.index_of(node)
            .ok_or_else(|| GraphError::node_not_found(node))
    }

    pub(crate) fn node_at(&self, ix: NodeIx) -> &N {
        &self.nodes[ix]
    }

    pub(crate) fn out_links(&self, ix: NodeIx) -> &[Link] {
        &self.outgoing[ix]
    }

    pub(crate) fn in_links(&self, ix: NodeIx) -> &[Link] {
        &self.incoming[ix]
    }

    pub(crate) fn edge_records(&self) -> &[EdgeRecord] {
        &self.edges
    }

    fn intern(&mut self, node: N) -> NodeIx {
        if let Some(&ix) = self.index.get(&node) {
            return ix;
        }
        let ix = self.nodes.len();
        self.index.insert(node.clone(), ix);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        ix
    }

    fn slot_key(&self, u: NodeIx, v: NodeIx) -> (NodeIx, NodeIx) {
        if self.directed {
            (u, v)
        } else {
            (u.min(v), u.max(v))
        }
    }

    fn push_link(&mut self, u: NodeIx, v: NodeIx, weight: f64) {
        self.outgoing[u].push(Link { target: v, weight });
        self.incoming[v].push(Link { target: u, weight });
    }

    fn update_link(&mut self, u: NodeIx, v: NodeIx, weight: f64) {
        if let Some(link) = self.outgoing[u].iter_mut().find(|l| l.target == v) {
            link.weight = weight;
        }
        if let Some(link) = self.incoming[v].iter_mut().find(|l| l.target == u) {
            link.weight = weight;
        }
    }
}

impl<N: NodeKey> Default for Graph<N> {
    fn default() -> Self {
        Self::undirected()
    }
}

/// One line per node: `A -> B (1), C (2)`.
impl<N: NodeKey> fmt::Display for Graph<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ix, node) in self.nodes.iter().enumerate() {
            write!(f, "{} ->", node)?;
            for (i, arc) in self.outgoing[ix].iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{}{} ({})", sep, self.nodes[arc.target], arc.weight)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undirected(edges: &[(&str, &str, f64)]) -> Graph<String> {
        Graph::from_edges(false, edges.iter().copied()).unwrap()
    }

    fn directed(edges: &[(&str, &str, f64)]) -> Graph<String> {
        Graph::from_edges(true, edges.iter().copied()).unwrap()
    }

    #[test]
    fn test_add_node_idempotent() {
        let mut g: Graph<String> = Graph::directed();
        g.add_node("A");
        g.add_node("B");
        g.add_node("A");
        assert_eq!(g.nodes(), &["A".to_string(), "B".to_string()]);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_add_edge_adds_endpoints() {
        let g = directed(&[("A", "B", 1.0)]);
        assert!(g.contains("A"));
        assert!(g.contains("B"));
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_undirected_mirror() {
        let g = undirected(&[("A", "B", 3.0)]);
        assert_eq!(g.weight("A", "B"), Some(3.0));
        assert_eq!(g.weight("B", "A"), Some(3.0));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_directed_no_mirror() {
        let g = directed(&[("A", "B", 3.0)]);
        assert_eq!(g.weight("A", "B"), Some(3.0));
        assert_eq!(g.weight("B", "A"), None);
    }

    #[test]
    fn test_overwrite_directed() {
        let g = directed(&[("A", "B", 3.0), ("A", "C", 1.0), ("A", "B", 7.0)]);
        assert_eq!(g.weight("A", "B"), Some(7.0));
        assert_eq!(g.edge_count(), 2);
        // Overwrite keeps the original neighbor position.
        let neighbors: Vec<_> = g.neighbors("A").into_iter().map(|(n, w)| (n.as_str(), w)).collect();
        assert_eq!(neighbors, vec![("B", 7.0), ("C", 1.0)]);
    }

    #[test]
    fn test_overwrite_undirected_reverse_orientation() {
        let g = undirected(&[("A", "B", 3.0), ("B", "A", 5.0)]);
        assert_eq!(g.weight("A", "B"), Some(5.0));
        assert_eq!(g.weight("B", "A"), Some(5.0));
        let edges = g.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, "A");
        assert_eq!(edges[0].to, "B");
        assert_eq!(edges[0].weight, 5.0);
    }

    #[test]
    fn test_directed_both_orientations_are_distinct() {
        let g = directed(&[("A", "B", 1.0), ("B", "A", 2.0)]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.weight("B", "A"), Some(2.0));
    }

    #[test]
    fn test_neighbors_insertion_order() {
        let g = undirected(&[("A", "C", 1.0), ("A", "B", 2.0), ("D", "A", 3.0)]);
        let order: Vec<&str> = g.neighbors("A").into_iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "D"]);
    }

    #[test]
    fn test_neighbors_unknown_node() {
        let g = undirected(&[("A", "B", 1.0)]);
        assert_eq!(g.neighbors("Z").len(), 0);
        assert_eq!(g.weight("A", "Z"), None);
    }

    #[test]
    fn test_edges_dedup_first_orientation() {
        let g = undirected(&[("A", "B", 1.0), ("C", "B", 2.0), ("B", "C", 4.0)]);
        let edges: Vec<(String, String, f64)> = g
            .edges()
            .into_iter()
            .map(|e| (e.from, e.to, e.weight))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("A".into(), "B".into(), 1.0),
                ("C".into(), "B".into(), 4.0),
            ]
        );
    }

    #[test]
    fn test_undirected_self_loop_stored_once() {
        let g = undirected(&[("A", "A", 2.0)]);
        assert_eq!(g.neighbors("A").len(), 1);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let mut g: Graph<String> = Graph::directed();
        let err = g.add_edge("A", "B", f64::NAN).unwrap_err();
        assert!(matches!(err, GraphError::InvalidWeight { .. }));
        let err = g.add_edge("A", "B", f64::INFINITY).unwrap_err();
        assert!(matches!(err, GraphError::InvalidWeight { .. }));
        // Nothing was added.
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn test_negative_weight_detection() {
        let g = directed(&[("A", "B", 1.0), ("B", "C", -2.0)]);
        assert!(g.has_negative_weight());
        let e = g.first_negative_edge().unwrap();
        assert_eq!((e.from.as_str(), e.to.as_str(), e.weight), ("B", "C", -2.0));
    }

    #[test]
    fn test_integer_nodes() {
        let g: Graph<u64> = Graph::from_edges(false, vec![(1u64, 2u64, 1.5), (2, 3, 2.5)]).unwrap();
        assert_eq!(g.nodes(), &[1u64, 2, 3]);
        assert_eq!(g.weight(&3u64, &2u64), Some(2.5));
    }

    #[test]
    fn test_display() {
        let g = directed(&[("A", "B", 1.0), ("A", "C", 2.0)]);
        let text = g.to_string();
        assert_eq!(text, "A -> B (1), C (2)\nB ->\nC ->\n");
    }

    #[test]
    fn test_memory_usage_nonzero() {
        let g = undirected(&[("A", "B", 1.0)]);
        assert!(g.memory_usage() > 0);
    }
}
