use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::distance::{index_nodes, serialize_distance_map, Distance, DistanceTable};
use crate::graph::{Graph, NodeKey};

/// All-pairs distances, row-major over the graph's node order.
#[derive(Debug, Clone)]
pub struct AllPairsTable<N> {
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    matrix: Vec<Distance>,
}

impl<N: PartialEq> PartialEq for AllPairsTable<N> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.matrix == other.matrix
    }
}

impl<N: NodeKey> AllPairsTable<N> {
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Distance from `from` to `to`; `None` if either node is unknown.
    pub fn get<Q>(&self, from: &Q, to: &Q) -> Option<Distance>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.position(from)?;
        let j = self.position(to)?;
        Some(self.matrix[i * self.nodes.len() + j])
    }

    /// The row for `from`, as a single-source table.
    pub fn row<Q>(&self, from: &Q) -> Option<DistanceTable<N>>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.position(from)?;
        let n = self.nodes.len();
        Some(DistanceTable::new(
            self.nodes[i].clone(),
            self.nodes.clone(),
            self.matrix[i * n..(i + 1) * n].to_vec(),
        ))
    }

    /// `dist[i][i]` for every node, in node order.
    pub fn diagonal(&self) -> impl Iterator<Item = (&N, Distance)> + '_ {
        let n = self.nodes.len();
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, node)| (node, self.matrix[i * n + i]))
    }

    /// Nodes that lie on a negative cycle (negative diagonal entry).
    pub fn negative_cycle_nodes(&self) -> Vec<&N> {
        self.diagonal()
            .filter(|(_, d)| *d < Distance::ZERO)
            .map(|(node, _)| node)
            .collect()
    }

    /// Floyd-Warshall never fails on negative cycles; this is the explicit check.
    pub fn has_negative_cycle(&self) -> bool {
        self.diagonal().any(|(_, d)| d < Distance::ZERO)
    }

    fn position<Q>(&self, node: &Q) -> Option<usize>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(node).copied()
    }
}

struct Row<'a, N> {
    nodes: &'a [N],
    distances: &'a [Distance],
}

impl<N: Serialize> Serialize for Row<'_, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_distance_map(self.nodes, self.distances, serializer)
    }
}

/// `{from: {to: distance, ..}, ..}`
impl<N: Serialize> Serialize for AllPairsTable<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = self.nodes.len();
        let mut map = serializer.serialize_map(Some(n))?;
        for (i, node) in self.nodes.iter().enumerate() {
            map.serialize_entry(
                node,
                &Row {
                    nodes: &self.nodes,
                    distances: &self.matrix[i * n..(i + 1) * n],
                },
            )?;
        }
        map.end()
    }
}

/// All-pairs shortest paths by dynamic programming over intermediate nodes.
///
/// O(V³) time, O(V²) space; callers bound cost by bounding graph size.
/// Negative cycles do not fail the call: they surface as negative diagonal
/// entries, see [`AllPairsTable::has_negative_cycle`].
#[tracing::instrument(level = "debug", skip_all, fields(nodes = graph.node_count()))]
pub fn floyd_warshall<N: NodeKey>(graph: &Graph<N>) -> AllPairsTable<N> {
    let n = graph.node_count();
    let mut dist = vec![Distance::Unreached; n * n];

    for i in 0..n {
        for link in graph.out_links(i) {
            dist[i * n + link.target] = Distance::Finite(link.weight);
        }
    }
    // Zero diagonal wins over a positive self-loop; a negative self-loop is
    // itself a negative cycle and is kept.
    for i in 0..n {
        if !(dist[i * n + i] < Distance::ZERO) {
            dist[i * n + i] = Distance::ZERO;
        }
    }

    for k in 0..n {
        for i in 0..n {
            let ik = dist[i * n + k];
            if !ik.is_reached() {
                continue;
            }
            for j in 0..n {
                let through = ik + dist[k * n + j];
                if through < dist[i * n + j] {
                    dist[i * n + j] = through;
                }
            }
        }
    }

    let table = AllPairsTable {
        nodes: graph.nodes().to_vec(),
        index: index_nodes(graph.nodes()),
        matrix: dist,
    };
    if table.has_negative_cycle() {
        tracing::debug!(
            nodes = table.negative_cycle_nodes().len(),
            "floyd-warshall: negative diagonal entries"
        );
    }
    table
}
