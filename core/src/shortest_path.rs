use std::borrow::Borrow;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt::Display;
use std::hash::Hash;

use crate::config::{EngineConfig, NegativeWeightPolicy, Selection};
use crate::distance::{Distance, DistanceTable};
use crate::error::{GraphError, Result};
use crate::graph::{Graph, NodeIx, NodeKey};

/// Single-source shortest paths on a graph with non-negative weights.
///
/// Uses the default [`EngineConfig`]: linear-scan selection, negative
/// weights rejected.
pub fn dijkstra<N, Q>(graph: &Graph<N>, start: &Q) -> Result<DistanceTable<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    dijkstra_with(graph, start, &EngineConfig::default())
}

/// Dijkstra with explicit configuration.
///
/// The whole graph is checked for negative weights before any relaxation.
/// Under [`NegativeWeightPolicy::Reject`] that fails with `NegativeWeight`;
/// under [`NegativeWeightPolicy::BellmanFord`] the request is answered by
/// [`bellman_ford`] instead (which may in turn report a negative cycle).
///
/// Selection always settles the unvisited node with the smallest finite
/// tentative distance, ties going to the node inserted first.
#[tracing::instrument(level = "debug", skip_all, fields(start = %start, nodes = graph.node_count(), selection = ?config.selection))]
pub fn dijkstra_with<N, Q>(graph: &Graph<N>, start: &Q, config: &EngineConfig) -> Result<DistanceTable<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    let source = graph.require(start)?;

    if let Some(edge) = graph.first_negative_edge() {
        match config.negative_weights {
            NegativeWeightPolicy::Reject => {
                tracing::debug!(from = %edge.from, to = %edge.to, weight = edge.weight, "negative weight rejected");
                return Err(GraphError::NegativeWeight {
                    from: edge.from.to_string(),
                    to: edge.to.to_string(),
                    weight: edge.weight,
                });
            }
            NegativeWeightPolicy::BellmanFord => {
                tracing::warn!(from = %edge.from, to = %edge.to, weight = edge.weight, "negative weight, routing to bellman-ford");
                return bellman_ford(graph, start);
            }
        }
    }

    let dist = match config.selection {
        Selection::LinearScan => dijkstra_linear(graph, source),
        Selection::BinaryHeap => dijkstra_heap(graph, source),
    };

    tracing::debug!(
        reached = dist.iter().filter(|d| d.is_reached()).count(),
        "dijkstra complete"
    );
    Ok(DistanceTable::new(
        graph.node_at(source).clone(),
        graph.nodes().to_vec(),
        dist,
    ))
}

fn dijkstra_linear<N: NodeKey>(graph: &Graph<N>, source: NodeIx) -> Vec<Distance> {
    let n = graph.node_count();
    let mut dist = vec![Distance::Unreached; n];
    let mut settled = vec![false; n];
    dist[source] = Distance::ZERO;

    loop {
        // Strict `<` keeps the first node in insertion order on ties.
        let mut best: Option<NodeIx> = None;
        for ix in 0..n {
            if settled[ix] || !dist[ix].is_reached() {
                continue;
            }
            if best.map_or(true, |b| dist[ix] < dist[b]) {
                best = Some(ix);
            }
        }
        let Some(current) = best else { break };

        settled[current] = true;
        relax_outgoing(graph, current, &mut dist, &settled, |_, _| {});
    }

    dist
}

/// Min-heap entry ordered by (distance, node position).
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist: f64,
    node: NodeIx,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.node.cmp(&other.node))
    }
}

/// Lazy-deletion heap variant. Popping by (distance, position) settles nodes
/// in the same order as the linear scan, so the tables are identical.
fn dijkstra_heap<N: NodeKey>(graph: &Graph<N>, source: NodeIx) -> Vec<Distance> {
    let n = graph.node_count();
    let mut dist = vec![Distance::Unreached; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    dist[source] = Distance::ZERO;
    heap.push(Reverse(HeapEntry {
        dist: 0.0,
        node: source,
    }));

    while let Some(Reverse(entry)) = heap.pop() {
        if settled[entry.node] {
            continue;
        }
        settled[entry.node] = true;
        relax_outgoing(graph, entry.node, &mut dist, &settled, |node, d| {
            heap.push(Reverse(HeapEntry { dist: d, node }));
        });
    }

    dist
}

fn relax_outgoing<N: NodeKey>(
    graph: &Graph<N>,
    current: NodeIx,
    dist: &mut [Distance],
    settled: &[bool],
    mut on_improve: impl FnMut(NodeIx, f64),
) {
    let base = dist[current];
    for link in graph.out_links(current) {
        if settled[link.target] {
            continue;
        }
        let candidate = base.plus(link.weight);
        if candidate < dist[link.target] {
            dist[link.target] = candidate;
            if let Distance::Finite(d) = candidate {
                on_improve(link.target, d);
            }
        }
    }
}

/// Single-source shortest paths allowing negative weights.
///
/// Runs exactly `|V| - 1` full passes over the logical edge list, then one
/// detection pass. Undirected edges relax in both orientations, stored
/// orientation first. Any relaxation in the detection pass means a negative
/// cycle is reachable from `start` and fails with `NegativeCycle`; nodes that
/// cannot be reached are reported as `Unreached`, never as an error.
#[tracing::instrument(level = "debug", skip_all, fields(start = %start, nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn bellman_ford<N, Q>(graph: &Graph<N>, start: &Q) -> Result<DistanceTable<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    let source = graph.require(start)?;
    let n = graph.node_count();

    let mut dist = vec![Distance::Unreached; n];
    dist[source] = Distance::ZERO;

    for _ in 1..n {
        relax_all(graph, &mut dist);
    }

    if let Some((from, to)) = find_relaxable(graph, &dist) {
        tracing::debug!(from = %graph.node_at(from), to = %graph.node_at(to), "negative cycle detected");
        return Err(GraphError::NegativeCycle {
            start: graph.node_at(source).to_string(),
            from: graph.node_at(from).to_string(),
            to: graph.node_at(to).to_string(),
        });
    }

    tracing::debug!(
        reached = dist.iter().filter(|d| d.is_reached()).count(),
        "bellman-ford complete"
    );
    Ok(DistanceTable::new(
        graph.node_at(source).clone(),
        graph.nodes().to_vec(),
        dist,
    ))
}

/// Every arc implied by the logical edge list, in relaxation order.
pub(crate) fn arcs<N: NodeKey>(graph: &Graph<N>) -> impl Iterator<Item = (NodeIx, NodeIx, f64)> + '_ {
    let mirrored = !graph.is_directed();
    graph.edge_records().iter().flat_map(move |e| {
        let forward = Some((e.from, e.to, e.weight));
        let backward = (mirrored && e.from != e.to).then_some((e.to, e.from, e.weight));
        forward.into_iter().chain(backward)
    })
}

fn relax_all<N: NodeKey>(graph: &Graph<N>, dist: &mut [Distance]) {
    for (u, v, w) in arcs(graph) {
        let candidate = dist[u].plus(w);
        if candidate < dist[v] {
            dist[v] = candidate;
        }
    }
}

fn find_relaxable<N: NodeKey>(graph: &Graph<N>, dist: &[Distance]) -> Option<(NodeIx, NodeIx)> {
    arcs(graph)
        .find(|&(u, v, w)| dist[u].plus(w) < dist[v])
        .map(|(u, v, _)| (u, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directed(edges: &[(&str, &str, f64)]) -> Graph<String> {
        Graph::from_edges(true, edges.iter().copied()).unwrap()
    }

    fn undirected(edges: &[(&str, &str, f64)]) -> Graph<String> {
        Graph::from_edges(false, edges.iter().copied()).unwrap()
    }

    fn neg_demo() -> Graph<String> {
        directed(&[
            ("A", "B", 4.0),
            ("A", "C", 2.0),
            ("B", "C", -1.0),
            ("B", "D", 2.0),
            ("C", "D", 3.0),
            ("C", "E", -2.0),
            ("E", "D", 1.0),
        ])
    }

    fn dist(table: &DistanceTable<String>, node: &str) -> Option<f64> {
        table.get(node).and_then(Distance::value)
    }

    // --- Dijkstra ---

    #[test]
    fn test_dijkstra_basic() {
        let g = undirected(&[("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 5.0)]);
        let table = dijkstra(&g, "A").unwrap();
        assert_eq!(table.source(), "A");
        assert_eq!(dist(&table, "A"), Some(0.0));
        assert_eq!(dist(&table, "B"), Some(1.0));
        assert_eq!(dist(&table, "C"), Some(3.0));
    }

    #[test]
    fn test_dijkstra_unreached() {
        let g = directed(&[("A", "B", 1.0), ("C", "A", 1.0)]);
        let table = dijkstra(&g, "A").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("C"), Some(Distance::Unreached));
    }

    #[test]
    fn test_dijkstra_negative_weight_rejected() {
        let err = dijkstra(&neg_demo(), "A").unwrap_err();
        assert_eq!(
            err,
            GraphError::NegativeWeight {
                from: "B".into(),
                to: "C".into(),
                weight: -1.0
            }
        );
    }

    #[test]
    fn test_dijkstra_negative_weight_unreachable_still_rejected() {
        // Validation covers the whole graph, not just the reachable part.
        let g = directed(&[("A", "B", 1.0), ("X", "Y", -1.0)]);
        assert!(matches!(dijkstra(&g, "A"), Err(GraphError::NegativeWeight { .. })));
    }

    #[test]
    fn test_dijkstra_routes_to_bellman_ford() {
        let config = EngineConfig::default().with_negative_weights(NegativeWeightPolicy::BellmanFord);
        let table = dijkstra_with(&neg_demo(), "A", &config).unwrap();
        assert_eq!(table, bellman_ford(&neg_demo(), "A").unwrap());
    }

    #[test]
    fn test_dijkstra_start_not_in_graph() {
        let g = directed(&[("A", "B", 1.0)]);
        assert_eq!(
            dijkstra(&g, "Z").unwrap_err(),
            GraphError::NodeNotFound { node: "Z".into() }
        );
    }

    #[test]
    fn test_dijkstra_zero_weight_edges() {
        let g = directed(&[("A", "B", 0.0), ("B", "C", 0.0), ("C", "A", 0.0)]);
        let table = dijkstra(&g, "A").unwrap();
        assert!(table.iter().all(|(_, d)| d == Distance::ZERO));
    }

    #[test]
    fn test_dijkstra_heap_matches_linear() {
        let g = undirected(&[
            ("A", "B", 2.0),
            ("A", "C", 2.0),
            ("B", "D", 1.0),
            ("C", "D", 1.0),
            ("D", "E", 4.0),
            ("B", "E", 7.0),
        ]);
        let linear = dijkstra(&g, "A").unwrap();
        let heap = dijkstra_with(
            &g,
            "A",
            &EngineConfig::default().with_selection(Selection::BinaryHeap),
        )
        .unwrap();
        assert_eq!(linear, heap);
        assert_eq!(dist(&heap, "E"), Some(7.0));
    }

    #[test]
    fn test_heap_entry_ordering() {
        let a = HeapEntry { dist: 1.0, node: 3 };
        let b = HeapEntry { dist: 1.0, node: 1 };
        let c = HeapEntry { dist: 0.5, node: 9 };
        assert_eq!(a.cmp(&b), Ordering::Greater);
        assert_eq!(c.cmp(&b), Ordering::Less);
        assert_eq!(a, a);
    }

    // --- Bellman-Ford ---

    #[test]
    fn test_bellman_ford_negative_demo() {
        let table = bellman_ford(&neg_demo(), "A").unwrap();
        // D is reached through A -> C -> E -> D = 2 - 2 + 1.
        let expected = [("A", 0.0), ("B", 4.0), ("C", 2.0), ("D", 1.0), ("E", 0.0)];
        for (node, d) in expected {
            assert_eq!(dist(&table, node), Some(d), "distance to {}", node);
        }
    }

    #[test]
    fn test_bellman_ford_negative_cycle() {
        let g = directed(&[("A", "B", 1.0), ("B", "C", -2.0), ("C", "B", 1.0)]);
        let err = bellman_ford(&g, "A").unwrap_err();
        assert!(matches!(err, GraphError::NegativeCycle { ref start, .. } if start == "A"));
    }

    #[test]
    fn test_bellman_ford_unreachable_negative_cycle_ignored() {
        // The cycle X <-> Y is not reachable from A.
        let g = directed(&[("A", "B", 1.0), ("X", "Y", -2.0), ("Y", "X", 1.0)]);
        let table = bellman_ford(&g, "A").unwrap();
        assert_eq!(dist(&table, "B"), Some(1.0));
        assert_eq!(table.get("X"), Some(Distance::Unreached));
    }

    #[test]
    fn test_bellman_ford_undirected_negative_edge_is_cycle() {
        let g = undirected(&[("A", "B", 1.0), ("B", "C", -1.0)]);
        assert!(matches!(bellman_ford(&g, "A"), Err(GraphError::NegativeCycle { .. })));
    }

    #[test]
    fn test_bellman_ford_undirected_relaxes_both_ways() {
        // Edge stored as C-B but must be usable as B -> C.
        let g = undirected(&[("A", "B", 1.0), ("C", "B", 2.0)]);
        let table = bellman_ford(&g, "A").unwrap();
        assert_eq!(dist(&table, "C"), Some(3.0));
    }

    #[test]
    fn test_bellman_ford_single_node() {
        let mut g: Graph<String> = Graph::directed();
        g.add_node("A");
        let table = bellman_ford(&g, "A").unwrap();
        assert_eq!(table.get("A"), Some(Distance::ZERO));
    }

    #[test]
    fn test_bellman_ford_start_not_in_graph() {
        assert!(matches!(
            bellman_ford(&neg_demo(), "Q"),
            Err(GraphError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_dijkstra_matches_bellman_ford_non_negative() {
        let g = undirected(&[
            ("Rennes", "Nantes", 45.0),
            ("Rennes", "Paris", 110.0),
            ("Nantes", "Paris", 80.0),
            ("Paris", "Lille", 70.0),
            ("Paris", "Dijon", 60.0),
            ("Dijon", "Lyon", 70.0),
            ("Lille", "Dijon", 120.0),
        ]);
        for start in g.nodes() {
            let d = dijkstra(&g, start.as_str()).unwrap();
            let b = bellman_ford(&g, start.as_str()).unwrap();
            assert_eq!(d, b, "tables differ from {}", start);
        }
    }
}
