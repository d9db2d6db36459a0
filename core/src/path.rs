use std::borrow::Borrow;
use std::fmt::Display;
use std::hash::Hash;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::distance::{Distance, DistanceTable};
use crate::error::Result;
use crate::graph::{Graph, NodeIx, NodeKey};
use crate::shortest_path::{arcs, dijkstra_with};

/// A concrete route: nodes from source to target inclusive, and its cost.
///
/// Unreachable targets give an empty node list with `Unreached` cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path<N> {
    pub nodes: Vec<N>,
    pub cost: Distance,
}

impl<N> Path<N> {
    pub fn unreachable() -> Self {
        Self {
            nodes: Vec::new(),
            cost: Distance::Unreached,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Consecutive `(from, to)` pairs along the path.
    pub fn hops(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.nodes.windows(2).map(|w| (&w[0], &w[1]))
    }
}

/// Distances in the graph's node order, whatever order the table uses.
fn aligned_distances<N: NodeKey>(graph: &Graph<N>, table: &DistanceTable<N>) -> Vec<Distance> {
    if table.nodes() == graph.nodes() {
        return table.distances().to_vec();
    }
    graph
        .nodes()
        .iter()
        .map(|n| table.get(n).unwrap_or(Distance::Unreached))
        .collect()
}

/// Labels in `table` only describe routes from the table's own source.
fn measured_from<N: NodeKey>(graph: &Graph<N>, table: &DistanceTable<N>, source: NodeIx) -> bool {
    if graph.index_of(table.source()) == Some(source) {
        return true;
    }
    tracing::debug!(
        table_source = %table.source(),
        requested = %graph.node_at(source),
        "distance table was computed from a different source"
    );
    false
}

/// Walk predecessor labels back from `target`.
///
/// `u` is a valid predecessor of `x` when the arc `u -> x` exists and
/// `dist[u] + w` matches `dist[x]` within the configured tolerance. Among
/// several, the one with the smallest `dist[u]` wins (first incoming arc on
/// ties). Nodes already on the partial path are skipped. Gives up after
/// `node_count + backtrace_margin` steps.
fn backtrace_positions<N: NodeKey>(
    graph: &Graph<N>,
    dist: &[Distance],
    source: NodeIx,
    target: NodeIx,
    config: &EngineConfig,
) -> Option<Vec<NodeIx>> {
    let mut route = vec![target];
    let mut on_route = vec![false; graph.node_count()];
    on_route[target] = true;
    let mut current = target;

    for _ in 0..graph.node_count() + config.backtrace_margin {
        if current == source {
            route.reverse();
            return Some(route);
        }
        let here = dist[current].value()?;

        let mut best: Option<(NodeIx, f64)> = None;
        for link in graph.in_links(current) {
            let pred = link.target;
            if on_route[pred] {
                continue;
            }
            let Some(d) = dist[pred].value() else {
                continue;
            };
            if (d + link.weight - here).abs() > config.path_tolerance {
                continue;
            }
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((pred, d));
            }
        }

        let (pred, _) = best?;
        on_route[pred] = true;
        route.push(pred);
        current = pred;
    }

    None
}

/// Label-correcting search that records parent pointers, independent of any
/// precomputed table. Used when the backtrace cannot close the route.
fn predecessor_search<N: NodeKey>(
    graph: &Graph<N>,
    source: NodeIx,
    target: NodeIx,
) -> Option<Vec<NodeIx>> {
    let n = graph.node_count();
    let mut dist = vec![Distance::Unreached; n];
    let mut parent: Vec<Option<NodeIx>> = vec![None; n];
    dist[source] = Distance::ZERO;

    for _ in 1..n.max(2) {
        let mut changed = false;
        for (u, v, w) in arcs(graph) {
            let candidate = dist[u].plus(w);
            if candidate < dist[v] {
                dist[v] = candidate;
                parent[v] = Some(u);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    if !dist[target].is_reached() {
        return None;
    }

    let mut route = vec![target];
    let mut seen = vec![false; n];
    seen[target] = true;
    let mut current = target;
    while current != source {
        let prev = parent[current]?;
        if seen[prev] {
            return None;
        }
        seen[prev] = true;
        route.push(prev);
        current = prev;
    }
    route.reverse();
    Some(route)
}

/// The fast strategy alone: backtrace over `table`, no fallback.
///
/// `None` if either node is unknown, `table` was computed from a node other
/// than `source`, the target is unreached, or the labels do not close a
/// route back to `source`.
pub fn backtrace<N, Q>(
    graph: &Graph<N>,
    table: &DistanceTable<N>,
    source: &Q,
    target: &Q,
    config: &EngineConfig,
) -> Option<Vec<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    let s = graph.index_of(source)?;
    let t = graph.index_of(target)?;
    if !measured_from(graph, table, s) {
        return None;
    }
    let dist = aligned_distances(graph, table);
    backtrace_positions(graph, &dist, s, t, config)
        .map(|route| route.into_iter().map(|ix| graph.node_at(ix).clone()).collect())
}

/// Turn a distance table into a concrete route from `source` to `target`.
///
/// Tries the backtrace first and falls back to an independent predecessor
/// search, so a finite target distance yields a non-empty route. The cost is
/// the table's distance for `target`. Unknown or unreached targets, and a
/// table computed from a node other than `source`, give [`Path::unreachable`].
#[tracing::instrument(level = "debug", skip_all, fields(source = %source, target = %target))]
pub fn reconstruct_path<N, Q>(
    graph: &Graph<N>,
    table: &DistanceTable<N>,
    source: &Q,
    target: &Q,
    config: &EngineConfig,
) -> Path<N>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    let (Some(s), Some(t)) = (graph.index_of(source), graph.index_of(target)) else {
        return Path::unreachable();
    };
    if !measured_from(graph, table, s) {
        return Path::unreachable();
    }
    let dist = aligned_distances(graph, table);
    let cost = dist[t];
    if !cost.is_reached() {
        return Path::unreachable();
    }

    let route = match backtrace_positions(graph, &dist, s, t, config) {
        Some(route) => route,
        None => {
            tracing::debug!("backtrace did not close, using predecessor search");
            match predecessor_search(graph, s, t) {
                Some(route) => route,
                None => {
                    tracing::warn!("no route found for a finite distance label");
                    return Path::unreachable();
                }
            }
        }
    };

    Path {
        nodes: route.into_iter().map(|ix| graph.node_at(ix).clone()).collect(),
        cost,
    }
}

/// Least-cost route between two nodes with the default configuration.
pub fn shortest_path<N, Q>(graph: &Graph<N>, source: &Q, target: &Q) -> Result<Path<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    shortest_path_with(graph, source, target, &EngineConfig::default())
}

/// Dijkstra (under the configured negative-weight policy) followed by
/// [`reconstruct_path`]. Both endpoints must exist.
pub fn shortest_path_with<N, Q>(
    graph: &Graph<N>,
    source: &Q,
    target: &Q,
    config: &EngineConfig,
) -> Result<Path<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    graph.require(target)?;
    let table = dijkstra_with(graph, source, config)?;
    Ok(reconstruct_path(graph, &table, source, target, config))
}
