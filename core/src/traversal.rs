use std::borrow::Borrow;
use std::collections::VecDeque;
use std::fmt::Display;
use std::hash::Hash;

use crate::error::Result;
use crate::graph::{Graph, NodeKey};

/// Breadth-first visitation order from `start`.
///
/// Each node is visited at most once; neighbors are explored in insertion
/// order. The result is exactly the set of nodes reachable from `start`.
/// Nodes are marked on enqueue, which yields the same order as marking on
/// dequeue with a FIFO frontier.
#[tracing::instrument(level = "debug", skip_all, fields(start = %start, nodes = graph.node_count()))]
pub fn bfs<N, Q>(graph: &Graph<N>, start: &Q) -> Result<Vec<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    let start = graph.require(start)?;

    let mut visited = vec![false; graph.node_count()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut order = Vec::new();

    visited[start] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        order.push(graph.node_at(current).clone());
        for link in graph.out_links(current) {
            if !visited[link.target] {
                visited[link.target] = true;
                queue.push_back(link.target);
            }
        }
    }

    tracing::debug!(visited = order.len(), "bfs complete");
    Ok(order)
}

/// Depth-first pre-order from `start`.
///
/// Iterative, with neighbors pushed in reverse so the first neighbor is
/// explored first; the order matches the recursive formulation and deep
/// chains cannot overflow the call stack.
#[tracing::instrument(level = "debug", skip_all, fields(start = %start, nodes = graph.node_count()))]
pub fn dfs<N, Q>(graph: &Graph<N>, start: &Q) -> Result<Vec<N>>
where
    N: NodeKey + Borrow<Q>,
    Q: Hash + Eq + Display + ?Sized,
{
    let start = graph.require(start)?;

    let mut visited = vec![false; graph.node_count()];
    let mut stack = vec![start];
    let mut order = Vec::new();

    while let Some(current) = stack.pop() {
        if visited[current] {
            continue;
        }
        visited[current] = true;
        order.push(graph.node_at(current).clone());

        for link in graph.out_links(current).iter().rev() {
            if !visited[link.target] {
                stack.push(link.target);
            }
        }
    }

    tracing::debug!(visited = order.len(), "dfs complete");
    Ok(order)
}
