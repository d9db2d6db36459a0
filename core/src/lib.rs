//! graph-algos-core: In-memory weighted graph engine.
//!
//! A pure Rust library that stores a weighted, directed or undirected graph
//! and answers traversal, shortest-path, and minimum-spanning-tree queries
//! over it. Every algorithm borrows the graph immutably and returns a
//! self-contained, serializable result.
//!
//! ```
//! use graph_algos_core::{dijkstra, shortest_path, Distance, Graph};
//!
//! let graph: Graph<String> =
//!     Graph::from_edges(false, vec![("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 5.0)])?;
//!
//! let table = dijkstra(&graph, "A")?;
//! assert_eq!(table.get("C"), Some(Distance::Finite(3.0)));
//!
//! let path = shortest_path(&graph, "A", "C")?;
//! assert_eq!(path.nodes, vec!["A", "B", "C"]);
//! # Ok::<(), graph_algos_core::GraphError>(())
//! ```
//!
//! Library code never prints; it emits `tracing` spans and events and leaves
//! subscriber setup to the embedding binary.

mod all_pairs;
mod config;
mod distance;
mod error;
mod graph;
mod path;
mod shortest_path;
mod spanning_tree;
mod traversal;
mod union_find;

pub use all_pairs::{floyd_warshall, AllPairsTable};
pub use config::{EngineConfig, NegativeWeightPolicy, Selection};
pub use distance::{Distance, DistanceTable};
pub use error::{GraphError, Result};
pub use graph::{Edge, Graph, NodeKey};
pub use path::{backtrace, reconstruct_path, shortest_path, shortest_path_with, Path};
pub use shortest_path::{bellman_ford, dijkstra, dijkstra_with};
pub use spanning_tree::{kruskal, prim, prim_with, SpanningTree};
pub use traversal::{bfs, dfs};
