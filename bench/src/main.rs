use graph_algos_core::{
    bellman_ford, bfs, dfs, dijkstra_with, floyd_warshall, kruskal, prim, reconstruct_path,
    AllPairsTable, DistanceTable, EngineConfig, Graph, GraphError, NodeKey, Path, Selection,
    SpanningTree,
};
use serde::Serialize;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Floyd-Warshall is O(V³); above this many nodes it is skipped.
const FLOYD_NODE_CAP: usize = 400;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&str> = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with("--") || a.as_str() == "--help")
        .map(|s| s.as_str())
        .collect();

    let mode = positional.first().copied().unwrap_or("all");
    let node_count: u64 = positional
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: graph-algos-bench [mode] [node_count] [--json]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and both sample graphs (default)");
        println!("  tree        Random tree, one parent per node (unique paths)");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  random      Erdos-Renyi uniform random edges");
        println!("  barbell     Two dense cliques connected by a thin bridge");
        println!("  grid        Square lattice (many equal-cost paths)");
        println!("  routes      French road sample (undirected, km)");
        println!("  negdemo     Directed sample with negative weights");
        println!();
        println!("Default node_count: 2000. Floyd-Warshall is skipped above {} nodes.", FLOYD_NODE_CAP);
        println!("Set GRAPH_ALGOS_LOG (e.g. graph_algos_core=debug) for library traces.");
        return;
    }

    let generators: Vec<(&str, fn(u64) -> Graph<u64>)> = match mode {
        "tree" => vec![("Random tree", gen_tree)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "barbell" => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        "grid" => vec![("Grid lattice", gen_grid)],
        "routes" | "negdemo" => vec![],
        "all" => vec![
            ("Random tree", gen_tree as fn(u64) -> Graph<u64>),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("Grid lattice", gen_grid),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    if !json {
        println!("graph-algos-bench");
        println!("=================");
        println!();
    }

    for (name, generator) in generators {
        let t = Instant::now();
        let graph = generator(node_count);
        let gen_ms = elapsed_ms(t);
        run_benchmark(name, &graph, gen_ms, json);
    }

    if matches!(mode, "all" | "routes") {
        match sample_routes() {
            Ok(graph) => run_benchmark("French routes (sample)", &graph, 0.0, json),
            Err(e) => eprintln!("routes sample: {}", e),
        }
    }
    if matches!(mode, "all" | "negdemo") {
        match sample_negative() {
            Ok(graph) => run_benchmark("Negative weights (sample)", &graph, 0.0, json),
            Err(e) => eprintln!("negdemo sample: {}", e),
        }
    }
}

/// Stderr subscriber; `GRAPH_ALGOS_LOG` overrides the default `warn` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("GRAPH_ALGOS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()
        .ok();
}

#[derive(Debug, Serialize)]
struct Timing {
    algorithm: &'static str,
    ms: f64,
    /// Algorithm-specific size of the result (visited, reached, tree edges).
    result: Option<usize>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary<N> {
    graph: String,
    directed: bool,
    nodes: usize,
    edges: usize,
    memory_bytes: usize,
    generate_ms: f64,
    timings: Vec<Timing>,
    path: Option<Path<N>>,
    mst_total_weight: Option<f64>,
    mst_components: Option<usize>,
    negative_cycle: Option<bool>,
}

fn elapsed_ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

/// Run `f`, recording its wall time and outcome.
fn timed<T, E: std::fmt::Display>(
    timings: &mut Vec<Timing>,
    algorithm: &'static str,
    size: impl Fn(&T) -> usize,
    f: impl FnOnce() -> Result<T, E>,
) -> Option<T> {
    let t = Instant::now();
    let result = f();
    let ms = elapsed_ms(t);
    match result {
        Ok(value) => {
            timings.push(Timing {
                algorithm,
                ms,
                result: Some(size(&value)),
                error: None,
            });
            Some(value)
        }
        Err(e) => {
            timings.push(Timing {
                algorithm,
                ms,
                result: None,
                error: Some(e.to_string()),
            });
            None
        }
    }
}

fn run_benchmark<N: NodeKey + Serialize>(name: &str, graph: &Graph<N>, gen_ms: f64, json: bool) {
    let (Some(source), Some(target)) = (graph.nodes().first(), graph.nodes().last()) else {
        eprintln!("{}: empty graph, skipped", name);
        return;
    };

    let linear = EngineConfig::default();
    let heap = EngineConfig::default().with_selection(Selection::BinaryHeap);
    let mut timings = Vec::new();

    timed(&mut timings, "bfs", Vec::len, || bfs(graph, source));
    timed(&mut timings, "dfs", Vec::len, || dfs(graph, source));

    let reached = |t: &DistanceTable<N>| t.reached().count();
    let table = timed(&mut timings, "dijkstra (linear)", reached, || {
        dijkstra_with(graph, source, &linear)
    });
    timed(&mut timings, "dijkstra (heap)", reached, || {
        dijkstra_with(graph, source, &heap)
    });
    let bf_table = timed(&mut timings, "bellman-ford", reached, || {
        bellman_ford(graph, source)
    });

    let mut negative_cycle = None;
    if graph.node_count() <= FLOYD_NODE_CAP {
        let all_pairs = timed(
            &mut timings,
            "floyd-warshall",
            |t: &AllPairsTable<N>| t.nodes().len(),
            || Ok::<_, GraphError>(floyd_warshall(graph)),
        );
        negative_cycle = all_pairs.map(|t| t.has_negative_cycle());
    }

    let forest = timed(&mut timings, "kruskal", SpanningTree::len, || kruskal(graph));
    timed(&mut timings, "prim", SpanningTree::len, || prim(graph, source));

    // Negative weights make the Dijkstra table unavailable; fall back to Bellman-Ford's.
    let path = table.or(bf_table).and_then(|table| {
        timed(
            &mut timings,
            "path reconstruction",
            Path::len,
            || Ok::<_, GraphError>(reconstruct_path(graph, &table, source, target, &linear)),
        )
    });

    let summary = Summary {
        graph: name.to_string(),
        directed: graph.is_directed(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        memory_bytes: graph.memory_usage(),
        generate_ms: gen_ms,
        timings,
        mst_total_weight: forest.as_ref().map(|f| f.total_weight),
        mst_components: forest.as_ref().map(|f| f.component_count),
        path,
        negative_cycle,
    };

    if json {
        match serde_json::to_string(&summary) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("{}: failed to serialize summary: {}", name, e),
        }
    } else {
        print_summary(&summary, source, target);
    }
}

fn print_summary<N: NodeKey>(summary: &Summary<N>, source: &N, target: &N) {
    println!("--- {} ---", summary.graph);
    println!(
        "{} nodes, {} edges, {}, ~{:.2}MB (generated in {:.1}ms)",
        summary.nodes,
        summary.edges,
        if summary.directed { "directed" } else { "undirected" },
        summary.memory_bytes as f64 / 1_048_576.0,
        summary.generate_ms
    );
    println!();
    println!("{:>22} {:>10} {:>10}", "algorithm", "result", "time");
    println!("{:->22} {:->10} {:->10}", "", "", "");
    for t in &summary.timings {
        match (&t.result, &t.error) {
            (Some(size), _) => println!("{:>22} {:>10} {:>8.2}ms", t.algorithm, size, t.ms),
            (None, Some(err)) => println!("{:>22} {:>10} {}", t.algorithm, "error", err),
            (None, None) => println!("{:>22} {:>10}", t.algorithm, "-"),
        }
    }
    if summary.nodes > FLOYD_NODE_CAP {
        println!("{:>22} {:>10}", "floyd-warshall", "skipped");
    }

    println!();
    if let Some(weight) = summary.mst_total_weight {
        println!(
            "Spanning forest: total weight {} across {} component(s)",
            weight,
            summary.mst_components.unwrap_or(0)
        );
    }
    if let Some(cycle) = summary.negative_cycle {
        println!("Negative cycle: {}", if cycle { "yes" } else { "no" });
    }
    match &summary.path {
        Some(p) if !p.is_empty() => println!(
            "Shortest path {} → {}: {} hops, cost {}",
            source,
            target,
            p.len() - 1,
            p.cost
        ),
        _ => println!("Shortest path {} → {}: no path", source, target),
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: all O(n) or O(n + edges), single-threaded, deterministic.
// Every generator builds an undirected graph with integer weights in 1..=100.
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    fn weight(&mut self) -> f64 {
        (self.next(100) + 1) as f64
    }
}

/// Weights are always finite here, so insertion cannot fail.
fn link(graph: &mut Graph<u64>, from: u64, to: u64, weight: f64) {
    if let Err(e) = graph.add_edge(from, to, weight) {
        tracing::warn!(error = %e, "generator produced an invalid edge");
    }
}

/// Random recursive tree: each node attaches to one earlier node.
///
/// Exactly one path between any two nodes; Kruskal and Prim must select every edge.
fn gen_tree(node_count: u64) -> Graph<u64> {
    let mut graph = Graph::with_capacity(false, node_count as usize, node_count as usize);
    let mut rng = FastRng::new(42);

    graph.add_node(0u64);
    for child in 1..node_count {
        let parent = rng.next(child);
        let w = rng.weight();
        link(&mut graph, parent, child, w);
    }

    graph
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Each node connects to its K nearest neighbors on a ring, and each edge
/// is rewired with probability p. High clustering, short path lengths.
fn gen_small_world(node_count: u64) -> Graph<u64> {
    let k = 4u64; // neighbors on each side
    let p = 0.05f64; // rewire probability
    let mut graph = Graph::with_capacity(false, node_count as usize, (node_count * k) as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        graph.add_node(i);
    }

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            let w = rng.weight();

            if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                let to = if rewired != i { rewired } else { neighbor };
                link(&mut graph, i, to, w);
            } else {
                link(&mut graph, i, neighbor, w);
            }
        }
    }

    graph
}

/// Erdos-Renyi: uniform random edges, ~5 per node on average.
///
/// Baseline topology with no structure; may be disconnected.
fn gen_random(node_count: u64) -> Graph<u64> {
    let target_edges = node_count * 5;
    let mut graph = Graph::with_capacity(false, node_count as usize, target_edges as usize);
    let mut rng = FastRng::new(54321);

    for i in 0..node_count {
        graph.add_node(i);
    }

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            let w = rng.weight();
            link(&mut graph, from, to, w);
        }
    }

    graph
}

/// Barbell: two dense clusters connected by a single thin bridge.
///
/// Every source-to-target path crosses the bridge chain.
fn gen_barbell(node_count: u64) -> Graph<u64> {
    let bridge_len = 10u64;
    let cluster_size = (node_count.saturating_sub(bridge_len) / 2).max(2);
    let degree = 8u64.min(cluster_size - 1);
    let mut graph = Graph::with_capacity(false, node_count as usize, (cluster_size * degree * 2 + bridge_len) as usize);
    let mut rng = FastRng::new(99999);

    let mut cluster = |graph: &mut Graph<u64>, offset: u64| {
        for i in 0..cluster_size {
            graph.add_node(offset + i);
        }
        for i in 0..cluster_size {
            for _ in 0..degree {
                let target = rng.next(cluster_size);
                if target != i {
                    let w = rng.weight();
                    link(graph, offset + i, offset + target, w);
                }
            }
        }
    };

    cluster(&mut graph, 0);

    // Bridge: chain from last node of A to first node of B
    let bridge_start = cluster_size;
    link(&mut graph, cluster_size - 1, bridge_start, 1.0);
    for i in 1..bridge_len {
        link(&mut graph, bridge_start + i - 1, bridge_start + i, 1.0);
    }

    let b_start = bridge_start + bridge_len;
    link(&mut graph, b_start - 1, b_start, 1.0);
    cluster(&mut graph, b_start);

    graph
}

/// Square lattice, right and down neighbors. Many equal-length routes, so
/// it stresses tie-breaking and backtrace choice.
fn gen_grid(node_count: u64) -> Graph<u64> {
    let side = ((node_count as f64).sqrt() as u64).max(1);
    let mut graph = Graph::with_capacity(false, (side * side) as usize, (side * side * 2) as usize);
    let mut rng = FastRng::new(31337);

    for row in 0..side {
        for col in 0..side {
            let id = row * side + col;
            graph.add_node(id);
            if col + 1 < side {
                let w = (rng.next(3) + 1) as f64;
                link(&mut graph, id, id + 1, w);
            }
            if row + 1 < side {
                let w = (rng.next(3) + 1) as f64;
                link(&mut graph, id, id + side, w);
            }
        }
    }

    graph
}

// ---------------------------------------------------------------------------
// Sample graphs
// ---------------------------------------------------------------------------

/// Road distances in km between French cities.
fn sample_routes() -> Result<Graph<String>, GraphError> {
    Graph::from_edges(
        false,
        vec![
            ("Rennes", "Nantes", 45.0),
            ("Rennes", "Caen", 75.0),
            ("Rennes", "Paris", 110.0),
            ("Rennes", "Bordeaux", 130.0),
            ("Nantes", "Paris", 80.0),
            ("Nantes", "Bordeaux", 90.0),
            ("Bordeaux", "Paris", 150.0),
            ("Bordeaux", "Lyon", 100.0),
            ("Caen", "Paris", 50.0),
            ("Caen", "Lille", 65.0),
            ("Paris", "Lille", 70.0),
            ("Paris", "Dijon", 60.0),
            ("Lille", "Dijon", 120.0),
            ("Lille", "Nancy", 100.0),
            ("Dijon", "Nancy", 75.0),
            ("Dijon", "Lyon", 70.0),
            ("Dijon", "Grenoble", 75.0),
            ("Lyon", "Grenoble", 40.0),
            ("Lyon", "Nancy", 90.0),
            ("Nancy", "Grenoble", 80.0),
        ],
    )
}

/// Directed, with negative weights but no negative cycle. Dijkstra rejects it
/// and the spanning-tree algorithms refuse a directed graph.
fn sample_negative() -> Result<Graph<String>, GraphError> {
    Graph::from_edges(
        true,
        vec![
            ("A", "B", 4.0),
            ("A", "C", 2.0),
            ("B", "C", -1.0),
            ("B", "D", 2.0),
            ("C", "D", 3.0),
            ("C", "E", -2.0),
            ("E", "D", 1.0),
        ],
    )
}
