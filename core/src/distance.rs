use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::Add;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// A shortest-path distance label.
///
/// `Unreached` is out-of-band: it is never encoded as a large number or
/// infinity. The derived ordering puts every `Finite` value before
/// `Unreached`, so `a < b` reads as "a is a shorter path than b".
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Distance {
    Finite(f64),
    Unreached,
}

impl Distance {
    pub const ZERO: Distance = Distance::Finite(0.0);

    pub fn is_reached(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Distance::Finite(v) => Some(v),
            Distance::Unreached => None,
        }
    }

    /// Extend by one edge. Unreached stays unreached.
    ///
    /// Sums saturate at `±f64::MAX`, so a reached label is always finite.
    pub fn plus(self, weight: f64) -> Distance {
        match self {
            Distance::Finite(v) => Distance::Finite(saturate(v + weight)),
            Distance::Unreached => Distance::Unreached,
        }
    }
}

fn saturate(sum: f64) -> f64 {
    if sum.is_finite() {
        sum
    } else {
        f64::MAX.copysign(sum)
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Distance) -> Distance {
        match (self, rhs) {
            (Distance::Finite(a), Distance::Finite(b)) => Distance::Finite(saturate(a + b)),
            _ => Distance::Unreached,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(v) => write!(f, "{}", v),
            Distance::Unreached => f.write_str("unreached"),
        }
    }
}

/// Serialized as a plain number, or the string `"unreached"`.
impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Distance::Finite(v) => serializer.serialize_f64(*v),
            Distance::Unreached => serializer.serialize_str("unreached"),
        }
    }
}

/// Single-source distances: one entry per graph node, in node insertion order.
#[derive(Debug, Clone)]
pub struct DistanceTable<N> {
    source: N,
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    distances: Vec<Distance>,
}

/// Position map for a node list, so lookups by node are O(1).
pub(crate) fn index_nodes<N: Hash + Eq + Clone>(nodes: &[N]) -> HashMap<N, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(ix, n)| (n.clone(), ix))
        .collect()
}

impl<N: Hash + Eq + Clone> DistanceTable<N> {
    pub(crate) fn new(source: N, nodes: Vec<N>, distances: Vec<Distance>) -> Self {
        debug_assert_eq!(nodes.len(), distances.len());
        Self {
            source,
            index: index_nodes(&nodes),
            nodes,
            distances,
        }
    }

    /// Distance to `node`, or `None` if the node was not in the graph.
    pub fn get<Q>(&self, node: &Q) -> Option<Distance>
    where
        N: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(node).map(|&ix| self.distances[ix])
    }
}

/// The index is derived from `nodes` and takes no part in equality.
impl<N: PartialEq> PartialEq for DistanceTable<N> {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.nodes == other.nodes
            && self.distances == other.distances
    }
}

impl<N> DistanceTable<N> {
    pub fn source(&self) -> &N {
        &self.source
    }

    pub fn iter(&self) -> impl Iterator<Item = (&N, Distance)> + '_ {
        self.nodes.iter().zip(self.distances.iter().copied())
    }

    /// Nodes with a finite distance, in node order.
    pub fn reached(&self) -> impl Iterator<Item = (&N, f64)> + '_ {
        self.iter().filter_map(|(n, d)| d.value().map(|v| (n, v)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub(crate) fn distances(&self) -> &[Distance] {
        &self.distances
    }
}

struct DistanceMap<'a, N> {
    nodes: &'a [N],
    distances: &'a [Distance],
}

impl<N: Serialize> Serialize for DistanceMap<'_, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for (node, dist) in self.nodes.iter().zip(self.distances) {
            map.serialize_entry(node, dist)?;
        }
        map.end()
    }
}

/// `{"source": .., "distances": {node: distance, ..}}`
impl<N: Serialize> Serialize for DistanceTable<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DistanceTable", 2)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field(
            "distances",
            &DistanceMap {
                nodes: &self.nodes,
                distances: &self.distances,
            },
        )?;
        state.end()
    }
}

pub(crate) fn serialize_distance_map<N, S>(
    nodes: &[N],
    distances: &[Distance],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    N: Serialize,
    S: Serializer,
{
    DistanceMap { nodes, distances }.serialize(serializer)
}
