use thiserror::Error;

/// Errors returned by graph construction and algorithm entry points.
///
/// Unreachability is not an error: it is reported through
/// [`Distance::Unreached`](crate::Distance::Unreached) and empty paths.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node not found: {node}")]
    NodeNotFound { node: String },

    #[error("{algorithm} requires an undirected graph")]
    DirectedGraphUnsupported { algorithm: &'static str },

    #[error("negative edge weight {weight} on {from} -> {to} (dijkstra requires non-negative weights)")]
    NegativeWeight { from: String, to: String, weight: f64 },

    #[error("negative cycle reachable from {start}: edge {from} -> {to} still relaxes")]
    NegativeCycle {
        start: String,
        from: String,
        to: String,
    },

    #[error("invalid weight {weight} on {from} -> {to}: weights must be finite")]
    InvalidWeight { from: String, to: String, weight: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    pub(crate) fn node_not_found(node: impl std::fmt::Display) -> Self {
        GraphError::NodeNotFound {
            node: node.to_string(),
        }
    }
}

impl From<toml::de::Error> for GraphError {
    fn from(err: toml::de::Error) -> Self {
        GraphError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
