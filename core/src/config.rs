//! Engine tunables.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! selection = "binary_heap"
//! negative_weights = "bellman_ford"
//! path_tolerance = 1e-9
//! backtrace_margin = 5
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// How Dijkstra and Prim pick their next candidate.
///
/// Both strategies break ties the same way and produce identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// O(V) scan per step. Fine for the intended graph sizes.
    #[default]
    LinearScan,
    /// Binary heap with lazy deletion, O((V + E) log V).
    BinaryHeap,
}

/// What Dijkstra does when the graph has a negative edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeWeightPolicy {
    /// Fail with `NegativeWeight` before any relaxation.
    #[default]
    Reject,
    /// Answer the request with Bellman-Ford instead.
    BellmanFord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub selection: Selection,

    #[serde(default)]
    pub negative_weights: NegativeWeightPolicy,

    /// Absolute tolerance when matching `dist[u] + w` against `dist[v]`
    /// during path backtrace.
    #[serde(default = "default_path_tolerance")]
    pub path_tolerance: f64,

    /// Extra backtrace steps allowed beyond the node count.
    #[serde(default = "default_backtrace_margin")]
    pub backtrace_margin: usize,
}

fn default_path_tolerance() -> f64 {
    1e-9
}

fn default_backtrace_margin() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            negative_weights: NegativeWeightPolicy::default(),
            path_tolerance: default_path_tolerance(),
            backtrace_margin: default_backtrace_margin(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.path_tolerance.is_finite() || self.path_tolerance <= 0.0 {
            return Err(GraphError::InvalidConfig(format!(
                "path_tolerance must be a positive finite number, got {}",
                self.path_tolerance
            )));
        }
        Ok(())
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_negative_weights(mut self, policy: NegativeWeightPolicy) -> Self {
        self.negative_weights = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.selection, Selection::LinearScan);
        assert_eq!(config.negative_weights, NegativeWeightPolicy::Reject);
        assert_eq!(config.path_tolerance, 1e-9);
        assert_eq!(config.backtrace_margin, 5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            selection = "binary_heap"
            negative_weights = "bellman_ford"
            path_tolerance = 1e-6
            backtrace_margin = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.selection, Selection::BinaryHeap);
        assert_eq!(config.negative_weights, NegativeWeightPolicy::BellmanFord);
        assert_eq!(config.path_tolerance, 1e-6);
        assert_eq!(config.backtrace_margin, 10);
    }

    #[test]
    fn test_unknown_selection_rejected() {
        let err = EngineConfig::from_toml_str(r#"selection = "fibonacci""#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig(_)));
    }

    #[test]
    fn test_non_positive_tolerance_rejected() {
        let err = EngineConfig::from_toml_str("path_tolerance = 0.0").unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig(_)));
    }
}
