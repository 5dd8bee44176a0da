//! Directed connection between two nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EDGE_STROKE: &str = "#3b82f6";
pub const DEFAULT_EDGE_STROKE_WIDTH: f64 = 2.0;

/// Stroke metadata carried for the rendering widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: default_stroke(),
            stroke_width: DEFAULT_EDGE_STROKE_WIDTH,
        }
    }
}

fn default_stroke() -> String {
    DEFAULT_EDGE_STROKE.to_string()
}

fn default_stroke_width() -> f64 {
    DEFAULT_EDGE_STROKE_WIDTH
}

/// Edge between `source` and `target` node ids of the same project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// Creates an animated edge with a fresh id and default style.
    pub fn connect(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: format!("edge-{}", Uuid::new_v4().simple()),
            source: source.into(),
            target: target.into(),
            animated: true,
            style: EdgeStyle::default(),
            label: None,
        }
    }

    /// Returns whether either endpoint is `node_id`.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
