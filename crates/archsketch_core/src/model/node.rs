//! Canvas node model.
//!
//! # Responsibility
//! - Define the placed component box and its editable metadata.
//! - Allocate node ids that stay unique inside one project.
//!
//! # Invariants
//! - `type_key` only seeds defaults at creation; every `data` field is
//!   editable afterwards and never re-read from the catalog.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default rendered node width when the host never measured one.
pub const DEFAULT_NODE_WIDTH: f64 = 150.0;
/// Default rendered node height when the host never measured one.
pub const DEFAULT_NODE_HEIGHT: f64 = 80.0;

/// Canvas coordinates of a node's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this position shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Editable metadata shown on and beside a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One placed component on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    /// Catalog type the node was created from. Empty for foreign documents.
    #[serde(default)]
    pub type_key: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    pub data: NodeData,
}

impl Node {
    /// Creates a node with a freshly generated id.
    pub fn new(type_key: impl Into<String>, position: Position, data: NodeData) -> Self {
        let type_key = type_key.into();
        Self {
            id: generate_node_id(&type_key),
            type_key,
            position,
            width: None,
            height: None,
            data,
        }
    }

    pub fn label(&self) -> &str {
        self.data.label.as_str()
    }

    /// Rendered width, falling back to the default box size.
    pub fn width_or_default(&self) -> f64 {
        self.width.unwrap_or(DEFAULT_NODE_WIDTH)
    }

    /// Rendered height, falling back to the default box size.
    pub fn height_or_default(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_NODE_HEIGHT)
    }
}

/// Allocates a node id prefixed with its catalog type for readability.
pub fn generate_node_id(type_key: &str) -> String {
    let prefix = if type_key.trim().is_empty() {
        "node"
    } else {
        type_key.trim()
    };
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
