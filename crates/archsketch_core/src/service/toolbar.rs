//! Toolbar operations over the current project's graph.
//!
//! # Responsibility
//! - Layout helpers (grid auto-arrange, horizontal alignment).
//! - Duplicate and copy/paste of single components.
//!
//! # Invariants
//! - Every operation writes through `ProjectStore::update_current_project`.
//! - Copies always receive a fresh id, a `+50/+50` offset and a ` Copy`
//!   label suffix.

use crate::model::node::{generate_node_id, Node, Position};
use crate::model::project::ProjectPatch;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::project_store::ProjectStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const GRID_COLUMNS: usize = 4;
const GRID_ORIGIN: f64 = 100.0;
const GRID_COLUMN_SPACING: f64 = 200.0;
const GRID_ROW_SPACING: f64 = 150.0;
const COPY_OFFSET: f64 = 50.0;
const COPY_LABEL_SUFFIX: &str = " Copy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarError {
    NoProject,
    NoComponents,
    /// Alignment needs at least two components.
    NotEnoughComponents { found: usize },
    UnknownNode(String),
    NothingSelected,
    ClipboardEmpty,
}

impl Display for ToolbarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProject => write!(f, "no project selected"),
            Self::NoComponents => write!(f, "no components to arrange"),
            Self::NotEnoughComponents { found } => {
                write!(f, "select multiple components to align (found {found})")
            }
            Self::UnknownNode(id) => write!(f, "component not found: {id}"),
            Self::NothingSelected => write!(f, "select a component first"),
            Self::ClipboardEmpty => write!(f, "nothing to paste"),
        }
    }
}

impl Error for ToolbarError {}

/// Horizontal alignment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" | "centre" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Lays every node out on a 4-column grid in array order.
///
/// Returns the number of arranged nodes.
pub fn auto_arrange<K: KeyValueStore>(store: &mut ProjectStore<K>) -> Result<usize, ToolbarError> {
    let mut nodes = current_nodes(store)?;
    if nodes.is_empty() {
        return Err(ToolbarError::NoComponents);
    }

    for (index, node) in nodes.iter_mut().enumerate() {
        node.position = grid_position(index);
    }
    let count = nodes.len();
    store.update_current_project(ProjectPatch::nodes(nodes));
    info!("event=toolbar_arrange module=toolbar status=ok nodes={count}");
    Ok(count)
}

/// Grid slot for the `index`-th node.
pub fn grid_position(index: usize) -> Position {
    let col = (index % GRID_COLUMNS) as f64;
    let row = (index / GRID_COLUMNS) as f64;
    Position::new(
        GRID_ORIGIN + col * GRID_COLUMN_SPACING,
        GRID_ORIGIN + row * GRID_ROW_SPACING,
    )
}

/// Moves every node to a common `x`.
///
/// Returns the chosen `x`: minimum for left, mean for center, maximum for
/// right. `y` is left untouched.
pub fn align_nodes<K: KeyValueStore>(
    store: &mut ProjectStore<K>,
    alignment: Alignment,
) -> Result<f64, ToolbarError> {
    let mut nodes = current_nodes(store)?;
    if nodes.len() < 2 {
        return Err(ToolbarError::NotEnoughComponents { found: nodes.len() });
    }

    let xs = nodes.iter().map(|node| node.position.x);
    let target = match alignment {
        Alignment::Left => xs.fold(f64::INFINITY, f64::min),
        Alignment::Right => xs.fold(f64::NEG_INFINITY, f64::max),
        Alignment::Center => xs.sum::<f64>() / nodes.len() as f64,
    };
    for node in &mut nodes {
        node.position.x = target;
    }
    store.update_current_project(ProjectPatch::nodes(nodes));
    info!(
        "event=toolbar_align module=toolbar status=ok alignment={}",
        alignment.as_str()
    );
    Ok(target)
}

/// Appends a copy of `node_id` and returns it.
pub fn duplicate_node<K: KeyValueStore>(
    store: &mut ProjectStore<K>,
    node_id: &str,
) -> Result<Node, ToolbarError> {
    let mut nodes = current_nodes(store)?;
    let original = nodes
        .iter()
        .find(|node| node.id == node_id)
        .ok_or_else(|| ToolbarError::UnknownNode(node_id.to_string()))?;
    let copy = copy_of(original);
    nodes.push(copy.clone());
    store.update_current_project(ProjectPatch::nodes(nodes));
    Ok(copy)
}

/// Builds the pasted/duplicated form of `node`.
pub fn copy_of(node: &Node) -> Node {
    let mut copy = node.clone();
    copy.id = generate_node_id(&node.type_key);
    copy.position = node.position.offset(COPY_OFFSET, COPY_OFFSET);
    copy.data.label.push_str(COPY_LABEL_SUFFIX);
    copy
}

/// Single-slot component clipboard.
///
/// Holds a snapshot taken at copy time, so later edits or deletion of the
/// original do not affect what gets pasted.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    node: Option<Node>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    pub fn peek(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    /// Copies `node_id` from the current project.
    pub fn copy<K: KeyValueStore>(
        &mut self,
        store: &ProjectStore<K>,
        node_id: Option<&str>,
    ) -> Result<(), ToolbarError> {
        let node_id = node_id.ok_or(ToolbarError::NothingSelected)?;
        let project = store.current_project().ok_or(ToolbarError::NoProject)?;
        let node = project
            .node(node_id)
            .ok_or_else(|| ToolbarError::UnknownNode(node_id.to_string()))?;
        self.node = Some(node.clone());
        Ok(())
    }

    /// Pastes a fresh copy into the current project. Repeatable.
    pub fn paste<K: KeyValueStore>(
        &self,
        store: &mut ProjectStore<K>,
    ) -> Result<Node, ToolbarError> {
        let source = self.node.as_ref().ok_or(ToolbarError::ClipboardEmpty)?;
        let mut nodes = current_nodes(store)?;
        let pasted = copy_of(source);
        nodes.push(pasted.clone());
        store.update_current_project(ProjectPatch::nodes(nodes));
        Ok(pasted)
    }
}

fn current_nodes<K: KeyValueStore>(store: &ProjectStore<K>) -> Result<Vec<Node>, ToolbarError> {
    store
        .current_project()
        .map(|project| project.nodes.clone())
        .ok_or(ToolbarError::NoProject)
}
