//! Canvas controller: keeps the editable graph and the store's current
//! project in sync.
//!
//! # Responsibility
//! - Mirror the current project's node/edge arrays into a local copy.
//! - Push every local gesture (drop, connect, move, delete, clear) back to
//!   the store as a full-array patch.
//!
//! # Invariants
//! - Local arrays are replaced wholesale on project change, never merged.
//! - A store revision the controller pushed itself is never reloaded, so a
//!   push never triggers a pull. Any other store mutation is reloaded
//!   before the next gesture, whatever the clock says.
//! - Deleting a node removes every edge touching it.
//! - Keyboard deletion is ignored while focus is in a text field.

use crate::catalog::{self, CatalogError};
use crate::model::edge::Edge;
use crate::model::graph::remove_node_cascade;
use crate::model::node::{Node, Position};
use crate::model::project::{ProjectId, ProjectPatch};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::project_store::ProjectStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Canvas gesture failure. No gesture that fails mutates the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    NoProject,
    Catalog(CatalogError),
    UnknownNode(String),
    DuplicateConnection { source: String, target: String },
    NothingSelected,
}

impl Display for CanvasError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProject => write!(f, "no project selected"),
            Self::Catalog(err) => write!(f, "{err}"),
            Self::UnknownNode(id) => write!(f, "component not found: {id}"),
            Self::DuplicateConnection { source, target } => {
                write!(f, "components already connected: {source} -> {target}")
            }
            Self::NothingSelected => write!(f, "no component selected"),
        }
    }
}

impl Error for CanvasError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for CanvasError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

/// Where keyboard focus currently sits in the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Canvas,
    TextInput,
    TextArea,
}

impl FocusTarget {
    fn is_text_entry(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasKey {
    Delete,
    Backspace,
    Other,
}

impl CanvasKey {
    /// Maps a host key name (`"Delete"`, `"Backspace"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            _ => Self::Other,
        }
    }
}

/// Result of a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Ignored,
    /// Delete key pressed while a text field had focus.
    Suppressed,
    Deleted(Node),
}

/// Result of a clear-canvas request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    AlreadyEmpty,
    /// The user declined the confirmation.
    Cancelled,
}

/// What the host should render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasView<'a> {
    /// No project is current.
    Placeholder,
    Graph {
        project_id: ProjectId,
        nodes: &'a [Node],
        edges: &'a [Edge],
        selected: Option<&'a str>,
    },
}

/// Store state the local arrays were last copied from or pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Revision {
    project_id: ProjectId,
    store_revision: u64,
}

impl Revision {
    fn current<K: KeyValueStore>(store: &ProjectStore<K>) -> Option<Self> {
        store.current_project().map(|project| Self {
            project_id: project.id,
            store_revision: store.revision(),
        })
    }
}

/// Local editable graph bound to the store's current project.
#[derive(Debug, Default)]
pub struct CanvasController {
    bound: Option<Revision>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selected: Option<String>,
}

impl CanvasController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Reloads local arrays when the store's current project changed.
    ///
    /// Returns `true` when the local graph was replaced.
    pub fn observe<K: KeyValueStore>(&mut self, store: &ProjectStore<K>) -> bool {
        if Revision::current(store) == self.bound {
            return false;
        }
        self.resync(store);
        true
    }

    /// Reloads local arrays unconditionally.
    pub fn resync<K: KeyValueStore>(&mut self, store: &ProjectStore<K>) {
        let current = store.current_project();
        let revision = Revision::current(store);
        let switched_project =
            self.bound.map(|r| r.project_id) != revision.map(|r| r.project_id);
        match current {
            Some(project) => {
                self.nodes = project.nodes.clone();
                self.edges = project.edges.clone();
            }
            None => {
                self.nodes.clear();
                self.edges.clear();
            }
        }
        if switched_project || !self.selection_resolves() {
            self.selected = None;
        }
        self.bound = revision;
    }

    pub fn view(&self) -> CanvasView<'_> {
        match self.bound {
            None => CanvasView::Placeholder,
            Some(revision) => CanvasView::Graph {
                project_id: revision.project_id,
                nodes: &self.nodes,
                edges: &self.edges,
                selected: self.selected.as_deref(),
            },
        }
    }

    /// Builds a catalog node at `position` and appends it.
    pub fn drop_catalog_entry<K: KeyValueStore>(
        &mut self,
        store: &mut ProjectStore<K>,
        type_key: &str,
        position: Position,
    ) -> Result<Node, CanvasError> {
        self.require_project(store)?;
        let node = catalog::create_node(type_key, position)?;
        self.nodes.push(node.clone());
        self.push(store, ProjectPatch::nodes(self.nodes.clone()));
        info!(
            "event=canvas_drop module=canvas status=ok type_key={type_key} node_id={}",
            node.id
        );
        Ok(node)
    }

    /// Connects `source` to `target` with a freshly generated edge.
    pub fn connect<K: KeyValueStore>(
        &mut self,
        store: &mut ProjectStore<K>,
        source: &str,
        target: &str,
    ) -> Result<Edge, CanvasError> {
        self.require_project(store)?;
        for endpoint in [source, target] {
            if !self.has_node(endpoint) {
                return Err(CanvasError::UnknownNode(endpoint.to_string()));
            }
        }
        if self
            .edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
        {
            return Err(CanvasError::DuplicateConnection {
                source: source.to_string(),
                target: target.to_string(),
            });
        }

        let edge = Edge::connect(source, target);
        self.edges.push(edge.clone());
        self.push(store, ProjectPatch::edges(self.edges.clone()));
        Ok(edge)
    }

    /// Moves a node to `position` (end of a drag).
    pub fn move_node<K: KeyValueStore>(
        &mut self,
        store: &mut ProjectStore<K>,
        node_id: &str,
        position: Position,
    ) -> Result<(), CanvasError> {
        self.require_project(store)?;
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or_else(|| CanvasError::UnknownNode(node_id.to_string()))?;
        node.position = position;
        self.push(store, ProjectPatch::nodes(self.nodes.clone()));
        Ok(())
    }

    pub fn select<K: KeyValueStore>(
        &mut self,
        store: &ProjectStore<K>,
        node_id: &str,
    ) -> Result<(), CanvasError> {
        self.require_project(store)?;
        if !self.has_node(node_id) {
            return Err(CanvasError::UnknownNode(node_id.to_string()));
        }
        self.selected = Some(node_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Deletes the selected node and every edge touching it.
    pub fn delete_selected<K: KeyValueStore>(
        &mut self,
        store: &mut ProjectStore<K>,
    ) -> Result<Node, CanvasError> {
        self.require_project(store)?;
        let selected = self.selected.take().ok_or(CanvasError::NothingSelected)?;
        let removed = remove_node_cascade(&mut self.nodes, &mut self.edges, &selected)
            .ok_or(CanvasError::UnknownNode(selected))?;
        self.push(
            store,
            ProjectPatch::graph(self.nodes.clone(), self.edges.clone()),
        );
        info!(
            "event=canvas_delete module=canvas status=ok node_id={}",
            removed.id
        );
        Ok(removed)
    }

    /// Handles a key press with the given focus.
    pub fn handle_key<K: KeyValueStore>(
        &mut self,
        store: &mut ProjectStore<K>,
        key: CanvasKey,
        focus: FocusTarget,
    ) -> Result<KeyOutcome, CanvasError> {
        if !matches!(key, CanvasKey::Delete | CanvasKey::Backspace) {
            return Ok(KeyOutcome::Ignored);
        }
        if focus.is_text_entry() {
            return Ok(KeyOutcome::Suppressed);
        }
        if self.selected.is_none() {
            return Ok(KeyOutcome::Ignored);
        }
        self.delete_selected(store).map(KeyOutcome::Deleted)
    }

    /// Empties the graph when `confirmed`.
    pub fn clear<K: KeyValueStore>(
        &mut self,
        store: &mut ProjectStore<K>,
        confirmed: bool,
    ) -> Result<ClearOutcome, CanvasError> {
        self.require_project(store)?;
        if self.nodes.is_empty() && self.edges.is_empty() {
            return Ok(ClearOutcome::AlreadyEmpty);
        }
        if !confirmed {
            return Ok(ClearOutcome::Cancelled);
        }
        self.nodes.clear();
        self.edges.clear();
        self.selected = None;
        self.push(store, ProjectPatch::graph(Vec::new(), Vec::new()));
        Ok(ClearOutcome::Cleared)
    }

    fn require_project<K: KeyValueStore>(
        &mut self,
        store: &ProjectStore<K>,
    ) -> Result<(), CanvasError> {
        self.observe(store);
        if self.bound.is_none() {
            return Err(CanvasError::NoProject);
        }
        Ok(())
    }

    fn push<K: KeyValueStore>(&mut self, store: &mut ProjectStore<K>, patch: ProjectPatch) {
        store.update_current_project(patch);
        self.bound = Revision::current(store);
    }

    fn has_node(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == node_id)
    }

    fn selection_resolves(&self) -> bool {
        self.selected
            .as_deref()
            .map_or(true, |selected| self.has_node(selected))
    }
}

#[cfg(test)]
mod tests {
    use super::{CanvasController, CanvasError, CanvasKey, CanvasView, FocusTarget, KeyOutcome};
    use crate::clock::ManualClock;
    use crate::model::node::Position;
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use crate::service::project_store::ProjectStore;
    use crate::service::toolbar;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn store_with_project() -> ProjectStore<MemoryKeyValueStore> {
        let mut store = ProjectStore::load(MemoryKeyValueStore::new(), "canvas-test");
        store.create_project("Canvas", "").expect("project");
        store
    }

    #[test]
    fn placeholder_without_project() {
        let store = ProjectStore::load(MemoryKeyValueStore::new(), "canvas-test");
        let mut canvas = CanvasController::new();
        canvas.observe(&store);
        assert_eq!(canvas.view(), CanvasView::Placeholder);
    }

    #[test]
    fn project_switch_replaces_graph_and_clears_selection() {
        let mut store = store_with_project();
        let mut canvas = CanvasController::new();
        let first_id = store.current_project().expect("current project").id;
        let server = canvas
            .drop_catalog_entry(&mut store, "server", Position::new(1.0, 1.0))
            .expect("drop");
        let cache = canvas
            .drop_catalog_entry(&mut store, "cache", Position::new(2.0, 2.0))
            .expect("drop");
        canvas.connect(&mut store, &server.id, &cache.id).expect("connect");
        canvas.select(&store, &server.id).expect("select");

        let second = store.create_project("Second", "").expect("project");
        let auth = canvas
            .drop_catalog_entry(&mut store, "auth", Position::new(3.0, 3.0))
            .expect("drop");
        assert_eq!(canvas.selected(), None);

        store.select_project(first_id).expect("select first");
        assert!(canvas.observe(&store));
        assert_eq!(canvas.nodes().len(), 2);
        canvas.select(&store, &cache.id).expect("select");

        store.select_project(second.id).expect("select second");
        assert!(canvas.observe(&store));
        let ids: Vec<&str> = canvas.nodes().iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec![auth.id.as_str()]);
        assert!(canvas.edges().is_empty());
        assert_eq!(canvas.selected(), None);
    }

    #[test]
    fn outside_edit_in_the_same_clock_tick_survives_the_next_gesture() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap(),
        ));
        let mut store = ProjectStore::load_with_clock(
            MemoryKeyValueStore::new(),
            "canvas-test",
            Box::new(Arc::clone(&clock)),
        );
        store.create_project("Frozen clock", "").expect("project");
        let mut canvas = CanvasController::new();
        let server = canvas
            .drop_catalog_entry(&mut store, "server", Position::new(7.0, 7.0))
            .expect("drop");
        let cache = canvas
            .drop_catalog_entry(&mut store, "cache", Position::new(9.0, 9.0))
            .expect("drop");

        toolbar::auto_arrange(&mut store).expect("arrange");
        canvas
            .move_node(&mut store, &server.id, Position::new(1.0, 1.0))
            .expect("move");

        let project = store.current_project().expect("current project");
        let stored = |id: &str| {
            project
                .nodes
                .iter()
                .find(|node| node.id == id)
                .map(|node| node.position)
        };
        assert_eq!(stored(&server.id), Some(Position::new(1.0, 1.0)));
        assert_eq!(stored(&cache.id), Some(toolbar::grid_position(1)));
        assert_eq!(toolbar::grid_position(1), Position::new(300.0, 100.0));
    }

    #[test]
    fn pushed_revision_is_not_reloaded() {
        let mut store = store_with_project();
        let mut canvas = CanvasController::new();
        canvas
            .drop_catalog_entry(&mut store, "server", Position::new(1.0, 2.0))
            .expect("drop");
        assert!(!canvas.observe(&store));
        assert_eq!(store.current_project().expect("current project").nodes.len(), 1);
    }

    #[test]
    fn unknown_catalog_type_leaves_graph_untouched() {
        let mut store = store_with_project();
        let mut canvas = CanvasController::new();
        let before = store.current_project().expect("current project").updated_at;
        let err = canvas
            .drop_catalog_entry(&mut store, "quantum", Position::default())
            .expect_err("unknown type");
        assert!(matches!(err, CanvasError::Catalog(_)));
        assert!(canvas.nodes().is_empty());
        assert_eq!(store.current_project().expect("current project").updated_at, before);
    }

    #[test]
    fn delete_key_is_suppressed_in_text_fields() {
        let mut store = store_with_project();
        let mut canvas = CanvasController::new();
        let node = canvas
            .drop_catalog_entry(&mut store, "cache", Position::default())
            .expect("drop");
        canvas.select(&store, &node.id).expect("select");

        for focus in [FocusTarget::TextInput, FocusTarget::TextArea] {
            let outcome = canvas
                .handle_key(&mut store, CanvasKey::Delete, focus)
                .expect("drop");
            assert_eq!(outcome, KeyOutcome::Suppressed);
        }
        assert_eq!(canvas.nodes().len(), 1);

        let outcome = canvas
            .handle_key(&mut store, CanvasKey::from_name("Backspace"), FocusTarget::Canvas)
            .expect("drop");
        assert!(matches!(outcome, KeyOutcome::Deleted(ref removed) if removed.id == node.id));
        assert!(store.current_project().expect("current project").nodes.is_empty());
    }

    #[test]
    fn connect_rejects_duplicates_and_unknown_endpoints() {
        let mut store = store_with_project();
        let mut canvas = CanvasController::new();
        let a = canvas
            .drop_catalog_entry(&mut store, "gateway", Position::default())
            .expect("drop");
        let b = canvas
            .drop_catalog_entry(&mut store, "database", Position::default())
            .expect("drop");

        canvas.connect(&mut store, &a.id, &b.id).expect("connect");
        assert!(matches!(
            canvas.connect(&mut store, &a.id, &b.id),
            Err(CanvasError::DuplicateConnection { .. })
        ));
        assert!(matches!(
            canvas.connect(&mut store, &a.id, "ghost"),
            Err(CanvasError::UnknownNode(_))
        ));
        assert_eq!(store.current_project().expect("current project").edges.len(), 1);
    }
}
