//! Property panel edits for a single node.

use crate::model::graph::remove_node_cascade;
use crate::model::node::Node;
use crate::model::project::ProjectPatch;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::project_store::ProjectStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Colour swatches offered by the property panel. Any colour string is
/// accepted; these are presets.
pub const COLOR_PRESETS: [&str; 10] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#84cc16", "#f97316",
    "#ec4899", "#6b7280",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    NoProject,
    UnknownNode(String),
}

impl Display for PropertyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProject => write!(f, "no project selected"),
            Self::UnknownNode(id) => write!(f, "component not found: {id}"),
        }
    }
}

impl Error for PropertyError {}

/// Field-wise update of `NodeData`; `None` leaves a field untouched.
///
/// For `technology` and `notes`, an empty string clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub technology: Option<String>,
    pub notes: Option<String>,
}

impl NodeDataPatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.technology.is_none()
            && self.notes.is_none()
    }

    fn apply_to(self, node: &mut Node) {
        if let Some(label) = self.label {
            node.data.label = label;
        }
        if let Some(description) = self.description {
            node.data.description = description;
        }
        if let Some(color) = self.color {
            node.data.color = color;
        }
        if let Some(technology) = self.technology {
            node.data.technology = non_empty(technology);
        }
        if let Some(notes) = self.notes {
            node.data.notes = non_empty(notes);
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Merges `patch` into the data of `node_id` and returns the updated node.
pub fn update_node_data<K: KeyValueStore>(
    store: &mut ProjectStore<K>,
    node_id: &str,
    patch: NodeDataPatch,
) -> Result<Node, PropertyError> {
    let project = store.current_project().ok_or(PropertyError::NoProject)?;
    let mut nodes = project.nodes.clone();
    let node = nodes
        .iter_mut()
        .find(|node| node.id == node_id)
        .ok_or_else(|| PropertyError::UnknownNode(node_id.to_string()))?;
    patch.apply_to(node);
    let updated = node.clone();

    store.update_current_project(ProjectPatch::nodes(nodes));
    Ok(updated)
}

/// Removes `node_id` and every edge touching it.
pub fn delete_node<K: KeyValueStore>(
    store: &mut ProjectStore<K>,
    node_id: &str,
) -> Result<Node, PropertyError> {
    let project = store.current_project().ok_or(PropertyError::NoProject)?;
    let mut nodes = project.nodes.clone();
    let mut edges = project.edges.clone();
    let removed = remove_node_cascade(&mut nodes, &mut edges, node_id)
        .ok_or_else(|| PropertyError::UnknownNode(node_id.to_string()))?;

    store.update_current_project(ProjectPatch::graph(nodes, edges));
    info!("event=node_delete module=properties status=ok node_id={node_id}");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::{delete_node, update_node_data, NodeDataPatch, PropertyError};
    use crate::catalog::create_node;
    use crate::model::edge::Edge;
    use crate::model::node::Position;
    use crate::model::project::ProjectPatch;
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use crate::service::project_store::ProjectStore;

    #[test]
    fn update_merges_only_given_fields() {
        let mut store = ProjectStore::load(MemoryKeyValueStore::new(), "props");
        store.create_project("Props", "").expect("create");
        let node = create_node("database", Position::default()).expect("database");
        store.update_current_project(ProjectPatch::nodes(vec![node.clone()]));

        let updated = update_node_data(
            &mut store,
            &node.id,
            NodeDataPatch {
                label: Some("Orders DB".to_string()),
                technology: Some("PostgreSQL".to_string()),
                ..NodeDataPatch::default()
            },
        )
        .expect("update");
        assert_eq!(updated.data.label, "Orders DB");
        assert_eq!(updated.data.technology.as_deref(), Some("PostgreSQL"));
        assert_eq!(updated.data.color, node.data.color);

        let cleared = update_node_data(
            &mut store,
            &node.id,
            NodeDataPatch {
                technology: Some(String::new()),
                ..NodeDataPatch::default()
            },
        )
        .expect("clear technology");
        assert_eq!(cleared.data.technology, None);
    }

    #[test]
    fn delete_cascades_to_incident_edges_only() {
        let mut store = ProjectStore::load(MemoryKeyValueStore::new(), "props");
        store.create_project("Props", "").expect("create");
        let a = create_node("users", Position::default()).expect("users");
        let b = create_node("webApp", Position::default()).expect("webApp");
        let c = create_node("server", Position::default()).expect("server");
        let edges = vec![
            Edge::connect(&a.id, &b.id),
            Edge::connect(&b.id, &c.id),
            Edge::connect(&a.id, &c.id),
        ];
        store.update_current_project(ProjectPatch::graph(
            vec![a.clone(), b.clone(), c.clone()],
            edges,
        ));

        delete_node(&mut store, &b.id).expect("delete");
        let project = store.current_project().expect("current");
        assert_eq!(project.nodes.len(), 2);
        assert_eq!(project.edges.len(), 1);
        assert_eq!(project.edges[0].source, a.id);
        assert_eq!(
            delete_node(&mut store, &b.id),
            Err(PropertyError::UnknownNode(b.id.clone()))
        );
    }
}
