//! Project domain model.
//!
//! # Responsibility
//! - Define the saved diagram record and its partial-update shape.
//! - Define the untrusted import document and the export snapshot.
//!
//! # Invariants
//! - `id` is stable for the lifetime of the project and never reused.
//! - `updated_at` never moves backwards.
//! - Documents from outside the process are coerced through
//!   `ProjectDocument::into_project` before entering the in-memory model.

use crate::model::edge::Edge;
use crate::model::graph::{coerce_graph, GraphRepair};
use crate::model::node::Node;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;
pub type Timestamp = DateTime<Utc>;

/// Format tag stamped on JSON export snapshots.
pub const EXPORT_FORMAT_JSON: &str = "json";

/// One saved diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<Timestamp>,
}

impl Project {
    /// Creates an empty project with a generated id.
    ///
    /// # Invariants
    /// - `created_at == updated_at == now`.
    pub fn new(name: impl Into<String>, description: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
            imported_at: None,
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    /// Applies a shallow merge; timestamps are left to the caller.
    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(nodes) = patch.nodes {
            self.nodes = nodes;
        }
        if let Some(edges) = patch.edges {
            self.edges = edges;
        }
    }
}

/// Partial update merged into the current project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub nodes: Option<Vec<Node>>,
    pub edges: Option<Vec<Edge>>,
}

impl ProjectPatch {
    pub fn nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes: Some(nodes),
            ..Self::default()
        }
    }

    pub fn edges(edges: Vec<Edge>) -> Self {
        Self {
            edges: Some(edges),
            ..Self::default()
        }
    }

    pub fn graph(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes: Some(nodes),
            edges: Some(edges),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.nodes.is_none()
            && self.edges.is_none()
    }
}

/// Project-shaped document from an untrusted source (import file, template,
/// persisted slot written by another build).
///
/// Any supplied `id` is ignored; unknown fields such as `exportedAt` are
/// skipped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl ProjectDocument {
    /// Builds an owned project with a fresh id and a coerced graph.
    ///
    /// Missing timestamps default to `now`; `updated_at` is raised to at
    /// least `created_at`.
    pub fn into_project(self, now: Timestamp) -> (Project, GraphRepair) {
        let mut nodes = self.nodes;
        let mut edges = self.edges;
        let repair = coerce_graph(&mut nodes, &mut edges);

        let created_at = self.created_at.unwrap_or(now);
        let updated_at = self.updated_at.unwrap_or(now).max(created_at);
        let project = Project {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            nodes,
            edges,
            created_at,
            updated_at,
            imported_at: None,
        };
        (project, repair)
    }
}

impl From<Project> for ProjectDocument {
    fn from(project: Project) -> Self {
        Self {
            name: project.name,
            description: project.description,
            nodes: project.nodes,
            edges: project.edges,
            created_at: Some(project.created_at),
            updated_at: Some(project.updated_at),
        }
    }
}

/// Owned copy of the current project stamped for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    #[serde(flatten)]
    pub project: Project,
    pub exported_at: Timestamp,
    pub format: String,
}
