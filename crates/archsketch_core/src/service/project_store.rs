//! Project store: single source of truth for projects and the current
//! selection.
//!
//! # Responsibility
//! - Own the project list and the current-project pointer.
//! - Persist the full `{projects, currentProject}` snapshot after every
//!   mutation.
//! - Validate and coerce documents from disk or import files before they
//!   enter memory.
//!
//! # Invariants
//! - At most one project is current; it is held by value.
//! - `updated_at` of the current project never decreases.
//! - `revision` strictly increases on every mutation, independent of the
//!   clock.
//! - Persistence is best effort: failures are logged and never surface to
//!   callers. The in-memory effect of the mutation always stands.
//! - Concurrent writers of the same slot (another process or tab) are not
//!   detected; the last snapshot written wins.

use crate::clock::{Clock, SystemClock};
use crate::model::graph::{coerce_graph, GraphRepair};
use crate::model::project::{
    ExportSnapshot, Project, ProjectDocument, ProjectId, ProjectPatch, EXPORT_FORMAT_JSON,
};
use crate::repo::kv_repo::KeyValueStore;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key used when no override is configured.
pub const DEFAULT_STORAGE_KEY: &str = "system_design_projects";

/// Validation failures surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    EmptyProjectName,
    ProjectNotFound(ProjectId),
    NoCurrentProject,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyProjectName => write!(f, "project name is required"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::NoCurrentProject => write!(f, "no project selected"),
        }
    }
}

impl Error for StoreError {}

/// Import failure; the store is left untouched.
#[derive(Debug)]
pub enum ImportError {
    Malformed(serde_json::Error),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "import file is not a valid project: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStateRef<'a> {
    projects: &'a [Project],
    current_project: Option<&'a Project>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    projects: Vec<serde_json::Value>,
    #[serde(default)]
    current_project: Option<serde_json::Value>,
}

/// Store of all projects plus the current selection.
pub struct ProjectStore<K: KeyValueStore> {
    kv: K,
    storage_key: String,
    clock: Box<dyn Clock>,
    projects: Vec<Project>,
    current: Option<Project>,
    revision: u64,
}

impl<K: KeyValueStore> ProjectStore<K> {
    /// Loads the persisted snapshot from `kv` using the wall clock.
    pub fn load(kv: K, storage_key: impl Into<String>) -> Self {
        Self::load_with_clock(kv, storage_key, Box::new(SystemClock))
    }

    /// Loads the persisted snapshot from `kv`.
    ///
    /// A missing slot, unreadable slot or unparsable document all yield the
    /// empty state. Individual malformed projects are skipped.
    pub fn load_with_clock(kv: K, storage_key: impl Into<String>, clock: Box<dyn Clock>) -> Self {
        let storage_key = storage_key.into();
        let (projects, current) = read_snapshot(&kv, &storage_key);
        info!(
            "event=store_load module=store status=ok projects={} has_current={}",
            projects.len(),
            current.is_some()
        );
        Self {
            kv,
            storage_key,
            clock,
            projects,
            current,
            revision: 0,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current.as_ref()
    }

    /// Mutation counter of this store instance; bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn find_project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Backing slot store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Creates an empty project, appends it and makes it current.
    ///
    /// # Errors
    /// - `StoreError::EmptyProjectName` when `name` is blank; nothing changes.
    pub fn create_project(&mut self, name: &str, description: &str) -> Result<Project, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::EmptyProjectName);
        }

        let project = Project::new(name, description, self.clock.now());
        self.projects.push(project.clone());
        self.current = Some(project.clone());
        info!(
            "event=project_create module=store status=ok project_id={}",
            project.id
        );
        self.persist();
        Ok(project)
    }

    /// Removes the project with `id`, clearing current when it matches.
    ///
    /// Persists even when no such project exists.
    pub fn delete_project(&mut self, id: ProjectId) {
        let before = self.projects.len();
        self.projects.retain(|project| project.id != id);
        if self.current.as_ref().is_some_and(|current| current.id == id) {
            self.current = None;
        }
        info!(
            "event=project_delete module=store status=ok project_id={id} removed={}",
            before - self.projects.len()
        );
        self.persist();
    }

    /// Replaces the current pointer by value.
    pub fn set_current_project(&mut self, project: Option<Project>) {
        self.current = project;
        self.persist();
    }

    /// Makes the list entry with `id` current.
    pub fn select_project(&mut self, id: ProjectId) -> Result<Project, StoreError> {
        let project = self
            .find_project(id)
            .cloned()
            .ok_or(StoreError::ProjectNotFound(id))?;
        self.set_current_project(Some(project.clone()));
        Ok(project)
    }

    /// Shallow-merges `patch` into the current project.
    ///
    /// Returns the merged current project, or `None` (no-op) when nothing is
    /// current.
    pub fn update_current_project(&mut self, patch: ProjectPatch) -> Option<&Project> {
        let mut updated = self.current.clone()?;
        let previous = updated.updated_at;
        updated.apply(patch);
        updated.updated_at = self.clock.now().max(previous);

        if let Some(slot) = self
            .projects
            .iter_mut()
            .find(|project| project.id == updated.id)
        {
            *slot = updated.clone();
        }
        debug!(
            "event=project_update module=store status=ok project_id={} nodes={} edges={}",
            updated.id,
            updated.nodes.len(),
            updated.edges.len()
        );
        self.current = Some(updated);
        self.persist();
        self.current.as_ref()
    }

    /// Owned copy of the current project stamped for export.
    pub fn export_project(&self) -> Option<ExportSnapshot> {
        let project = self.current.clone()?;
        Some(ExportSnapshot {
            project,
            exported_at: self.clock.now(),
            format: EXPORT_FORMAT_JSON.to_string(),
        })
    }

    /// Imports a project-shaped document under a fresh id and makes it
    /// current.
    pub fn import_project(&mut self, document: ProjectDocument) -> Project {
        let now = self.clock.now();
        let (mut project, repair) = document.into_project(now);
        project.imported_at = Some(now);
        log_repair("project_import", &repair);

        self.projects.push(project.clone());
        self.current = Some(project.clone());
        info!(
            "event=project_import module=store status=ok project_id={} nodes={} edges={}",
            project.id,
            project.nodes.len(),
            project.edges.len()
        );
        self.persist();
        project
    }

    /// Parses untrusted JSON text and imports it.
    ///
    /// # Errors
    /// - `ImportError::Malformed` when the text is not a project-shaped JSON
    ///   object; the store is not modified.
    pub fn import_project_json(&mut self, text: &str) -> Result<Project, ImportError> {
        let document = serde_json::from_str::<ProjectDocument>(text).map_err(|err| {
            warn!(
                "event=project_import module=store status=error error_code=malformed_json line={} column={}",
                err.line(),
                err.column()
            );
            ImportError::Malformed(err)
        })?;
        Ok(self.import_project(document))
    }

    fn persist(&mut self) {
        self.revision += 1;
        let snapshot = PersistedStateRef {
            projects: &self.projects,
            current_project: self.current.as_ref(),
        };
        let encoded = match serde_json::to_string(&snapshot) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!("event=store_persist module=store status=error error_code=encode_failed error={err}");
                return;
            }
        };
        match self.kv.set_item(&self.storage_key, &encoded) {
            Ok(()) => debug!(
                "event=store_persist module=store status=ok bytes={}",
                encoded.len()
            ),
            Err(err) => error!(
                "event=store_persist module=store status=error error_code=write_failed error={err}"
            ),
        }
    }
}

fn read_snapshot<K: KeyValueStore>(kv: &K, key: &str) -> (Vec<Project>, Option<Project>) {
    let raw = match kv.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (Vec::new(), None),
        Err(err) => {
            warn!("event=store_load module=store status=error error_code=read_failed error={err}");
            return (Vec::new(), None);
        }
    };

    let state = match serde_json::from_str::<PersistedState>(&raw) {
        Ok(state) => state,
        Err(err) => {
            warn!("event=store_load module=store status=error error_code=parse_failed error={err}");
            return (Vec::new(), None);
        }
    };

    let projects = state
        .projects
        .into_iter()
        .filter_map(decode_persisted_project)
        .collect::<Vec<_>>();
    let current = state.current_project.and_then(decode_persisted_project);
    (projects, current)
}

fn decode_persisted_project(value: serde_json::Value) -> Option<Project> {
    match serde_json::from_value::<Project>(value) {
        Ok(mut project) => {
            let repair = coerce_graph(&mut project.nodes, &mut project.edges);
            log_repair("store_load", &repair);
            project.updated_at = project.updated_at.max(project.created_at);
            Some(project)
        }
        Err(err) => {
            warn!("event=store_load module=store status=skipped error_code=invalid_project error={err}");
            None
        }
    }
}

fn log_repair(event: &str, repair: &GraphRepair) {
    if !repair.is_clean() {
        warn!(
            "event={event} module=store status=coerced duplicate_nodes={} duplicate_edges={} dangling_edges={}",
            repair.duplicate_nodes, repair.duplicate_edges, repair.dangling_edges
        );
    }
}
