//! Built-in architecture templates.
//!
//! # Responsibility
//! - Ship canned graphs as embedded JSON documents.
//! - Filter templates by category and free-text search.
//! - Materialize a template as a new current project.
//!
//! # Invariants
//! - Template graphs are coerced on load, so a template never yields
//!   dangling edges or duplicate ids.
//! - Using a template leaves the new project's list entry and the current
//!   project identical.

use crate::model::edge::Edge;
use crate::model::graph::coerce_graph;
use crate::model::node::Node;
use crate::model::project::{Project, ProjectPatch};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::project_store::{ProjectStore, StoreError};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "ecommerce_microservices",
        include_str!("../templates/ecommerce_microservices.json"),
    ),
    (
        "social_media_platform",
        include_str!("../templates/social_media_platform.json"),
    ),
    ("iot_platform", include_str!("../templates/iot_platform.json")),
    ("gaming_backend", include_str!("../templates/gaming_backend.json")),
    (
        "analytics_platform",
        include_str!("../templates/analytics_platform.json"),
    ),
];

/// Date format used in template-derived project names.
pub const TEMPLATE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug)]
pub enum TemplateError {
    /// An embedded document failed to parse.
    Malformed {
        source_name: &'static str,
        error: serde_json::Error,
    },
    UnknownTemplate(String),
    Store(StoreError),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { source_name, error } => {
                write!(f, "template `{source_name}` is malformed: {error}")
            }
            Self::UnknownTemplate(id) => write!(f, "template not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TemplateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed { error, .. } => Some(error),
            Self::Store(err) => Some(err),
            Self::UnknownTemplate(_) => None,
        }
    }
}

impl From<StoreError> for TemplateError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Ecommerce,
    Social,
    Iot,
    Gaming,
    Analytics,
    Security,
    Cloud,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 7] = [
        Self::Ecommerce,
        Self::Social,
        Self::Iot,
        Self::Gaming,
        Self::Analytics,
        Self::Security,
        Self::Cloud,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ecommerce => "ecommerce",
            Self::Social => "social",
            Self::Iot => "iot",
            Self::Gaming => "gaming",
            Self::Analytics => "analytics",
            Self::Security => "security",
            Self::Cloud => "cloud",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ecommerce => "E-commerce",
            Self::Social => "Social Media",
            Self::Iot => "IoT",
            Self::Gaming => "Gaming",
            Self::Analytics => "Analytics",
            Self::Security => "Security",
            Self::Cloud => "Cloud Native",
        }
    }

    /// Parses a category id. `"all"` is not a category; see [`TemplateFilter`].
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// One canned architecture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Template {
    pub fn component_count(&self) -> usize {
        self.nodes.len()
    }

    fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Category plus search-term filter. Default matches every template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    /// `None` means all categories.
    pub category: Option<TemplateCategory>,
    pub search: String,
}

/// Read-only set of templates.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Parses the templates compiled into the binary.
    pub fn builtin() -> Result<Self, TemplateError> {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(source_name, raw)| parse_template(source_name, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { templates })
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Templates matching `filter`, in catalog order.
    pub fn filter(&self, filter: &TemplateFilter) -> Vec<&Template> {
        let needle = filter.search.trim().to_lowercase();
        self.templates
            .iter()
            .filter(|template| filter.category.map_or(true, |c| template.category == c))
            .filter(|template| template.matches_search(&needle))
            .collect()
    }
}

fn parse_template(source_name: &'static str, raw: &str) -> Result<Template, TemplateError> {
    let mut template = serde_json::from_str::<Template>(raw)
        .map_err(|error| TemplateError::Malformed { source_name, error })?;
    let repair = coerce_graph(&mut template.nodes, &mut template.edges);
    if !repair.is_clean() {
        warn!(
            "event=template_load module=template status=coerced template={source_name} dangling_edges={}",
            repair.dangling_edges
        );
    }
    Ok(template)
}

/// Project name for a template used on `today`.
pub fn template_project_name(template: &Template, today: NaiveDate) -> String {
    format!("{} - {}", template.name, today.format(TEMPLATE_DATE_FORMAT))
}

/// Creates a project from template `id` and makes it current.
///
/// # Errors
/// - `TemplateError::UnknownTemplate` when `id` is not in `catalog`.
pub fn use_template<K: KeyValueStore>(
    store: &mut ProjectStore<K>,
    catalog: &TemplateCatalog,
    id: &str,
    today: NaiveDate,
) -> Result<Project, TemplateError> {
    let template = catalog
        .get(id)
        .ok_or_else(|| TemplateError::UnknownTemplate(id.to_string()))?;

    let project = store.create_project(
        &template_project_name(template, today),
        &template.description,
    )?;
    let loaded = store
        .update_current_project(ProjectPatch::graph(
            template.nodes.clone(),
            template.edges.clone(),
        ))
        .cloned()
        .unwrap_or(project);
    info!(
        "event=template_use module=template status=ok template={} project_id={}",
        template.id, loaded.id
    );
    Ok(loaded)
}
