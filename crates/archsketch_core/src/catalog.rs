//! Read-only component catalog and node factory.
//!
//! # Responsibility
//! - Map catalog type keys to display defaults (label, color, category, icon).
//! - Build new canvas nodes from a catalog entry.
//!
//! # Invariants
//! - The table is immutable at runtime.
//! - Unknown type keys never produce a partial node.
//! - Rendering an unknown type falls back to `PLACEHOLDER_ICON`.

use crate::model::node::{Node, NodeData, Position};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Glyph rendered for nodes whose type is not (or no longer) in the catalog.
pub const PLACEHOLDER_ICON: &str = "?";

/// Palette grouping for catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Compute,
    Storage,
    Network,
    Security,
    Client,
    Service,
    Ops,
    Cloud,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Compute,
        Self::Storage,
        Self::Network,
        Self::Security,
        Self::Client,
        Self::Service,
        Self::Ops,
        Self::Cloud,
    ];

    /// Stable id stored in `NodeData::category`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Storage => "storage",
            Self::Network => "network",
            Self::Security => "security",
            Self::Client => "client",
            Self::Service => "service",
            Self::Ops => "ops",
            Self::Cloud => "cloud",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Compute => "Compute",
            Self::Storage => "Storage",
            Self::Network => "Network",
            Self::Security => "Security",
            Self::Client => "Client",
            Self::Service => "Services",
            Self::Ops => "Operations",
            Self::Cloud => "Cloud",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Compute => "#3b82f6",
            Self::Storage => "#8b5cf6",
            Self::Network => "#06b6d4",
            Self::Security => "#dc2626",
            Self::Client => "#0ea5e9",
            Self::Service => "#059669",
            Self::Ops => "#0f766e",
            Self::Cloud => "#1e40af",
        }
    }
}

/// One immutable palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub type_key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub category: Category,
    pub description: &'static str,
    /// Icon reference resolved by the UI shell.
    pub icon: &'static str,
}

const fn entry(
    type_key: &'static str,
    label: &'static str,
    color: &'static str,
    category: Category,
    description: &'static str,
    icon: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        type_key,
        label,
        color,
        category,
        description,
        icon,
    }
}

#[rustfmt::skip]
static CATALOG: &[CatalogEntry] = &[
    entry("server", "Server", "#3b82f6", Category::Compute, "Application server or web server", "server"),
    entry("microservice", "Microservice", "#10b981", Category::Compute, "Individual microservice component", "cogs"),
    entry("container", "Container", "#f59e0b", Category::Compute, "Docker container or pod", "rocket"),
    entry("database", "Database", "#8b5cf6", Category::Storage, "Relational or NoSQL database", "database"),
    entry("cache", "Cache", "#ef4444", Category::Storage, "Redis, Memcached, or in-memory cache", "bolt"),
    entry("storage", "Storage", "#6b7280", Category::Storage, "File storage or object storage", "hdd"),
    entry("loadBalancer", "Load Balancer", "#06b6d4", Category::Network, "Load balancer or reverse proxy", "balance-scale"),
    entry("cdn", "CDN", "#84cc16", Category::Network, "Content Delivery Network", "network-wired"),
    entry("gateway", "API Gateway", "#f97316", Category::Network, "API Gateway or service mesh", "key"),
    entry("firewall", "Firewall", "#dc2626", Category::Security, "Firewall or security layer", "shield"),
    entry("auth", "Authentication", "#7c3aed", Category::Security, "Authentication service", "lock"),
    entry("webApp", "Web App", "#0ea5e9", Category::Client, "Web application frontend", "desktop"),
    entry("mobileApp", "Mobile App", "#ec4899", Category::Client, "Mobile application", "mobile"),
    entry("users", "Users", "#64748b", Category::Client, "End users or clients", "users"),
    entry("searchService", "Search Service", "#059669", Category::Service, "Elasticsearch or search engine", "search"),
    entry("emailService", "Email Service", "#d97706", Category::Service, "Email service or SMTP", "envelope"),
    entry("notification", "Notification", "#7c2d12", Category::Service, "Push notification service", "bell"),
    entry("monitoring", "Monitoring", "#0f766e", Category::Ops, "Monitoring and observability", "chart-line"),
    entry("logs", "Logs", "#92400e", Category::Ops, "Log aggregation service", "file"),
    entry("cloudService", "Cloud Service", "#1e40af", Category::Cloud, "Third-party cloud service", "cloud"),
];

/// Catalog lookup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    UnknownType(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(type_key) => write!(f, "unknown component type: `{type_key}`"),
        }
    }
}

impl Error for CatalogError {}

/// All entries in palette order.
pub fn entries() -> &'static [CatalogEntry] {
    CATALOG
}

pub fn lookup(type_key: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.type_key == type_key)
}

/// Icon reference for `type_key`, or the placeholder glyph when unknown.
pub fn icon_for(type_key: &str) -> &'static str {
    lookup(type_key).map_or(PLACEHOLDER_ICON, |entry| entry.icon)
}

/// Entries grouped by category, categories in declaration order.
pub fn by_category() -> Vec<(Category, Vec<&'static CatalogEntry>)> {
    Category::ALL
        .iter()
        .map(|category| {
            let members = CATALOG
                .iter()
                .filter(|entry| entry.category == *category)
                .collect::<Vec<_>>();
            (*category, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

/// Builds a new node for `type_key` at `position` with a fresh id.
///
/// # Errors
/// - `CatalogError::UnknownType` when the key is not in the catalog.
pub fn create_node(type_key: &str, position: Position) -> Result<Node, CatalogError> {
    let entry =
        lookup(type_key).ok_or_else(|| CatalogError::UnknownType(type_key.to_string()))?;
    Ok(Node::new(
        entry.type_key,
        position,
        NodeData {
            label: entry.label.to_string(),
            description: entry.description.to_string(),
            color: entry.color.to_string(),
            category: entry.category.as_str().to_string(),
            technology: None,
            notes: None,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::{by_category, create_node, entries, icon_for, lookup, CatalogError, PLACEHOLDER_ICON};
    use crate::model::node::Position;
    use std::collections::HashSet;

    #[test]
    fn type_keys_are_unique() {
        let keys = entries().iter().map(|entry| entry.type_key).collect::<HashSet<_>>();
        assert_eq!(keys.len(), entries().len());
    }

    #[test]
    fn create_node_copies_catalog_defaults() {
        let node = create_node("gateway", Position::new(5.0, 6.0)).expect("gateway exists");
        assert_eq!(node.type_key, "gateway");
        assert_eq!(node.data.label, "API Gateway");
        assert_eq!(node.data.category, "network");
        assert_eq!(node.position, Position::new(5.0, 6.0));
        assert!(node.id.starts_with("gateway-"));
    }

    #[test]
    fn unknown_type_is_a_construction_failure() {
        let err = create_node("mainframe", Position::default()).expect_err("unknown type");
        assert_eq!(err, CatalogError::UnknownType("mainframe".to_string()));
        assert!(lookup("mainframe").is_none());
    }

    #[test]
    fn unknown_type_renders_placeholder_icon() {
        assert_eq!(icon_for("mainframe"), PLACEHOLDER_ICON);
        assert_eq!(icon_for("database"), "database");
    }

    #[test]
    fn grouping_covers_every_entry() {
        let grouped = by_category();
        let total = grouped.iter().map(|(_, members)| members.len()).sum::<usize>();
        assert_eq!(total, entries().len());
        assert_eq!(grouped[0].0.as_str(), "compute");
    }
}
