//! Core domain logic for ArchSketch, a system-architecture diagram editor.
//! This crate is the single source of truth for project and graph invariants.

pub mod assistant;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use assistant::completion::{CompletionError, TextCompletion, UnavailableCompletion};
pub use assistant::gemini::GeminiClient;
pub use assistant::session::{AssistantError, AssistantSession, ChatMessage, Resolution, Role};
pub use catalog::{CatalogEntry, CatalogError, Category};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use export::{export_current, ExportError, ExportFormat, ExportOptions, ExportOutput};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::edge::{Edge, EdgeStyle};
pub use model::node::{Node, NodeData, Position};
pub use model::project::{ExportSnapshot, Project, ProjectDocument, ProjectId, ProjectPatch, Timestamp};
pub use repo::kv_repo::{KeyValueStore, KvError, MemoryKeyValueStore, SqliteKeyValueStore};
pub use service::canvas::{CanvasController, CanvasError, CanvasView};
pub use service::project_store::{ImportError, ProjectStore, StoreError, DEFAULT_STORAGE_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
