//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate project-store mutations into editor-level operations.
//! - Keep UI layers decoupled from storage details.

pub mod canvas;
pub mod project_store;
pub mod properties;
pub mod template;
pub mod toolbar;
