//! Diagram domain model.
//!
//! # Responsibility
//! - Define canonical project/node/edge structures used by core logic.
//! - Keep the serialized shape (camelCase, RFC 3339 timestamps) in one place.
//!
//! # Invariants
//! - Every edge endpoint resolves to a node of the same project.
//! - Node and edge ids are unique within their project.

pub mod edge;
pub mod graph;
pub mod node;
pub mod project;
