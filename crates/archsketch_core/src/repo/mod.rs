//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the slot-storage contract the project store writes through.
//! - Isolate SQLite details from services.
//!
//! # Invariants
//! - Only the project store touches the persisted project slot.

pub mod kv_repo;
