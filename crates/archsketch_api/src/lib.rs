//! Use-case API for ArchSketch UI shells.
//!
//! Shells (browser bindings, desktop wrappers, the CLI) talk to the editing
//! core only through [`api::Editor`], which turns every outcome into an
//! [`api::ActionResponse`] carrying a transient [`api::Notice`].

pub mod api;

pub use api::{core_version, init_logging, ActionResponse, Editor, Notice, NoticeLevel, ShareLinks};
