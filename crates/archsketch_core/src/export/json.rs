//! Pretty-printed JSON export.

use crate::model::project::ExportSnapshot;

/// Serializes an export snapshot with two-space indentation.
///
/// The output re-imports through `ProjectStore::import_project_json`.
pub fn to_json(snapshot: &ExportSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}
