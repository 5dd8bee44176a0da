//! Mermaid flowchart export.

use crate::model::project::Project;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt::Write;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid mermaid id regex"));

/// Mermaid-safe identifier: every char outside `[A-Za-z0-9]` becomes `_`.
pub fn sanitize_id(id: &str) -> Cow<'_, str> {
    NON_ALPHANUMERIC.replace_all(id, "_")
}

/// Label text safe inside `["..."]`: quotes become `#quot;` and line
/// breaks become `<br/>`.
pub fn escape_label(label: &str) -> String {
    label
        .replace('"', "#quot;")
        .replace("\r\n", "<br/>")
        .replace(['\n', '\r'], "<br/>")
}

/// Renders a top-down `graph TD` with nodes then edges, in array order.
pub fn to_mermaid(project: &Project) -> Result<String, std::fmt::Error> {
    let mut out = String::from("graph TD\n");
    for node in &project.nodes {
        writeln!(
            out,
            "    {}[\"{}\"]",
            sanitize_id(&node.id),
            escape_label(node.label())
        )?;
    }
    for edge in &project.edges {
        writeln!(
            out,
            "    {} --> {}",
            sanitize_id(&edge.source),
            sanitize_id(&edge.target)
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{escape_label, sanitize_id, to_mermaid};
    use crate::model::node::{Node, NodeData, Position};
    use crate::model::project::Project;
    use chrono::Utc;

    #[test]
    fn sanitizes_every_non_alphanumeric_char() {
        assert_eq!(sanitize_id("api-gateway.1 x"), "api_gateway_1_x");
        assert_eq!(sanitize_id("plain42"), "plain42");
    }

    #[test]
    fn empty_project_is_just_the_header() {
        let project = Project::new("Empty", "", Utc::now());
        assert_eq!(to_mermaid(&project).expect("render"), "graph TD\n");
    }

    #[test]
    fn multiline_label_stays_on_one_line() {
        assert_eq!(escape_label("API\r\nGateway \"v2\"\nedge"), "API<br/>Gateway #quot;v2#quot;<br/>edge");

        let mut project = Project::new("Lines", "", Utc::now());
        let mut node = Node::new(
            "gateway",
            Position::default(),
            NodeData {
                label: "API\nGateway".to_string(),
                ..NodeData::default()
            },
        );
        node.id = "gw".to_string();
        project.nodes.push(node);
        assert_eq!(
            to_mermaid(&project).expect("render"),
            "graph TD\n    gw[\"API<br/>Gateway\"]\n"
        );
    }
}
