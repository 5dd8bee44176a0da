//! Markdown documentation export.

use super::PRODUCT_NAME;
use crate::model::node::Node;
use crate::model::project::Project;
use chrono::NaiveDate;
use std::fmt::Write;

const DEFAULT_DESCRIPTION: &str = "System Design Documentation";
const UNKNOWN_ENDPOINT: &str = "Unknown";
pub const FOOTER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Renders design documentation for `project`.
///
/// Connections are numbered in edge order; an endpoint that no longer
/// resolves prints as `Unknown`.
pub fn to_markdown(project: &Project, generated_on: NaiveDate) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let description = if project.description.trim().is_empty() {
        DEFAULT_DESCRIPTION
    } else {
        project.description.as_str()
    };

    writeln!(out, "# {}", project.name)?;
    writeln!(out)?;
    writeln!(out, "{description}")?;
    writeln!(out)?;
    writeln!(out, "## Overview")?;
    writeln!(
        out,
        "This system design contains {} components and {} connections.",
        project.nodes.len(),
        project.edges.len()
    )?;
    writeln!(out)?;
    writeln!(out, "## Components")?;
    writeln!(out)?;

    for (index, node) in project.nodes.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        write_component(&mut out, node)?;
    }

    writeln!(out)?;
    writeln!(out, "## Architecture Connections")?;
    writeln!(out)?;
    for (index, edge) in project.edges.iter().enumerate() {
        writeln!(
            out,
            "{}. {} → {}",
            index + 1,
            label_of(project, &edge.source),
            label_of(project, &edge.target)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(
        out,
        "*Generated by {PRODUCT_NAME} on {}*",
        generated_on.format(FOOTER_DATE_FORMAT)
    )?;
    Ok(out)
}

fn write_component(out: &mut String, node: &Node) -> std::fmt::Result {
    let data = &node.data;
    writeln!(out, "### {}", data.label)?;
    writeln!(out, "- **Type**: {}", data.category)?;
    writeln!(out, "- **Description**: {}", data.description)?;
    writeln!(
        out,
        "- **Technology**: {}",
        non_blank(data.technology.as_deref()).unwrap_or("Not specified")
    )?;
    writeln!(
        out,
        "- **Notes**: {}",
        non_blank(data.notes.as_deref()).unwrap_or("None")
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn label_of<'a>(project: &'a Project, node_id: &str) -> &'a str {
    project.node(node_id).map_or(UNKNOWN_ENDPOINT, Node::label)
}
