//! Static SVG rendering of a project graph.

use super::ExportError;
use crate::model::node::Node;
use crate::model::project::Project;
use std::fmt::Write;

const PADDING: f64 = 50.0;
const BACKGROUND_FILL: &str = "#f9fafb";

/// Bounding box of every node (position plus default-sized extent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of(nodes: &[Node]) -> Option<Self> {
        nodes.iter().fold(None, |acc: Option<Bounds>, node| {
            let (x, y) = (node.position.x, node.position.y);
            let (right, bottom) = (x + node.width_or_default(), y + node.height_or_default());
            Some(match acc {
                None => Bounds {
                    min_x: x,
                    min_y: y,
                    max_x: right,
                    max_y: bottom,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(right),
                    max_y: b.max_y.max(bottom),
                },
            })
        })
    }
}

/// Renders edges (behind) then nodes, translated so the bounding box sits
/// at a `PADDING` inset.
///
/// # Errors
/// - `ExportError::EmptyProject` when the project has no nodes.
pub fn to_svg(project: &Project, include_background: bool) -> Result<String, ExportError> {
    let bounds = Bounds::of(&project.nodes).ok_or(ExportError::EmptyProject)?;
    let width = bounds.max_x - bounds.min_x + PADDING * 2.0;
    let height = bounds.max_y - bounds.min_y + PADDING * 2.0;
    let offset_x = PADDING - bounds.min_x;
    let offset_y = PADDING - bounds.min_y;

    let mut svg = String::new();
    write!(
        svg,
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <style>
      .node-rect {{ fill: #3b82f6; stroke: #1e40af; stroke-width: 2; rx: 8; }}
      .node-text {{ fill: white; font-family: Inter, Arial, sans-serif; font-size: 14px; font-weight: 500; text-anchor: middle; dominant-baseline: middle; }}
      .edge-line {{ stroke: #6b7280; stroke-width: 2; fill: none; }}
      .edge-arrow {{ fill: #6b7280; }}
    </style>
    <marker id="arrowhead" markerWidth="10" markerHeight="7" refX="9" refY="3.5" orient="auto">
      <polygon points="0 0, 10 3.5, 0 7" class="edge-arrow" />
    </marker>
  </defs>"##
    )?;

    if include_background {
        write!(
            svg,
            "\n  <rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND_FILL}\"/>"
        )?;
    }

    for edge in &project.edges {
        let (Some(source), Some(target)) = (project.node(&edge.source), project.node(&edge.target))
        else {
            continue;
        };
        let (x1, y1) = center(source, offset_x, offset_y);
        let (x2, y2) = center(target, offset_x, offset_y);
        write!(
            svg,
            "\n  <line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" class=\"edge-line\" marker-end=\"url(#arrowhead)\"/>"
        )?;
    }

    for node in &project.nodes {
        let x = node.position.x + offset_x;
        let y = node.position.y + offset_y;
        let w = node.width_or_default();
        let h = node.height_or_default();
        let label = if node.label().is_empty() {
            "Node"
        } else {
            node.label()
        };
        write!(
            svg,
            "\n  <rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" class=\"node-rect\"/>"
        )?;
        write!(
            svg,
            "\n  <text x=\"{}\" y=\"{}\" class=\"node-text\">{}</text>",
            x + w / 2.0,
            y + h / 2.0,
            escape_xml(label)
        )?;
    }

    svg.push_str("\n</svg>");
    Ok(svg)
}

fn center(node: &Node, offset_x: f64, offset_y: f64) -> (f64, f64) {
    (
        node.position.x + offset_x + node.width_or_default() / 2.0,
        node.position.y + offset_y + node.height_or_default() / 2.0,
    )
}

/// Escapes the five XML special characters.
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
