//! Prompt templates for each request shape.

use super::classify::RequestKind;
use crate::model::edge::Edge;
use crate::model::node::Node;
use crate::model::project::Project;
use serde::Serialize;

#[derive(Serialize)]
struct DesignSummary<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
    name: &'a str,
}

/// Renders the prompt text for `kind`.
///
/// Optimize embeds `{nodes, edges, name}` of `project`; load test embeds the
/// whole project (`null` when none is current).
pub fn build_prompt(
    kind: &RequestKind,
    input: &str,
    project: Option<&Project>,
) -> Result<String, serde_json::Error> {
    let prompt = match kind {
        RequestKind::OptimizeCurrent => {
            let design = project.map(|project| DesignSummary {
                nodes: &project.nodes,
                edges: &project.edges,
                name: &project.name,
            });
            optimize_prompt(&serde_json::to_string_pretty(&design)?)
        }
        RequestKind::ExplainComponent { component } => explain_prompt(component, input),
        RequestKind::LoadTestStrategy => {
            load_test_prompt(&serde_json::to_string_pretty(&project)?)
        }
        RequestKind::GenericDesign => design_prompt(input),
    };
    Ok(prompt)
}

fn design_prompt(requirements: &str) -> String {
    format!(
        "As a system design expert, help me create a system architecture based on these requirements:

Requirements: {requirements}

Please provide:
1. Recommended system components (databases, servers, load balancers, etc.)
2. Architecture patterns to consider
3. Key design decisions and trade-offs
4. Scalability considerations
5. Suggested technology stack

Format your response in a clear, structured way that helps with system design planning.
Keep the response concise but comprehensive.
"
    )
}

fn optimize_prompt(design_json: &str) -> String {
    format!(
        "Analyze this system design and provide optimization suggestions:

Current Design: {design_json}

Please provide:
1. Performance optimization opportunities
2. Security improvements
3. Cost optimization strategies
4. Scalability enhancements
5. Best practices recommendations

Focus on practical, actionable improvements. Keep the response structured and concise.
"
    )
}

fn explain_prompt(component: &str, context: &str) -> String {
    format!(
        "Explain the {component} component in system design:

Context: {context}

Please provide:
1. What this component does
2. When to use it
3. Common configurations
4. Integration considerations
5. Alternatives to consider

Keep the explanation concise but comprehensive.
"
    )
}

fn load_test_prompt(design_json: &str) -> String {
    format!(
        "Create a load testing strategy for this system design:

System Design: {design_json}

Please provide:
1. Key performance metrics to monitor
2. Test scenarios to implement
3. Load testing tools recommendations
4. Expected bottlenecks to watch for
5. Scalability testing approach

Make it practical and actionable for implementation. Keep the response structured.
"
    )
}
